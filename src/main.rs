//! lumen - dynamic entity lighting for voxel worlds
//!
//! Headless demo: runs a seeded scenario through the lighting registry and
//! optionally exports a JSONL event log and a metrics report.

mod config;
mod demo;

use anyhow::{Context, Result};
use config::{DemoConfig, DEFAULT_BLOCKS_PATH, DEFAULT_CONFIG_PATH};
use demo::DemoReport;
use lumen_testkit::{
    LightingMetrics, MetricsReportBuilder, MetricsSink, SourceMetrics, TestExecutionMetrics,
    TestResult,
};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::info;

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting lumen v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut cfg = DemoConfig::load_from_path(&config_path);
    cli.apply(&mut cfg);

    let blocks_path = cli
        .blocks
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOCKS_PATH));
    let blocks = config::load_block_table(&blocks_path);

    let metrics_path = cfg.metrics_path.clone();
    let report = demo::run(cfg, blocks).context("demo run failed")?;
    info!(
        ticks = report.ticks,
        sources_added = report.stats.sources_added,
        sources_expired = report.stats.sources_expired,
        recomputes = report.stats.recomputes,
        nodes = report.stats.nodes_processed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "lighting demo complete"
    );

    if let Some(path) = metrics_path {
        write_metrics(&path, &report)?;
    }
    Ok(())
}

fn write_metrics(path: &Path, report: &DemoReport) -> Result<()> {
    let stats = report.stats;
    let seconds = report.elapsed.as_secs_f64();
    let avg_nodes = if stats.recomputes == 0 {
        0.0
    } else {
        stats.nodes_processed as f64 / stats.recomputes as f64
    };
    let recomputes_per_second = if seconds > 0.0 {
        stats.recomputes as f64 / seconds
    } else {
        0.0
    };

    let metrics = MetricsReportBuilder::new("lumen_demo")
        .result(TestResult::Pass)
        .lighting(LightingMetrics {
            recomputes: stats.recomputes,
            nodes_processed: stats.nodes_processed,
            light_writes: stats.writes,
            max_nodes_per_recompute: stats.max_nodes_per_recompute,
            avg_nodes_per_recompute: avg_nodes,
            recomputes_per_second,
        })
        .sources(SourceMetrics {
            added: stats.sources_added,
            removed: stats.sources_removed,
            expired: stats.sources_expired,
            active_at_end: report.active_sources,
            by_kind: Some(report.by_kind.clone()),
        })
        .execution(TestExecutionMetrics {
            duration_seconds: seconds,
            ticks: Some(report.ticks),
            assertions_checked: None,
            validations_passed: None,
        })
        .build();

    MetricsSink::create(path)
        .and_then(|sink| sink.write(&metrics))
        .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    info!(path = %path.display(), "metrics written");
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    blocks: Option<PathBuf>,
    ticks: Option<u64>,
    seed: Option<u64>,
    metrics: Option<PathBuf>,
    event_log: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => match args.next() {
                    Some(path) => opts.config = Some(PathBuf::from(path)),
                    None => tracing::error!("--config requires a file path"),
                },
                "--blocks" => match args.next() {
                    Some(path) => opts.blocks = Some(PathBuf::from(path)),
                    None => tracing::error!("--blocks requires a file path"),
                },
                "--ticks" => opts.ticks = parse_u64(&mut args, "--ticks"),
                "--seed" => opts.seed = parse_u64(&mut args, "--seed"),
                "--metrics" => match args.next() {
                    Some(path) => opts.metrics = Some(PathBuf::from(path)),
                    None => tracing::error!("--metrics requires a file path"),
                },
                "--event-log" => match args.next() {
                    Some(path) => opts.event_log = Some(PathBuf::from(path)),
                    None => tracing::error!("--event-log requires a file path"),
                },
                other => tracing::warn!(arg = other, "Ignoring unknown argument"),
            }
        }

        opts
    }

    /// Command-line values win over the config file.
    fn apply(&self, cfg: &mut DemoConfig) {
        if let Some(ticks) = self.ticks {
            cfg.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(path) = &self.metrics {
            cfg.metrics_path = Some(path.clone());
        }
        if let Some(path) = &self.event_log {
            cfg.event_log_path = Some(path.clone());
        }
    }
}

fn parse_u64<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Option<u64> {
    let Some(raw) = args.next() else {
        tracing::error!("{flag} requires an integer");
        return None;
    };
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(%err, value = %raw, "{flag} must be an integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn cli_overrides_config() {
        let cli = CliOptions::parse(args(&[
            "--ticks",
            "12",
            "--seed",
            "7",
            "--event-log",
            "out/events.jsonl",
        ]));
        let mut cfg = DemoConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.ticks, 12);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.event_log_path, Some(PathBuf::from("out/events.jsonl")));
        assert!(cfg.metrics_path.is_none());
    }

    #[test]
    fn bad_values_are_ignored() {
        let cli = CliOptions::parse(args(&["--ticks", "lots", "--bogus", "--seed"]));
        assert_eq!(cli.ticks, None);
        assert_eq!(cli.seed, None);
    }
}
