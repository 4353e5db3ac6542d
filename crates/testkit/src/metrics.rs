//! Standardized metrics collection and reporting for CI integration.
//!
//! Worldtests and the demo binary export a [`MetricsReport`] as pretty JSON so
//! regressions in propagation cost or source churn show up as diffs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics report.
///
/// This is the format of the metrics.json files exported by tests and runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/run identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Git commit hash (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Overall result
    pub result: TestResult,

    /// Light propagation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighting: Option<LightingMetrics>,

    /// Light source registry metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceMetrics>,

    /// Execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// All validations passed
    Pass,
    /// At least one validation failed
    Fail,
    /// Run was skipped
    Skip,
}

/// Propagation engine cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingMetrics {
    /// Bounded recomputes performed
    pub recomputes: u64,

    /// Queue pops across all recomputes
    pub nodes_processed: u64,

    /// Block-light writes; a voxel rewritten twice counts twice
    pub light_writes: u64,

    /// Largest single recompute (queue pops)
    pub max_nodes_per_recompute: u64,

    /// Mean queue pops per recompute
    pub avg_nodes_per_recompute: f64,

    /// Recomputes per second of wall time
    pub recomputes_per_second: f64,
}

/// Registry churn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetrics {
    /// Registrations created
    pub added: u64,

    /// Registrations dropped because the entity left or was removed
    pub removed: u64,

    /// Registrations dropped because the emitter went out
    pub expired: u64,

    /// Registrations alive at the end of the run
    pub active_at_end: usize,

    /// Live registrations by kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_kind: Option<BTreeMap<String, usize>>,
}

/// Execution metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total duration (seconds)
    pub duration_seconds: f64,

    /// Ticks simulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u64>,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                commit_hash: None,
                result: TestResult::Pass,
                lighting: None,
                sources: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    ticks: None,
                    assertions_checked: None,
                    validations_passed: None,
                },
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set commit hash
    pub fn commit_hash(mut self, hash: impl Into<String>) -> Self {
        self.report.commit_hash = Some(hash.into());
        self
    }

    /// Set lighting metrics
    pub fn lighting(mut self, metrics: LightingMetrics) -> Self {
        self.report.lighting = Some(metrics);
        self
    }

    /// Set source metrics
    pub fn sources(mut self, metrics: SourceMetrics) -> Self {
        self.report.sources = Some(metrics);
        self
    }

    /// Set execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
