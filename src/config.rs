use lumen_core::DimensionId;
use lumen_world::BlockTable;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/lumen.toml";
pub const DEFAULT_BLOCKS_PATH: &str = "config/blocks.json";

/// Settings for the headless lighting demo.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulation length in ticks (20 per second).
    pub ticks: u64,
    pub seed: u64,
    pub dimension: DimensionId,
    /// Height of the stone floor entities walk on.
    pub floor_y: i32,
    pub torch_arrows: usize,
    pub burning_mobs: usize,
    pub dropped_torches: usize,
    pub torch_players: usize,
    pub furnace_minecarts: usize,
    pub metrics_path: Option<PathBuf>,
    pub event_log_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 200,
            seed: 42,
            dimension: DimensionId::Overworld,
            floor_y: 63,
            torch_arrows: 4,
            burning_mobs: 3,
            dropped_torches: 3,
            torch_players: 1,
            furnace_minecarts: 1,
            metrics_path: None,
            event_log_path: None,
        }
    }
}

impl DemoConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<DemoConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    DemoConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Demo config not found at {}. Using defaults", path.display());
                }
                DemoConfig::default()
            }
        }
    }
}

/// Load the block table from a JSON pack, falling back to the built-in table.
pub fn load_block_table(path: &Path) -> BlockTable {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(
                "Failed to read {}: {err}. Using built-in block table",
                path.display()
            );
            return BlockTable::default();
        }
    };
    match BlockTable::from_json_str(&contents) {
        Ok(table) => table,
        Err(err) => {
            warn!(
                "Invalid block table {}: {err}. Using built-in block table",
                path.display()
            );
            BlockTable::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "lumen-{}-{name}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let path = temp_file("demo.toml", "ticks = 40\ndimension = \"nether\"\n");
        let cfg = DemoConfig::load_from_path(&path);
        assert_eq!(cfg.ticks, 40);
        assert_eq!(cfg.dimension, DimensionId::Nether);
        assert_eq!(cfg.seed, DemoConfig::default().seed);
        assert!(cfg.metrics_path.is_none());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_config_falls_back() {
        let path = temp_file("bad.toml", "ticks = \"many\"");
        let cfg = DemoConfig::load_from_path(&path);
        assert_eq!(cfg.ticks, DemoConfig::default().ticks);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn block_table_falls_back_on_missing_or_invalid_pack() {
        let missing = load_block_table(Path::new("does/not/exist.json"));
        assert_eq!(missing.len(), BlockTable::default().len());

        let path = temp_file("blocks.json", r#"[{"name":"air"},{"name":"sun","emission":99}]"#);
        assert_eq!(load_block_table(&path).id_by_name("sun"), None);
        fs::remove_file(&path).ok();

        let path = temp_file("blocks.json", r#"[{"name":"air"},{"name":"lamp","emission":12}]"#);
        let table = load_block_table(&path);
        assert_eq!(table.light_emission(1), 12);
        fs::remove_file(&path).ok();
    }
}
