//! Dimension identifiers.
//!
//! A dimension names one voxel world. Exactly one dimension is "active" at a
//! time from the lighting engine's point of view: the one whose store the host
//! hands over on each tick. Light sources remember the dimension they were
//! registered in so stale registrations can be dropped when the host switches
//! worlds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a world dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DimensionId {
    /// The Overworld dimension.
    Overworld = 0,
    /// The Nether dimension.
    Nether = 1,
    /// The End dimension.
    End = 2,
}

impl DimensionId {
    /// Default (Overworld) dimension.
    pub const DEFAULT: Self = Self::Overworld;

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    /// Parse the canonical string key.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overworld" => Some(Self::Overworld),
            "nether" => Some(Self::Nether),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

impl Default for DimensionId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_keys_roundtrip() {
        for dim in [DimensionId::Overworld, DimensionId::Nether, DimensionId::End] {
            assert_eq!(DimensionId::parse(dim.as_str()), Some(dim));
        }
        assert_eq!(DimensionId::parse("aether"), None);
    }

    #[test]
    fn dimension_serializes_lowercase() {
        let json = serde_json::to_string(&DimensionId::Nether).unwrap();
        assert_eq!(json, "\"nether\"");
    }
}
