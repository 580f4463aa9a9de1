use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Policy knobs for the deal plausibility gate. The defaults match the
/// observed product behavior; both are tunable rather than structural.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum user messages since the last new-journey marker before a
    /// deal banner may be shown.
    #[serde(default = "default_min_user_messages")]
    pub min_user_messages: usize,
    /// The negotiated deal must represent at least this fraction of the
    /// original quantified ask.
    #[serde(default = "default_min_quantity_ratio")]
    pub min_quantity_ratio: f64,
}

fn default_min_user_messages() -> usize {
    3
}

fn default_min_quantity_ratio() -> f64 {
    0.5
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_user_messages: default_min_user_messages(),
            min_quantity_ratio: default_min_quantity_ratio(),
        }
    }
}

// ---------------------------------------------------------------------------
// CoachConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    20
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// HabitConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub coach: CoachConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for HabitConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            coach: CoachConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl HabitConfig {
    /// Load from `<root>/.habit/config.yaml`; an absent file yields the
    /// full defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: HabitConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
