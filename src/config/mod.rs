//! Configuration: per-call analysis options, reconciliation thresholds and
//! the `.growthmap.toml` loader.

mod loader;
mod options;
mod thresholds;

pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use options::AnalysisOptions;
pub use thresholds::ReconcileThresholds;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthmapConfig {
    #[serde(default)]
    pub analysis: AnalysisOptions,

    #[serde(default)]
    pub thresholds: ReconcileThresholds,
}

impl GrowthmapConfig {
    /// Defaults rendered as TOML, as written by `growthmap init`.
    pub fn default_toml() -> crate::errors::Result<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| {
            crate::errors::Error::Configuration(format!("failed to render default config: {e}"))
        })
    }
}
