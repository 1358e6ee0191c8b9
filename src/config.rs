use crate::channel::MetricDecomposer;
use crate::error::{EtlError, Result};
use crate::scope::ScopeFilter;
use crate::types::Channel;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Deployment settings. Every field has a default so a missing config file
/// reproduces the stock 2024 + Jan–Jul 2025 run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub scope: ScopeFilter,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Channel prefixes in match order.
    pub channels: Vec<Channel>,
    /// Labels kept whole even when they start with a channel tag.
    pub verbatim_labels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            out_dir: PathBuf::from("outputs"),
            scope: ScopeFilter::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            channels: vec![Channel::Cb, Channel::Bg, Channel::Ds, Channel::Total],
            verbatim_labels: vec!["Total Net Income".to_string()],
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(s).map_err(|e| EtlError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EtlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let cutoff = self.scope.extended_year_cutoff_week;
        if !(1..=53).contains(&cutoff) {
            return Err(EtlError::Config(format!(
                "extended_year_cutoff_week must be within 1..=53, got {}",
                cutoff
            )));
        }
        if self.metrics.channels.is_empty() {
            return Err(EtlError::Config("metrics.channels is empty".to_string()));
        }
        Ok(())
    }

    pub fn decomposer(&self) -> MetricDecomposer {
        MetricDecomposer::new(
            self.metrics.channels.clone(),
            self.metrics.verbatim_labels.clone(),
        )
    }
}
