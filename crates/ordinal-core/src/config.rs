use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::model::Status;

/// Smallest batch size accepted from configuration.
pub const MIN_BATCH_SIZE: i64 = 5;

/// Batch size used when none (or a degenerate one) is configured.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub ordering: OrderingConfig,
    #[serde(default)]
    pub statuses: StatusConfig,
    #[serde(default = "default_types")]
    pub types: BTreeMap<String, TypeConfig>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingConfig::default(),
            statuses: StatusConfig::default(),
            types: default_types(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Maximum siblings processed per resequencing call.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl OrderingConfig {
    /// The batch size actually used. Anything below [`MIN_BATCH_SIZE`] would
    /// effectively disable batching and is replaced by the default.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        effective_batch_size(self.batch_size)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Custom lifecycle states that count as active alongside the built-ins.
    #[serde(default)]
    pub custom: Vec<String>,
}

impl StatusConfig {
    #[must_use]
    pub fn active(&self) -> Vec<Status> {
        Status::active_set(&self.custom)
    }
}

/// Per content type switches consulted by the capability gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub bulk_delete: bool,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            sortable: default_true(),
            bulk_delete: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Clamp a configured batch size to something usable.
#[must_use]
pub fn effective_batch_size(configured: i64) -> usize {
    if configured < MIN_BATCH_SIZE {
        tracing::warn!(
            configured,
            fallback = DEFAULT_BATCH_SIZE,
            "batch size below minimum, using default"
        );
        return DEFAULT_BATCH_SIZE;
    }
    usize::try_from(configured).unwrap_or(DEFAULT_BATCH_SIZE)
}

/// Load `.ordinal/config.toml` under `project_root`, or defaults when the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".ordinal/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/ordinal/config.toml`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("ordinal/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_batch_size() -> i64 {
    50
}

fn default_types() -> BTreeMap<String, TypeConfig> {
    BTreeMap::from([("page".to_string(), TypeConfig::default())])
}
