//! Default Thresholds: process-wide acceptance defaults per task type
//!
//! The table is resolved once at startup and never mutated afterwards. An
//! optional override blob (inline JSON, or a JSON/TOML file) is overlaid onto
//! the built-in values key by key, so a partial blob only changes what it
//! names. A blob that fails to load is logged and ignored.
//!
//! ```json
//! {
//!   "classification": { "min_accuracy": 0.9 },
//!   "regression": { "max_rmse": 7.5 }
//! }
//! ```

use crate::criteria::{MetricCriterion, TaskType};
use crate::error::ThresholdConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Raw override shape: task type name -> threshold key -> value.
type RawThresholds = HashMap<String, HashMap<String, f64>>;

/// Where a default-threshold override comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdSource {
    /// Inline JSON blob (e.g. the `DEFAULT_THRESHOLDS` environment variable)
    Inline(String),
    /// JSON file, or TOML when the extension is `.toml`
    File(PathBuf),
}

impl std::fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => write!(f, "inline JSON"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Default acceptance thresholds keyed by task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    entries: BTreeMap<TaskType, BTreeMap<String, f64>>,
}

impl ThresholdTable {
    /// Built-in constants, derived from the metric tables.
    pub fn builtin() -> Self {
        let entries = TaskType::ALL
            .into_iter()
            .map(|task| {
                let keys = task
                    .criteria()
                    .iter()
                    .map(|c| (c.threshold_key.to_string(), c.builtin_default))
                    .collect();
                (task, keys)
            })
            .collect();
        Self { entries }
    }

    /// Resolve the process-wide table. Never fails: any load error degrades
    /// to [`ThresholdTable::builtin`] with a warning.
    pub fn resolve(source: Option<&ThresholdSource>) -> Self {
        let Some(source) = source else {
            info!("No threshold override configured, using built-in defaults");
            return Self::builtin();
        };

        let loaded = match source {
            ThresholdSource::Inline(blob) => Self::parse_json(blob),
            ThresholdSource::File(path) => Self::load_file(path),
        };

        match loaded {
            Ok(table) => {
                info!(source = %source, "Loaded default threshold override");
                table
            }
            Err(e) => {
                warn!(
                    source = %source,
                    error = %e,
                    "Failed to load default thresholds, using built-in defaults"
                );
                Self::builtin()
            }
        }
    }

    /// Parse a JSON override blob and overlay it onto the built-in table.
    pub fn parse_json(blob: &str) -> Result<Self, ThresholdConfigError> {
        let raw: RawThresholds = serde_json::from_str(blob)?;
        Self::builtin().overlay(raw)
    }

    /// Parse a TOML override document and overlay it onto the built-in table.
    pub fn parse_toml(doc: &str) -> Result<Self, ThresholdConfigError> {
        let raw: RawThresholds = toml::from_str(doc)?;
        Self::builtin().overlay(raw)
    }

    /// Load an override file; `.toml` files are TOML, anything else JSON.
    pub fn load_file(path: &Path) -> Result<Self, ThresholdConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ThresholdConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::parse_toml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    fn overlay(mut self, raw: RawThresholds) -> Result<Self, ThresholdConfigError> {
        for (task_name, keys) in raw {
            let Ok(task) = task_name.parse::<TaskType>() else {
                warn!(task_type = %task_name, "Ignoring thresholds for unknown task type");
                continue;
            };
            for (key, value) in &keys {
                if !value.is_finite() {
                    return Err(ThresholdConfigError::NonFinite {
                        task_type: task_name.clone(),
                        key: key.clone(),
                    });
                }
            }
            self.entries.entry(task).or_default().extend(keys);
        }
        Ok(self)
    }

    /// Default threshold for a key, if the table has one.
    pub fn get(&self, task_type: TaskType, key: &str) -> Option<f64> {
        self.entries.get(&task_type)?.get(key).copied()
    }

    /// Effective default for a metric row, falling back to its built-in value.
    pub fn threshold(&self, task_type: TaskType, criterion: &MetricCriterion) -> f64 {
        self.get(task_type, criterion.threshold_key)
            .unwrap_or(criterion.builtin_default)
    }

    /// All default keys for one task type.
    pub fn for_task(&self, task_type: TaskType) -> Option<&BTreeMap<String, f64>> {
        self.entries.get(&task_type)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::builtin()
    }
}
