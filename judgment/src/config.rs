//! Process configuration for the judge agent
//!
//! Read once at startup. Environment variables:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `DEFAULT_THRESHOLDS` | inline JSON default-threshold override | none |
//! | `JUDGE_THRESHOLDS_PATH` | JSON/TOML threshold file, wins over the inline blob | none |
//! | `JUDGE_ISSUE_TRACKER_HOST` | only host accepted in issue URLs | `github.com` |
//! | `JUDGE_DEFAULT_MAX_RETRIES` | `max_retries` when a request omits it | 3 |
//! | `JUDGE_NOTIFICATION_CHANNELS` | comma-separated default channels | `slack,github` |

use crate::issue_url::DEFAULT_ISSUE_HOST;
use crate::notification::DEFAULT_CHANNELS;
use crate::thresholds::ThresholdSource;
use std::path::PathBuf;
use tracing::warn;

/// Default retry ceiling applied when a request does not carry one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for [`crate::JudgeAgent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeConfig {
    /// Inline JSON override for default thresholds
    pub thresholds_json: Option<String>,
    /// Threshold override file
    pub thresholds_path: Option<PathBuf>,
    /// Host accepted in issue-tracker URLs
    pub issue_tracker_host: String,
    pub default_max_retries: u32,
    pub default_channels: Vec<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            thresholds_json: None,
            thresholds_path: None,
            issue_tracker_host: DEFAULT_ISSUE_HOST.to_string(),
            default_max_retries: DEFAULT_MAX_RETRIES,
            default_channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl JudgeConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(blob) = lookup("DEFAULT_THRESHOLDS") {
            if !blob.trim().is_empty() {
                config.thresholds_json = Some(blob);
            }
        }
        if let Some(path) = lookup("JUDGE_THRESHOLDS_PATH") {
            if !path.is_empty() {
                config.thresholds_path = Some(PathBuf::from(path));
            }
        }
        if let Some(host) = lookup("JUDGE_ISSUE_TRACKER_HOST") {
            if !host.is_empty() {
                config.issue_tracker_host = host;
            }
        }
        if let Some(max) = lookup("JUDGE_DEFAULT_MAX_RETRIES") {
            match max.trim().parse() {
                Ok(n) => config.default_max_retries = n,
                Err(e) => warn!(
                    value = %max,
                    error = %e,
                    default = DEFAULT_MAX_RETRIES,
                    "Ignoring invalid JUDGE_DEFAULT_MAX_RETRIES"
                ),
            }
        }
        if let Some(list) = lookup("JUDGE_NOTIFICATION_CHANNELS") {
            let channels: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            if channels.is_empty() {
                warn!(
                    value = %list,
                    "JUDGE_NOTIFICATION_CHANNELS names no channel, keeping defaults"
                );
            } else {
                config.default_channels = channels;
            }
        }

        config
    }

    /// The threshold override to resolve, if any. A file wins over the blob.
    pub fn threshold_source(&self) -> Option<ThresholdSource> {
        if let Some(path) = &self.thresholds_path {
            return Some(ThresholdSource::File(path.clone()));
        }
        self.thresholds_json.clone().map(ThresholdSource::Inline)
    }
}
