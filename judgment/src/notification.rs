//! Operator notification payloads for retry and abort decisions.
//!
//! Only builds the message; delivery to chat, email or issue comments is the
//! orchestrator's job.

use crate::decision::Action;
use crate::issue_url::IssueUrl;
use serde::{Deserialize, Serialize};

/// Channels used when a request names none.
pub const DEFAULT_CHANNELS: [&str; 2] = ["slack", "github"];

const REMEDIATIONS: [&str; 4] = [
    "Tune hyperparameters (learning rate, regularization strength, etc.)",
    "Add data augmentation",
    "Strengthen class-imbalance handling (SMOTE, class weights, etc.)",
    "Revisit feature engineering",
];

/// Message plus target channels, forwarded by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNotification {
    pub message: String,
    pub channels: Vec<String>,
}

/// Inputs for one notification.
#[derive(Debug, Clone, Copy)]
pub struct NotificationContext<'a> {
    pub training_id: &'a str,
    pub action: Action,
    pub failed_criteria: &'a [String],
    pub retry_count: u32,
    pub max_retries: u32,
    pub issue_url: Option<&'a IssueUrl>,
    /// Channels requested by the caller; `None` or empty selects the defaults
    pub channels: Option<&'a [String]>,
}

/// Builds operator notifications.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    default_channels: Vec<String>,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        Self::with_default_channels(DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect())
    }

    pub fn with_default_channels(default_channels: Vec<String>) -> Self {
        Self { default_channels }
    }

    pub fn default_channels(&self) -> &[String] {
        &self.default_channels
    }

    pub fn build(&self, ctx: &NotificationContext<'_>) -> OperatorNotification {
        let progress = match ctx.action {
            Action::Abort => format!(
                "retries exhausted ({}/{})",
                ctx.retry_count, ctx.max_retries
            ),
            _ => format!(
                "retry {}/{}",
                ctx.retry_count.saturating_add(1),
                ctx.max_retries
            ),
        };

        let mut lines = vec![
            "🚨 **Model evaluation result: FAILED**".to_string(),
            String::new(),
            format!("**Training ID**: `{}`", inline_code(ctx.training_id)),
            format!("**Retry progress**: {}", progress),
            format!("**Next action**: {}", ctx.action),
            String::new(),
            "**Failed criteria**:".to_string(),
        ];
        lines.extend(ctx.failed_criteria.iter().map(|c| format!("- {}", c)));

        lines.push(String::new());
        lines.push("**Recommended actions**:".to_string());
        lines.extend(
            REMEDIATIONS
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{}. {}", i + 1, r)),
        );

        lines.push(String::new());
        lines.push("Comment on the issue with the adjustments to apply:".to_string());
        lines.push(
            ctx.issue_url
                .map_or_else(|| "N/A".to_string(), |u| u.to_string()),
        );

        let channels = match ctx.channels {
            Some(requested) if !requested.is_empty() => requested.to_vec(),
            _ => self.default_channels.clone(),
        };

        OperatorNotification {
            message: lines.join("\n"),
            channels,
        }
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep an untrusted value inside a single inline-code span.
fn inline_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '`' && !c.is_control())
        .collect()
}
