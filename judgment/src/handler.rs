//! Judge Agent: request entry point
//!
//! Validates the untrusted parts of a [`JudgmentRequest`], runs the
//! evaluate → decide → notify pipeline and assembles a [`JudgmentResult`].
//! [`JudgeAgent::handle`] is the outer wrapper used by process surfaces: it
//! never returns an error, converting every failure into an
//! [`ErrorEnvelope`] with status code 500.
//!
//! # Sequencing
//!
//! ```text
//! validate issue URL ─▶ parse task type ─▶ evaluate criteria
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//!   InvalidIssueUrl   UnsupportedTaskType   decide next action
//!                                                  │ notify?
//!                                                  ▼
//!                                         build notification
//! ```

use crate::config::{JudgeConfig, DEFAULT_MAX_RETRIES};
use crate::criteria::{evaluate, Judgment, TaskType};
use crate::decision::{decide, NextAction};
use crate::error::{ConfigError, JudgeError, JudgeResult};
use crate::issue_url::IssueUrlValidator;
use crate::notification::{NotificationBuilder, NotificationContext, OperatorNotification};
use crate::thresholds::ThresholdTable;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info};

/// Training id reported when the request does not carry a usable one.
pub const UNKNOWN_TRAINING_ID: &str = "unknown";

/// One judgment request from the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JudgmentRequest {
    pub training_id: String,
    /// Task category; must name one of the supported task types
    #[schemars(with = "TaskType")]
    pub task_type: String,
    /// Metric name -> value, as reported by the evaluation stage
    pub evaluation_results: HashMap<String, f64>,
    /// Threshold key -> value overrides for this request
    #[serde(default)]
    pub acceptance_criteria: HashMap<String, f64>,
    /// Attempts already made
    #[serde(default)]
    pub retry_count: u32,
    /// Retry ceiling; the agent default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Issue to link in notifications (untrusted)
    #[serde(
        default,
        alias = "github_issue_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_tracker_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_channels: Option<Vec<String>>,
}

/// Decision returned to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub training_id: String,
    pub judgment: Judgment,
    pub next_action: NextAction,
    /// Reset to 0 on acceptance, otherwise echoed; the caller increments it
    pub retry_count: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_notification: Option<OperatorNotification>,
}

/// Uniform failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`
    pub status: String,
    pub code: String,
    pub error: String,
    pub training_id: String,
}

impl ErrorEnvelope {
    pub fn new(err: &JudgeError, training_id: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code().to_string(),
            error: err.to_string(),
            training_id: training_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Judgment(Box<JudgmentResult>),
    Error(ErrorEnvelope),
}

/// Status-coded response: 200 with a judgment, 500 with an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn ok(result: JudgmentResult) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Judgment(Box::new(result)),
        }
    }

    pub fn error(err: &JudgeError, training_id: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: ResponseBody::Error(ErrorEnvelope::new(err, training_id)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn judgment(&self) -> Option<&JudgmentResult> {
        match &self.body {
            ResponseBody::Judgment(result) => Some(&**result),
            ResponseBody::Error(_) => None,
        }
    }

    pub fn error_envelope(&self) -> Option<&ErrorEnvelope> {
        match &self.body {
            ResponseBody::Error(envelope) => Some(envelope),
            ResponseBody::Judgment(_) => None,
        }
    }
}

/// The judgment engine. Immutable after construction; share it freely.
#[derive(Debug, Clone)]
pub struct JudgeAgent {
    thresholds: ThresholdTable,
    url_validator: IssueUrlValidator,
    notifications: NotificationBuilder,
    default_max_retries: u32,
}

impl JudgeAgent {
    /// Agent with the given default thresholds and stock settings.
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            url_validator: IssueUrlValidator::default(),
            notifications: NotificationBuilder::default(),
            default_max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Resolve thresholds and settings from process configuration.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, ConfigError> {
        let thresholds = ThresholdTable::resolve(config.threshold_source().as_ref());
        Ok(Self {
            thresholds,
            url_validator: IssueUrlValidator::new(&config.issue_tracker_host)?,
            notifications: NotificationBuilder::with_default_channels(
                config.default_channels.clone(),
            ),
            default_max_retries: config.default_max_retries,
        })
    }

    pub fn with_issue_validator(mut self, validator: IssueUrlValidator) -> Self {
        self.url_validator = validator;
        self
    }

    pub fn with_default_max_retries(mut self, max_retries: u32) -> Self {
        self.default_max_retries = max_retries;
        self
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Judge one request.
    ///
    /// Errors are input-contract violations only; an unacceptable model is a
    /// normal `Ok` result with a retry or abort action.
    pub fn judge(&self, request: &JudgmentRequest) -> JudgeResult<JudgmentResult> {
        let issue_url = self
            .url_validator
            .validate(request.issue_tracker_url.as_deref())?;
        let task_type: TaskType = request.task_type.parse()?;
        let max_retries = request.max_retries.unwrap_or(self.default_max_retries);

        info!(
            training_id = %request.training_id,
            task_type = %task_type,
            retry_count = request.retry_count,
            max_retries,
            "Judging model"
        );

        let judgment = evaluate(
            task_type,
            &request.evaluation_results,
            &request.acceptance_criteria,
            &self.thresholds,
        )
        .into_judgment();

        let next_action = decide(judgment.is_acceptable, request.retry_count, max_retries);

        let operator_notification = next_action.notify_operator.then(|| {
            self.notifications.build(&NotificationContext {
                training_id: &request.training_id,
                action: next_action.action,
                failed_criteria: &judgment.failed_criteria,
                retry_count: request.retry_count,
                max_retries,
                issue_url: issue_url.as_ref(),
                channels: request.notification_channels.as_deref(),
            })
        });

        info!(
            training_id = %request.training_id,
            is_acceptable = judgment.is_acceptable,
            passed = judgment.passed_criteria.len(),
            failed = judgment.failed_criteria.len(),
            action = %next_action.action,
            "Judgment complete"
        );

        Ok(JudgmentResult {
            training_id: request.training_id.clone(),
            retry_count: if judgment.is_acceptable {
                0
            } else {
                request.retry_count
            },
            judgment,
            next_action,
            timestamp: Utc::now(),
            operator_notification,
        })
    }

    /// Decode and judge a raw event, enveloping every failure.
    pub fn handle(&self, event: Value) -> HandlerResponse {
        let training_id = event
            .get("training_id")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_TRAINING_ID)
            .to_string();

        let outcome = serde_json::from_value::<JudgmentRequest>(event)
            .map_err(JudgeError::from)
            .and_then(|request| self.judge(&request));

        match outcome {
            Ok(result) => HandlerResponse::ok(result),
            Err(e) => self.reject(&e, training_id),
        }
    }

    /// [`JudgeAgent::handle`] for a JSON document that may not even parse.
    pub fn handle_str(&self, raw: &str) -> HandlerResponse {
        match serde_json::from_str::<Value>(raw) {
            Ok(event) => self.handle(event),
            Err(e) => self.reject(&JudgeError::from(e), UNKNOWN_TRAINING_ID.to_string()),
        }
    }

    fn reject(&self, err: &JudgeError, training_id: String) -> HandlerResponse {
        error!(
            training_id = %training_id,
            code = err.code(),
            error = %err,
            "Error in judge agent"
        );
        HandlerResponse::error(err, training_id)
    }
}

impl Default for JudgeAgent {
    fn default() -> Self {
        Self::new(ThresholdTable::builtin())
    }
}
