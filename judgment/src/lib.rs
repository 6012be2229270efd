//! Model Judgment Library
//!
//! Decides what happens to a finished training run:
//! - Resolves default acceptance thresholds per task type (built-in, or an
//!   override blob loaded once at startup)
//! - Evaluates reported metrics against effective thresholds
//! - Runs a bounded-retry state machine: deploy, retry, or abort
//! - Builds an injection-safe operator notification when a human is needed
//!
//! All decisions are deterministic and side-effect free; the orchestrator
//! that invokes the judge owns retries, deployment and message delivery.
//!
//! # Usage
//!
//! ```rust,ignore
//! use judgment::{JudgeAgent, JudgeConfig};
//!
//! let agent = JudgeAgent::from_config(&JudgeConfig::from_env())?;
//! let response = agent.handle(event);
//! if let Some(result) = response.judgment() {
//!     println!("next action: {}", result.next_action.action);
//! }
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod criteria;
pub mod decision;
pub mod error;
pub mod handler;
pub mod issue_url;
pub mod notification;
pub mod thresholds;

pub use config::JudgeConfig;
pub use criteria::{evaluate, Comparison, CriterionResult, Evaluation, Judgment, TaskType};
pub use decision::{decide, Action, NextAction};
pub use error::{ConfigError, JudgeError, JudgeResult, ThresholdConfigError};
pub use handler::{
    ErrorEnvelope, HandlerResponse, JudgeAgent, JudgmentRequest, JudgmentResult, ResponseBody,
    UNKNOWN_TRAINING_ID,
};
pub use issue_url::{IssueUrl, IssueUrlValidator};
pub use notification::{NotificationBuilder, NotificationContext, OperatorNotification};
pub use thresholds::{ThresholdSource, ThresholdTable};
