//! Acceptance Criteria: per-task metric tables and pass/fail evaluation
//!
//! Each task type owns a fixed, ordered table of metrics. A metric row names
//! the threshold key it is compared against, the comparison direction, and the
//! built-in default used when no override exists anywhere.
//!
//! | Task | Metric | Threshold key | Direction |
//! |---|---|---|---|
//! | classification | accuracy, precision, recall, f1_score, auc_roc | `min_*` | `>=` |
//! | regression | rmse, mae | `max_*` | `<=` |
//! | regression | r2_score | `min_r2_score` | `>=` |
//! | clustering | silhouette_score | `min_silhouette_score` | `>=` |
//! | reinforcement_learning | avg_reward, success_rate | `min_*` | `>=` |
//!
//! Effective threshold precedence: request `acceptance_criteria` > resolved
//! default table > built-in row default. Metrics missing from the evaluation
//! results are skipped and never block acceptance.

use crate::error::JudgeError;
use crate::thresholds::ThresholdTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// ML problem category that selects the metric table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Classification,
    Regression,
    Clustering,
    ReinforcementLearning,
}

impl TaskType {
    /// All task types, in table order.
    pub const ALL: [TaskType; 4] = [
        Self::Classification,
        Self::Regression,
        Self::Clustering,
        Self::ReinforcementLearning,
    ];

    /// Wire name of this task type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
            Self::Clustering => "clustering",
            Self::ReinforcementLearning => "reinforcement_learning",
        }
    }

    /// Ordered metric table for this task type.
    pub fn criteria(self) -> &'static [MetricCriterion] {
        match self {
            Self::Classification => CLASSIFICATION_CRITERIA,
            Self::Regression => REGRESSION_CRITERIA,
            Self::Clustering => CLUSTERING_CRITERIA,
            Self::ReinforcementLearning => REINFORCEMENT_LEARNING_CRITERIA,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| JudgeError::UnsupportedTaskType {
                task_type: s.to_string(),
            })
    }
}

/// Comparison direction of a metric against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Higher is better: passes when `actual >= threshold`.
    #[serde(rename = ">=")]
    AtLeast,
    /// Lower is better: passes when `actual <= threshold`.
    #[serde(rename = "<=")]
    AtMost,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }

    /// Boundary values (actual == threshold) pass in both directions.
    pub fn holds(self, actual: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => actual >= threshold,
            Self::AtMost => actual <= threshold,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One row of a task's metric table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricCriterion {
    /// Metric name as reported by the evaluation stage
    pub metric: &'static str,
    /// Threshold key looked up in overrides and defaults
    pub threshold_key: &'static str,
    pub comparison: Comparison,
    /// Value used when neither the request nor the default table has the key
    pub builtin_default: f64,
}

const fn at_least(metric: &'static str, key: &'static str, default: f64) -> MetricCriterion {
    MetricCriterion {
        metric,
        threshold_key: key,
        comparison: Comparison::AtLeast,
        builtin_default: default,
    }
}

const fn at_most(metric: &'static str, key: &'static str, default: f64) -> MetricCriterion {
    MetricCriterion {
        metric,
        threshold_key: key,
        comparison: Comparison::AtMost,
        builtin_default: default,
    }
}

const CLASSIFICATION_CRITERIA: &[MetricCriterion] = &[
    at_least("accuracy", "min_accuracy", 0.85),
    at_least("precision", "min_precision", 0.80),
    at_least("recall", "min_recall", 0.80),
    at_least("f1_score", "min_f1_score", 0.80),
    at_least("auc_roc", "min_auc_roc", 0.85),
];

const REGRESSION_CRITERIA: &[MetricCriterion] = &[
    at_most("rmse", "max_rmse", 10.0),
    at_most("mae", "max_mae", 5.0),
    at_least("r2_score", "min_r2_score", 0.80),
];

const CLUSTERING_CRITERIA: &[MetricCriterion] =
    &[at_least("silhouette_score", "min_silhouette_score", 0.50)];

const REINFORCEMENT_LEARNING_CRITERIA: &[MetricCriterion] = &[
    at_least("avg_reward", "min_avg_reward", 100.0),
    at_least("success_rate", "min_success_rate", 0.70),
];

/// Outcome of comparing one reported metric against its effective threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub metric: &'static str,
    pub comparison: Comparison,
    /// Effective threshold after override resolution
    pub threshold: f64,
    pub actual: f64,
    pub passed: bool,
}

/// Renders `metric op threshold (actual: x.xxxx)`. The threshold keeps a
/// decimal point even when integral (`10.0`, not `10`).
impl std::fmt::Display for CriterionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {:?} (actual: {:.4})",
            self.metric, self.comparison, self.threshold, self.actual
        )
    }
}

/// Pass/fail summary handed back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// True iff `failed_criteria` is empty
    pub is_acceptable: bool,
    pub passed_criteria: Vec<String>,
    pub failed_criteria: Vec<String>,
}

/// All criterion results of one evaluation, in metric-table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub results: Vec<CriterionResult>,
}

impl Evaluation {
    pub fn is_acceptable(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn passed(&self) -> impl Iterator<Item = &CriterionResult> {
        self.results.iter().filter(|r| r.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CriterionResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn into_judgment(self) -> Judgment {
        let passed_criteria: Vec<String> = self.passed().map(ToString::to_string).collect();
        let failed_criteria: Vec<String> = self.failed().map(ToString::to_string).collect();
        Judgment {
            is_acceptable: failed_criteria.is_empty(),
            passed_criteria,
            failed_criteria,
        }
    }
}

/// Evaluate reported metrics against the task's criteria.
///
/// Metrics missing from `evaluation_results` are skipped, so an empty result
/// map is vacuously acceptable.
pub fn evaluate(
    task_type: TaskType,
    evaluation_results: &HashMap<String, f64>,
    acceptance_criteria: &HashMap<String, f64>,
    defaults: &ThresholdTable,
) -> Evaluation {
    let mut results = Vec::with_capacity(task_type.criteria().len());

    for criterion in task_type.criteria() {
        let Some(&actual) = evaluation_results.get(criterion.metric) else {
            debug!(
                task_type = %task_type,
                metric = criterion.metric,
                "Metric not reported, skipping"
            );
            continue;
        };

        let threshold = acceptance_criteria
            .get(criterion.threshold_key)
            .copied()
            .unwrap_or_else(|| defaults.threshold(task_type, criterion));
        let passed = criterion.comparison.holds(actual, threshold);

        debug!(
            metric = criterion.metric,
            op = criterion.comparison.symbol(),
            threshold,
            actual,
            passed,
            "Criterion evaluated"
        );

        results.push(CriterionResult {
            metric: criterion.metric,
            comparison: criterion.comparison,
            threshold,
            actual,
            passed,
        });
    }

    Evaluation { results }
}
