//! Retry Decision: Deterministic bounded-retry state machine
//!
//! One call produces one terminal decision. The multi-attempt loop lives in
//! the orchestrator, which re-invokes the judge with an incremented
//! `retry_count` after each retry.
//!
//! ```text
//! acceptable ───────────────────────────────▶ Deploy  (no notification)
//!     │ no
//!     ▼
//! retry_count < max_retries ──── yes ───────▶ Retry   (notify operator)
//!     │ no
//!     ▼
//! Abort (notify operator, manual intervention)
//! ```

use serde::{Deserialize, Serialize};

/// Next pipeline stage requested from the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Model accepted, promote to deployment
    Deploy,
    /// Train again with adjusted settings
    Retry,
    /// Retries exhausted, halt and escalate to a human
    Abort,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deploy => write!(f, "deploy"),
            Self::Retry => write!(f, "retry"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Decision produced for a single judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub action: Action,
    /// Human-readable reason for the decision
    pub reason: String,
    /// Whether an operator notification must accompany the decision
    pub notify_operator: bool,
}

/// Map acceptance plus retry progress onto the next action.
pub fn decide(is_acceptable: bool, retry_count: u32, max_retries: u32) -> NextAction {
    if is_acceptable {
        return NextAction {
            action: Action::Deploy,
            reason: "Model meets all acceptance criteria".to_string(),
            notify_operator: false,
        };
    }

    if retry_count < max_retries {
        return NextAction {
            action: Action::Retry,
            reason: format!(
                "Model does not meet criteria. Retry {}/{}",
                retry_count.saturating_add(1),
                max_retries
            ),
            notify_operator: true,
        };
    }

    NextAction {
        action: Action::Abort,
        reason: format!(
            "Model failed after {} retries. Manual intervention required.",
            max_retries
        ),
        notify_operator: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTS: [u32; 6] = [0, 1, 2, 3, 5, u32::MAX];

    #[test]
    fn test_acceptable_always_deploys_silently() {
        for r in COUNTS {
            for m in COUNTS {
                let next = decide(true, r, m);
                assert_eq!(next.action, Action::Deploy, "r={r} m={m}");
                assert!(!next.notify_operator);
                assert!(next.reason.contains("meets all acceptance criteria"));
            }
        }
    }

    #[test]
    fn test_retry_iff_budget_remains() {
        for r in COUNTS {
            for m in COUNTS {
                let next = decide(false, r, m);
                assert!(next.notify_operator, "r={r} m={m}");
                if r < m {
                    assert_eq!(next.action, Action::Retry);
                    assert!(
                        next.reason.contains(&format!("Retry {}/{}", r + 1, m)),
                        "reason: {}",
                        next.reason
                    );
                } else {
                    assert_eq!(next.action, Action::Abort);
                    assert!(next.reason.contains("Manual intervention required"));
                }
            }
        }
    }

    #[test]
    fn test_exhausted_retries_abort() {
        let next = decide(false, 3, 3);
        assert_eq!(next.action, Action::Abort);
        assert_eq!(
            next.reason,
            "Model failed after 3 retries. Manual intervention required."
        );
    }

    #[test]
    fn test_zero_budget_aborts_first_failure() {
        assert_eq!(decide(false, 0, 0).action, Action::Abort);
    }

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&decide(false, 0, 3)).unwrap();
        assert!(json.contains("\"action\":\"retry\""), "JSON: {json}");
        assert_eq!(Action::Abort.to_string(), "abort");
    }
}
