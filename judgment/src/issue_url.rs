//! Issue URL Validation: injection guard for notification links
//!
//! The issue-tracker URL arrives untrusted and is rendered verbatim into
//! outbound chat/issue messages. It is accepted only when it matches exactly
//!
//! ```text
//! https://<host>/<owner>/<repo>/issues/<number>
//! ```
//!
//! with `<host>` fixed to the configured tracker host, `<owner>`/`<repo>`
//! restricted to ASCII word characters and hyphens, and `<number>` ASCII
//! digits. The pattern is anchored at both ends, so scheme swaps, `pull/`
//! links, host spoofing (`https://evil.com/github.com/...`), script URIs and
//! trailing line breaks are all rejected.
//!
//! A validated URL is carried as [`IssueUrl`], the only form the
//! notification builder accepts.

use crate::error::{ConfigError, JudgeError, JudgeResult};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default issue-tracker host.
pub const DEFAULT_ISSUE_HOST: &str = "github.com";

static GITHUB_ISSUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&issue_pattern(DEFAULT_ISSUE_HOST))
        .expect("GITHUB_ISSUE_PATTERN regex should compile")
});

fn issue_pattern(host: &str) -> String {
    format!(
        r"\Ahttps://{}/[A-Za-z0-9_-]+/[A-Za-z0-9_-]+/issues/[0-9]+\z",
        regex::escape(host)
    )
}

/// An issue-tracker URL that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueUrl(String);

impl IssueUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssueUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strict validator bound to one tracker host.
#[derive(Debug, Clone)]
pub struct IssueUrlValidator {
    host: String,
    pattern: Regex,
}

impl IssueUrlValidator {
    /// Build a validator for a tracker host. The host is matched literally
    /// and may carry a port, but no path, scheme or whitespace.
    pub fn new(host: &str) -> Result<Self, ConfigError> {
        let reason = if host.is_empty() {
            Some("host is empty")
        } else if host.contains('/') {
            Some("host must not contain '/'")
        } else if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("host must not contain whitespace")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidIssueHost {
                host: host.to_string(),
                reason,
            });
        }

        let pattern = if host == DEFAULT_ISSUE_HOST {
            GITHUB_ISSUE_PATTERN.clone()
        } else {
            Regex::new(&issue_pattern(host)).map_err(|source| ConfigError::IssuePattern {
                host: host.to_string(),
                source,
            })?
        };
        Ok(Self {
            host: host.to_string(),
            pattern,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether `url` is acceptable. Empty means "no URL" and is accepted.
    pub fn is_valid(&self, url: &str) -> bool {
        url.is_empty() || self.pattern.is_match(url)
    }

    /// Validate an optional raw URL.
    ///
    /// `None` and the empty string both mean "no URL supplied" and yield
    /// `Ok(None)`. Anything else must match the pattern.
    pub fn validate(&self, url: Option<&str>) -> JudgeResult<Option<IssueUrl>> {
        match url {
            None | Some("") => Ok(None),
            Some(raw) if self.pattern.is_match(raw) => Ok(Some(IssueUrl(raw.to_string()))),
            Some(raw) => Err(JudgeError::InvalidIssueUrl {
                url: raw.to_string(),
            }),
        }
    }
}

impl Default for IssueUrlValidator {
    fn default() -> Self {
        Self {
            host: DEFAULT_ISSUE_HOST.to_string(),
            pattern: GITHUB_ISSUE_PATTERN.clone(),
        }
    }
}
