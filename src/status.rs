use serde::{Deserialize, Serialize};

use crate::error::ActionError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Outcome of one action, ready to show in the status line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
}

impl Status {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Status {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Status::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Status::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Status::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Status::new(Severity::Error, message)
    }

    /// Turns an action failure into the message the user sees. External
    /// failures are collapsed into `fallback`, the per-action wording.
    pub fn from_action_error(err: &ActionError, fallback: &str) -> Self {
        match err {
            ActionError::Validation(message) => Status::error(*message),
            ActionError::Duplicate(message) => Status::warning(*message),
            ActionError::NotFound(_) => Status::warning("Tab group no longer exists."),
            ActionError::Store(_) | ActionError::Tab(_) => Status::error(fallback),
        }
    }
}
