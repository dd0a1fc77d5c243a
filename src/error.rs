use thiserror::Error;

/// Failure reading or replacing the persisted slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode groups: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure reported by the browser tab primitives.
#[derive(Debug, Error)]
pub enum TabError {
    #[error("tab query failed: {0}")]
    Query(String),
    #[error("could not create tab for {url}: {reason}")]
    Create { url: String, reason: String },
}

/// Why an action stopped early. Never leaves the action boundary; see
/// [`crate::status::Status`].
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("duplicate: {0}")]
    Duplicate(&'static str),
    #[error("group {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Tab(#[from] TabError),
}
