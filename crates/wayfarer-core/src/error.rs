use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure condition reported by a capability adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Transport,
    MalformedOutput,
    Refused,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::MalformedOutput => "malformed output",
            Self::Refused => "refused",
        };
        write!(f, "{}", s)
    }
}

/// A normalized failure raised at a capability boundary.
///
/// Adapters never panic on bad backend output; they return one of these and
/// the owning stage decides whether it is fatal or absorbable.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("capability '{capability}' failed ({kind}): {message}")]
pub struct AdapterFailure {
    pub capability: String,
    pub kind: FailureKind,
    pub message: String,
}

impl AdapterFailure {
    pub fn new(
        capability: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(capability, FailureKind::Timeout, message)
    }

    pub fn transport(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(capability, FailureKind::Transport, message)
    }

    pub fn malformed(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(capability, FailureKind::MalformedOutput, message)
    }

    pub fn refused(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(capability, FailureKind::Refused, message)
    }

    /// Whether retrying the same request could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout | FailureKind::Transport)
    }
}

pub type AdapterResult<T> = std::result::Result<T, AdapterFailure>;

#[derive(Debug, Error)]
pub enum WayfarerError {
    // Gate errors
    #[error("scope classifier returned an unrecognized label: {0}")]
    InvalidClassification(String),

    // Extraction errors
    #[error("trip parameter extraction failed: {0}")]
    ExtractionFailed(String),

    // Capability errors (fatal only on the gate/extraction path)
    #[error(transparent)]
    Adapter(#[from] AdapterFailure),

    // Executor errors
    #[error("stage '{stage}' re-entered more than {limit} times")]
    CycleLimitExceeded { stage: String, limit: u32 },

    #[error("routing table error: {0}")]
    RoutingTable(String),

    #[error("run cancelled")]
    Cancelled,

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WayfarerError>;
