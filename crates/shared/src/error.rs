use thiserror::Error;

/// Central error taxonomy for the operator.
///
/// - `UnsupportedVersion` is a deployment/config error: a schema version the
///   running build does not know about. Never retried.
/// - `ConflictingUpdate` is transient: the caller re-reads and re-applies
///   the mutation. Surfaced only when the retry budget is exhausted.
/// - `OrchestratorStepFailure` is absorbed at the reconciler boundary and
///   recorded as the resource's ERROR status.
/// - `InterruptedHandling` marks a resource found in HANDLING at the start
///   of a reconcile attempt: the previous attempt crashed mid-flight.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("unsupported version {version} for kind {kind}")]
    UnsupportedVersion { kind: String, version: String },

    #[error("conflicting update on {name}: retry budget exhausted")]
    ConflictingUpdate { name: String },

    #[error("step {step} failed: {message}")]
    OrchestratorStepFailure { step: String, message: String },

    #[error("handling interrupted mid-flight, previous attempt: {previous}")]
    InterruptedHandling { previous: String },

    #[error("resource {name} not found")]
    ResourceNotFound { name: String },

    #[error("malformed resource: {message}")]
    MalformedResource { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("resource client error: {message}")]
    Client { message: String },
}

impl OperatorError {
    /// Whether the failure can be retried by re-reading and re-applying.
    pub fn is_transient(&self) -> bool {
        matches!(self, OperatorError::ConflictingUpdate { .. })
    }

    pub fn client(message: impl Into<String>) -> Self {
        OperatorError::Client {
            message: message.into(),
        }
    }

    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        OperatorError::OrchestratorStepFailure {
            step: step.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
