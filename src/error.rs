use thiserror::Error;

/// Result type alias for webpilot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the credential store, session manager and dispatcher.
///
/// Recoverable outcomes (missing or malformed credentials, a rejected probe,
/// a failed task) are distinct variants so front ends can re-prompt instead
/// of aborting; store I/O and session construction failures are fatal to the
/// current operation and left to the operator. Teardown problems are never
/// errors, they are logged as warnings by the session manager.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider id not present in the model catalog
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    /// No credential resolvable from the environment or the credential file
    #[error("no credential available for provider '{0}'")]
    MissingCredential(String),

    /// Secret rejected by the placeholder/length heuristics
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Enrollment round-trip rejected by the provider
    #[error("credential probe failed: {0}")]
    ProbeFailed(String),

    /// Credential file could not be written; prior contents are untouched
    #[error("failed to write credential file: {0}")]
    WriteFailed(String),

    /// Browser engine or context construction failed
    #[error("browser session initialization failed: {0}")]
    SessionInit(String),

    /// Browser collaborator failure outside of session construction
    #[error("browser operation failed: {0}")]
    Browser(String),

    /// Model provider request failed (network or auth)
    #[error("provider request failed: {0}")]
    Provider(String),

    /// Agent-reported failure while executing a task; the session stays live
    #[error("task failed: {0}")]
    Task(String),
}
