use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of a single external command invocation.
///
/// Every invocation is one attempt; the orchestrator decides whether a
/// failure here is fatal to the run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("command timed out after {secs}s")]
    Timeout { secs: u64 },
    /// The process exited 0 but its stderr reported an error. Scaffolding
    /// CLIs routinely misuse exit codes, so stderr classification catches
    /// what the exit status misses.
    #[error("command reported an error on stderr: {detail}")]
    StderrReportedError { detail: String },
    #[error("command exited with status {code}: {detail}")]
    NonZeroExit { code: i32, detail: String },
    #[error("command could not be spawned: {detail}")]
    Spawn { detail: String },
}

/// Error taxonomy for one operation dispatch.
///
/// `Validation`, `Precondition`, and `UnknownOperation` are raised before any
/// step runs and leave no partial state. `Execution` and `Io` abort the
/// remaining sequence; already-applied steps are left in place.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("invalid parameters: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("i/o failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Outcome of validating raw request parameters before any orchestration.
///
/// Errors block the run; warnings (for example a non-empty target directory)
/// are logged and otherwise ignored.
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
