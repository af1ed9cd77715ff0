//! # Code Runner
//!
//! Sandboxed code-execution core: validates submitted source, materializes it
//! as a scratch file under a workspace root, dispatches the declared language
//! to an interpreter command, runs it under a hard wall-clock ceiling, and
//! guarantees the scratch file is removed afterward regardless of outcome.

mod error;
mod languages;
mod runner;
mod service;
mod types;
mod validate;
mod workspace;

pub use error::Error;
pub use languages::{CommandTemplate, LanguageRegistry};
pub use runner::ExecutionRunner;
pub use service::ExecutionService;
pub use types::{
    ExecutionOutcome, ExecutionRequest, ExecutionStatus, RunRequest, DEFAULT_LANGUAGE,
    FAULT_RETURN_CODE, TIMEOUT_RETURN_CODE,
};
pub use validate::validate;
pub use workspace::{ScratchFile, Workspace};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
