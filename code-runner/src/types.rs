use serde::{Deserialize, Serialize};

/// Default language when a request omits the field.
pub const DEFAULT_LANGUAGE: &str = "python";

/// `return_code` reported when the wall-clock ceiling was exceeded.
pub const TIMEOUT_RETURN_CODE: i32 = -1;

/// `return_code` reported when the process could not be launched or waited on.
pub const FAULT_RETURN_CODE: i32 = -2;

/// Raw request body for `/run_code`, before validation.
///
/// Fields are optional so that a missing field is distinguishable from a body
/// that is not JSON at all; `validate` turns this into an [`ExecutionRequest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A fully validated request: non-empty code and filename, traversal-checked,
/// language defaulted. Produced by [`crate::validate::validate`].
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub code: String,
    pub filename: String,
    pub language: String,
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

impl ExecutionStatus {
    /// `Success` iff the process exited with code 0.
    pub fn from_return_code(code: i32) -> Self {
        if code == 0 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Error
        }
    }
}

/// Result of one execution, serialized verbatim as the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: String,
    /// The literal argument vector that was executed.
    pub command_executed: Vec<String>,
    pub return_code: i32,
}

impl ExecutionOutcome {
    pub fn completed(command: Vec<String>, return_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            status: ExecutionStatus::from_return_code(return_code),
            stdout,
            stderr,
            command_executed: command,
            return_code,
        }
    }

    pub fn timed_out(command: Vec<String>, ceiling_secs: u64) -> Self {
        Self {
            status: ExecutionStatus::Error,
            stdout: String::new(),
            stderr: format!("Execution timed out after {} seconds.", ceiling_secs),
            command_executed: command,
            return_code: TIMEOUT_RETURN_CODE,
        }
    }

    pub fn faulted(command: Vec<String>, detail: String) -> Self {
        Self {
            status: ExecutionStatus::Error,
            stdout: String::new(),
            stderr: detail,
            command_executed: command,
            return_code: FAULT_RETURN_CODE,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.return_code == TIMEOUT_RETURN_CODE
    }

    pub fn is_fault(&self) -> bool {
        self.return_code == FAULT_RETURN_CODE
    }
}
