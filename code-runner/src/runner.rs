use std::process::Stdio;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::{
    process::Command,
    time::{self, Duration},
};
use tracing::{debug, error, warn};

use crate::types::ExecutionOutcome;

/// Runs a resolved command as a child process under a hard wall-clock ceiling.
///
/// Every invocation yields exactly one outcome: a normal exit with the real
/// exit code, a timeout with the timeout sentinel, or a fault with the fault
/// sentinel. The runner never retries.
#[derive(Debug, Clone)]
pub struct ExecutionRunner {
    ceiling: Duration,
}

impl ExecutionRunner {
    pub fn new(ceiling: Duration) -> Self {
        Self { ceiling }
    }

    pub async fn run(&self, command: Vec<String>) -> ExecutionOutcome {
        debug!(command = ?command, "Executing command");

        let (program, args) = match command.split_first() {
            Some(split) => split,
            None => {
                return ExecutionOutcome::faulted(command.clone(), "Empty command".to_string());
            }
        };

        let program_path = match which::which(program) {
            Ok(path) => path,
            Err(_) => {
                error!(program = %program, "Interpreter binary not found");
                return ExecutionOutcome::faulted(
                    command.clone(),
                    format!("Command not found: {}", program),
                );
            }
        };

        let mut command_builder = Command::new(&program_path);
        command_builder
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // New session so the child leads its own process group; the timeout
        // kill must reach anything the script itself spawned.
        unsafe {
            command_builder.pre_exec(|| {
                nix::unistd::setsid()
                    .map(drop)
                    .map_err(|e| std::io::Error::from_raw_os_error(e as i32))
            });
        }

        let child = match command_builder.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(program = %program, "Failed to spawn process: {}", e);
                return ExecutionOutcome::faulted(
                    command.clone(),
                    format!("An unexpected error occurred during execution: {}", e),
                );
            }
        };

        let child_id = child.id();
        match time::timeout(self.ceiling, child.wait_with_output()).await {
            Ok(Ok(output)) => match output.status.code() {
                Some(return_code) => {
                    debug!(return_code, "Execution finished");
                    ExecutionOutcome::completed(
                        command,
                        return_code,
                        String::from_utf8_lossy(&output.stdout).to_string(),
                        String::from_utf8_lossy(&output.stderr).to_string(),
                    )
                }
                // Killed by a signal we did not send; no exit code exists.
                None => {
                    warn!(status = %output.status, "Process terminated by signal");
                    ExecutionOutcome::faulted(
                        command,
                        format!("Process terminated abnormally: {}", output.status),
                    )
                }
            },
            Ok(Err(e)) => {
                error!("Failed waiting on process: {}", e);
                ExecutionOutcome::faulted(
                    command,
                    format!("An unexpected error occurred during execution: {}", e),
                )
            }
            Err(_) => {
                warn!(ceiling_secs = self.ceiling.as_secs(), "Execution timed out");
                // The child is its own group leader, so killing the group
                // takes down the whole process tree, not just the direct
                // child; kill_on_drop remains as a backstop for the child.
                if let Some(id) = child_id {
                    if let Err(e) = signal::killpg(Pid::from_raw(id as i32), Signal::SIGKILL) {
                        error!(pid = id, "Failed to kill timed-out process group: {}", e);
                    }
                }
                ExecutionOutcome::timed_out(command, self.ceiling.as_secs())
            }
        }
    }
}
