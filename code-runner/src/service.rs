use std::path::PathBuf;

use tokio::time::Duration;
use tracing::{error, info};

use crate::{
    error::Error,
    languages::LanguageRegistry,
    runner::ExecutionRunner,
    types::{ExecutionOutcome, ExecutionStatus, RunRequest},
    validate::validate,
    workspace::Workspace,
};

/// Orchestrates one execution: validate, materialize the scratch file,
/// resolve the command, run it. The scratch guard is held across every exit
/// path, so the file is gone by the time this returns, whatever happened.
#[derive(Debug, Clone)]
pub struct ExecutionService {
    workspace: Workspace,
    languages: LanguageRegistry,
    runner: ExecutionRunner,
}

impl ExecutionService {
    /// Service with the default language table (python only).
    pub fn new(workspace_root: impl Into<PathBuf>, ceiling: Duration) -> Self {
        Self::with_registry(workspace_root, LanguageRegistry::default(), ceiling)
    }

    pub fn with_registry(
        workspace_root: impl Into<PathBuf>,
        languages: LanguageRegistry,
        ceiling: Duration,
    ) -> Self {
        Self {
            workspace: Workspace::new(workspace_root),
            languages,
            runner: ExecutionRunner::new(ceiling),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub async fn execute(&self, raw: RunRequest) -> Result<ExecutionOutcome, Error> {
        let request = validate(raw)?;
        info!(
            filename = %request.filename,
            language = %request.language,
            "Received execution request"
        );

        let scratch = self
            .workspace
            .materialize(&request.filename, &request.code)
            .await?;

        // Resolving after the write matches the observable contract: an
        // unsupported language must still leave no file behind, which the
        // guard's drop handles.
        let command = self.languages.resolve(&request.language, scratch.path())?;

        let outcome = self.runner.run(command).await;
        match outcome.status {
            ExecutionStatus::Success => {
                info!(return_code = outcome.return_code, "Execution finished")
            }
            ExecutionStatus::Error => {
                error!(return_code = outcome.return_code, "Execution failed")
            }
        }

        drop(scratch);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::CommandTemplate;
    use crate::types::TIMEOUT_RETURN_CODE;
    use tempfile::tempdir;

    // Tests use `sh` so they hold on hosts without a python interpreter.
    fn sh_service(root: &std::path::Path, ceiling: Duration) -> ExecutionService {
        let mut registry = LanguageRegistry::empty();
        registry.register("shell", CommandTemplate::new("sh", vec![]));
        ExecutionService::with_registry(root, registry, ceiling)
    }

    fn request(code: &str, filename: &str, language: &str) -> RunRequest {
        RunRequest {
            code: Some(code.to_string()),
            filename: Some(filename.to_string()),
            language: Some(language.to_string()),
        }
    }

    #[tokio::test]
    async fn successful_run_reports_output_and_cleans_up() {
        let dir = tempdir().unwrap();
        let service = sh_service(dir.path(), Duration::from_secs(5));

        let outcome = service
            .execute(request("echo hello", "ok.sh", "shell"))
            .await
            .unwrap();

        assert_eq!(outcome.return_code, 0);
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(
            outcome.command_executed,
            vec!["sh".to_string(), dir.path().join("ok.sh").display().to_string()]
        );
        assert!(!dir.path().join("ok.sh").exists());
    }

    #[tokio::test]
    async fn failing_program_still_cleans_up() {
        let dir = tempdir().unwrap();
        let service = sh_service(dir.path(), Duration::from_secs(5));

        let outcome = service
            .execute(request("exit 1", "fail.sh", "shell"))
            .await
            .unwrap();

        assert_eq!(outcome.return_code, 1);
        assert!(!dir.path().join("fail.sh").exists());
    }

    #[tokio::test]
    async fn timeout_still_cleans_up() {
        let dir = tempdir().unwrap();
        let service = sh_service(dir.path(), Duration::from_millis(200));

        let outcome = service
            .execute(request("sleep 30", "slow.sh", "shell"))
            .await
            .unwrap();

        assert_eq!(outcome.return_code, TIMEOUT_RETURN_CODE);
        assert!(!dir.path().join("slow.sh").exists());
    }

    #[tokio::test]
    async fn unsupported_language_leaves_no_file_behind() {
        let dir = tempdir().unwrap();
        let service = sh_service(dir.path(), Duration::from_secs(5));

        let err = service
            .execute(request("echo hi", "script.lua", "lua"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedLanguage(ref l) if l == "lua"));
        assert!(!dir.path().join("script.lua").exists());
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let service = sh_service(dir.path(), Duration::from_secs(5));

        let err = service
            .execute(request("echo hi", "../evil.sh", "shell"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PathTraversal));
        // Validation failed before materialize, so the root was never created.
        assert!(!dir.path().join("../evil.sh").exists());
    }
}
