use crate::game::launcher::types::LaunchInvocation;
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Start the game described by `invocation`.
///
/// The working directory is created if needed. Output is inherited so the
/// game's log goes to the launcher's terminal.
pub async fn spawn_invocation(invocation: &LaunchInvocation) -> Result<Child> {
    log::info!("Launching: {}", invocation.display_command());

    tokio::fs::create_dir_all(&invocation.working_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create working directory {:?}",
                invocation.working_dir
            )
        })?;

    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to start {:?}", invocation.program))?;

    log::info!("Game process started (PID: {:?})", child.id());
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_program_reports_context() {
        let tmp = tempfile::tempdir().unwrap();
        let invocation = LaunchInvocation {
            program: PathBuf::from("/definitely/not/a/java/binary"),
            args: vec![],
            working_dir: tmp.path().join("game"),
        };
        let err = spawn_invocation(&invocation).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start"));
        assert!(tmp.path().join("game").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_working_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let invocation = LaunchInvocation {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), "touch started".into()],
            working_dir: tmp.path().to_path_buf(),
        };
        let mut child = spawn_invocation(&invocation).await.unwrap();
        let status = child.wait().await.unwrap();
        assert!(status.success());
        assert!(tmp.path().join("started").exists());
    }
}
