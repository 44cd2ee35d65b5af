//! Post-meeting hook abstraction and shell command implementation.
//!
//! After a meeting stops, an optional hook can run to process the result
//! (e.g. post the cost to a team channel or append it to a spreadsheet).

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use super::tracker::MeetingSummary;

/// Environment variable names for meeting metadata passed to hooks.
pub mod hook_env {
    pub const MEETING_ID: &str = "MEETCOST_MEETING_ID";
    pub const TITLE: &str = "MEETCOST_TITLE";
    pub const TOTAL_COST: &str = "MEETCOST_TOTAL_COST";
    pub const DURATION_SECONDS: &str = "MEETCOST_DURATION_SECONDS";
    pub const EFFICIENCY: &str = "MEETCOST_EFFICIENCY";
}

/// A stopped meeting, passed to hooks for post-processing.
pub struct MeetingResult {
    /// Database ID, if the meeting was persisted.
    pub meeting_id: Option<i64>,
    pub summary: MeetingSummary,
}

#[async_trait]
pub trait PostMeetingHook: Send + Sync {
    async fn execute(&self, result: &MeetingResult) -> Result<()>;
}

/// Executes a shell command with meeting data.
/// - Pipes the summary JSON to stdin
/// - Sets environment variables for meeting metadata
/// - Kills process on timeout
/// - Non-zero exit code logs warning but does not fail
pub struct ShellCommandHook {
    command: String,
    timeout: Duration,
}

impl ShellCommandHook {
    pub fn new(command: String, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl PostMeetingHook for ShellCommandHook {
    async fn execute(&self, result: &MeetingResult) -> Result<()> {
        let summary = &result.summary;
        info!(
            "Running post-meeting hook for '{}': {}",
            summary.title, self.command
        );

        let payload = serde_json::to_vec(summary)?;

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(
                hook_env::MEETING_ID,
                result.meeting_id.map(|id| id.to_string()).unwrap_or_default(),
            )
            .env(hook_env::TITLE, &summary.title)
            .env(hook_env::TOTAL_COST, format!("{:.2}", summary.total_cost))
            .env(
                hook_env::DURATION_SECONDS,
                format!("{:.0}", summary.elapsed_seconds),
            )
            .env(
                hook_env::EFFICIENCY,
                summary.efficiency.map(|e| e.as_str()).unwrap_or(""),
            )
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            use tokio::io::AsyncWriteExt;
            let _ = stdin.write_all(&payload).await;
            // Dropping stdin signals EOF
        }

        // kill_on_drop handles cleanup on timeout
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if !stdout.is_empty() {
                        info!("Post-meeting hook stdout: {}", stdout.trim());
                    }
                    info!("Post-meeting hook completed successfully");
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(
                        "Post-meeting hook exited with status {}: {}",
                        output.status,
                        stderr.trim()
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Post-meeting hook failed to execute: {}", e);
            }
            Err(_) => {
                warn!(
                    "Post-meeting hook timed out after {}s (process will be killed)",
                    self.timeout.as_secs()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostMethod, EfficiencyRating};
    use chrono::Utc;

    fn result(meeting_id: Option<i64>) -> MeetingResult {
        MeetingResult {
            meeting_id,
            summary: MeetingSummary {
                run_id: None,
                title: "Standup".to_string(),
                meeting_type: "status-update".to_string(),
                participants: 5,
                cost_method: CostMethod::FixedRate,
                hourly_rate: 50.0,
                elapsed_seconds: 900.0,
                total_cost: 62.5,
                efficiency: Some(EfficiencyRating::Good),
                started_at: None,
                ended_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_shell_command_hook_creation() {
        let hook = ShellCommandHook::new("echo hello".to_string(), 3600);
        assert_eq!(hook.command, "echo hello");
        assert_eq!(hook.timeout, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_shell_command_hook_writes_env_and_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("hook.out");
        let command = format!(
            "cat > {path}.json; echo \"$MEETCOST_MEETING_ID|$MEETCOST_TITLE|$MEETCOST_TOTAL_COST|$MEETCOST_DURATION_SECONDS|$MEETCOST_EFFICIENCY\" > {path}",
            path = out.display()
        );
        let hook = ShellCommandHook::new(command, 10);

        hook.execute(&result(Some(42))).await.unwrap();

        let env_line = std::fs::read_to_string(&out).unwrap();
        assert_eq!(env_line.trim(), "42|Standup|62.50|900|Good");

        let stdin_json = std::fs::read_to_string(out.with_extension("out.json")).unwrap();
        let parsed: MeetingSummary = serde_json::from_str(&stdin_json).unwrap();
        assert_eq!(parsed.title, "Standup");
        assert_eq!(parsed.total_cost, 62.5);
    }

    #[tokio::test]
    async fn test_shell_command_hook_nonzero_exit() {
        let hook = ShellCommandHook::new("exit 1".to_string(), 10);
        // Non-zero exit should NOT cause an error, just a warning
        assert!(hook.execute(&result(None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_shell_command_hook_timeout() {
        let hook = ShellCommandHook::new("sleep 5".to_string(), 0);
        assert!(hook.execute(&result(None)).await.is_ok());
    }
}
