// ABOUTME: Readiness polling for PostgreSQL servers using pg_isready
// ABOUTME: Retries a fixed number of times with a fixed delay before giving up

use super::connection::program_name;
use crate::config::ProbePolicy;
use crate::error::{EtlError, Step};
use std::future::Future;
use std::path::Path;
use std::process::Command;

const ACCEPTING_CONNECTIONS: &str = "accepting connections";

/// Outcome of a single readiness check that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// The check succeeded but did not report accepting connections
    NotReady(String),
}

/// Run `pg_isready` once against `host`
///
/// Returns `Ready` only when the tool exits successfully and reports
/// "accepting connections". A non-zero exit is returned as
/// [`EtlError::CommandFailed`] with the tool's output attached.
pub async fn check_ready(
    pg_isready: &Path,
    host: &str,
    port: Option<u16>,
) -> Result<Readiness, EtlError> {
    let mut cmd = Command::new(pg_isready);
    cmd.arg("--host").arg(host);
    if let Some(port) = port {
        cmd.arg("--port").arg(port.to_string());
    }

    let output = cmd.output().map_err(|source| EtlError::Spawn {
        program: program_name(pg_isready),
        source,
    })?;
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let report = if stdout.is_empty() {
            stderr.trim().to_string()
        } else {
            stdout
        };
        return Err(EtlError::CommandFailed {
            step: Step::Probe,
            program: program_name(pg_isready),
            status: output.status,
            output: report,
        });
    }

    if stdout.contains(ACCEPTING_CONNECTIONS) {
        Ok(Readiness::Ready)
    } else {
        Ok(Readiness::NotReady(stdout))
    }
}

/// Wait until `host` accepts connections, using `pg_isready`
///
/// Returns `false` once the retry budget is spent; callers decide whether
/// that aborts the run.
pub async fn wait_for_ready(
    pg_isready: &Path,
    host: &str,
    port: Option<u16>,
    policy: &ProbePolicy,
) -> bool {
    wait_until(host, policy, || check_ready(pg_isready, host, port)).await
}

/// Poll `check` until it reports [`Readiness::Ready`] or `policy.max_retry`
/// attempts have failed
///
/// A not-ready report and a failed check are handled the same way: logged,
/// counted, and followed by a `policy.delay` pause unless it was the last
/// attempt. There is no pause after the final failed attempt, so `n` failures
/// cost `n - 1` delays rather than `n`. Never returns an error.
pub async fn wait_until<F, Fut>(host: &str, policy: &ProbePolicy, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Readiness, EtlError>>,
{
    tracing::info!("Waiting for PostgreSQL on {} to start...", host);

    let mut attempt = 0;
    while attempt < policy.max_retry {
        attempt += 1;

        match check().await {
            Ok(Readiness::Ready) => {
                tracing::info!("✓ Successfully connected to PostgreSQL on {}", host);
                return true;
            }
            Ok(Readiness::NotReady(report)) => {
                tracing::warn!(
                    "⚠ PostgreSQL on {} is not accepting connections yet: {}",
                    host,
                    report
                );
            }
            Err(e) => {
                tracing::warn!("✗ Error connecting to PostgreSQL on {}: {}", host, e);
            }
        }

        tracing::info!("Attempt {}/{} failed", attempt, policy.max_retry);
        if attempt < policy.max_retry {
            tracing::info!("Retrying in {:?}...", policy.delay);
            tokio::time::sleep(policy.delay).await;
        }
    }

    tracing::error!(
        "✗ PostgreSQL on {} is not ready after {} retries",
        host,
        policy.max_retry
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    fn policy(max_retry: u32, delay_secs: u64) -> ProbePolicy {
        ProbePolicy {
            max_retry,
            delay: Duration::from_secs(delay_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_third_attempt_waits_two_delays() {
        let mut attempts = 0;
        let start = Instant::now();

        let ready = wait_until("source_postgres", &policy(10, 5), || {
            attempts += 1;
            let current = attempts;
            async move {
                if current < 3 {
                    Ok(Readiness::NotReady("no response".to_string()))
                } else {
                    Ok(Readiness::Ready)
                }
            }
        })
        .await;

        assert!(ready);
        assert_eq!(attempts, 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_exhausts_budget() {
        let mut attempts = 0;
        let start = Instant::now();

        let ready = wait_until("destination_postgres", &policy(2, 1), || {
            attempts += 1;
            async move { Ok(Readiness::NotReady("no response".to_string())) }
        })
        .await;

        assert!(!ready);
        assert_eq!(attempts, 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_errors_are_retried_like_not_ready() {
        let mut attempts = 0;

        let ready = wait_until("source_postgres", &policy(5, 5), || {
            attempts += 1;
            let current = attempts;
            async move {
                if current == 1 {
                    Err(EtlError::Spawn {
                        program: "pg_isready".to_string(),
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    })
                } else {
                    Ok(Readiness::Ready)
                }
            }
        })
        .await;

        assert!(ready);
        assert_eq!(attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_immediately_does_not_sleep() {
        let start = Instant::now();
        let ready = wait_until("source_postgres", &policy(10, 5), || async {
            Ok(Readiness::Ready)
        })
        .await;

        assert!(ready);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_budget_never_checks() {
        let mut attempts = 0;
        let ready = wait_until("source_postgres", &policy(0, 5), || {
            attempts += 1;
            async { Ok(Readiness::Ready) }
        })
        .await;

        assert!(!ready);
        assert_eq!(attempts, 0);
    }

    #[tokio::test]
    async fn test_check_ready_with_missing_tool_is_spawn_error() {
        let result = check_ready(
            Path::new("/nonexistent/bin/pg_isready"),
            "source_postgres",
            None,
        )
        .await;

        assert!(matches!(result, Err(EtlError::Spawn { .. })));
    }

    #[cfg(unix)]
    mod with_fake_tool {
        use super::*;
        use crate::test_support::write_script;
        use tempfile::tempdir;

        #[tokio::test]
        async fn test_accepting_connections_is_ready() {
            let dir = tempdir().unwrap();
            let tool = write_script(
                dir.path(),
                "pg_isready",
                "echo \"$2:5432 - accepting connections\"",
            );

            let result = check_ready(&tool, "source_postgres", None).await.unwrap();
            assert_eq!(result, Readiness::Ready);
        }

        #[tokio::test]
        async fn test_success_without_phrase_is_not_ready() {
            let dir = tempdir().unwrap();
            let tool = write_script(dir.path(), "pg_isready", "echo \"$2:5432 - starting up\"");

            let result = check_ready(&tool, "source_postgres", None).await.unwrap();
            assert_eq!(
                result,
                Readiness::NotReady("source_postgres:5432 - starting up".to_string())
            );
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_command_failure() {
            let dir = tempdir().unwrap();
            let tool = write_script(
                dir.path(),
                "pg_isready",
                "echo \"$2:$4 - no response\"\nexit 2",
            );

            let err = check_ready(&tool, "source_postgres", Some(6543))
                .await
                .unwrap_err();
            match err {
                EtlError::CommandFailed {
                    step,
                    status,
                    output,
                    ..
                } => {
                    assert_eq!(step, Step::Probe);
                    assert_eq!(status.code(), Some(2));
                    assert_eq!(output, "source_postgres:6543 - no response");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
