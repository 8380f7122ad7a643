// ABOUTME: Readiness gate for the source and destination servers
// ABOUTME: Polls each endpoint in turn and fails if either never comes up

use crate::config::{ConnectionConfig, EtlConfig, ProbePolicy};
use crate::error::EtlError;
use crate::postgres;
use crate::utils;
use anyhow::Result;
use std::path::Path;

/// Wait for both endpoints to accept connections without transferring data
///
/// The source is polled first; the destination is only polled once the
/// source is ready.
pub async fn wait(config: &EtlConfig) -> Result<()> {
    config.validate()?;
    utils::check_required_tools(&[config.tools.pg_isready.as_path()])?;

    wait_for_endpoint(&config.tools.pg_isready, &config.source, &config.probe, "Source").await?;
    wait_for_endpoint(
        &config.tools.pg_isready,
        &config.destination,
        &config.probe,
        "Destination",
    )
    .await?;

    tracing::info!("✅ Source and destination databases are ready");
    Ok(())
}

pub(crate) async fn wait_for_endpoint(
    pg_isready: &Path,
    conn: &ConnectionConfig,
    policy: &ProbePolicy,
    label: &str,
) -> Result<()> {
    if postgres::wait_for_ready(pg_isready, &conn.host, conn.port, policy).await {
        return Ok(());
    }

    let err = EtlError::NotReady {
        host: conn.host.clone(),
        attempts: policy.max_retry,
    };
    Err(anyhow::Error::new(err).context(format!("{} database is not available", label)))
}
