// ABOUTME: One-shot transfer command: wait, export, import
// ABOUTME: Runs each stage in order and stops at the first failure

use super::wait::wait_for_endpoint;
use crate::config::EtlConfig;
use crate::{migration, utils};
use anyhow::{Context, Result};
use std::fmt;

/// Position of a transfer run in its fixed sequence of stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    WaitSource,
    WaitDestination,
    Export,
    Import,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::WaitSource => "WAIT_SOURCE",
            Stage::WaitDestination => "WAIT_DEST",
            Stage::Export => "EXPORT",
            Stage::Import => "IMPORT",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Copy the source database into the destination through a dump file
///
/// Steps:
/// 1. Wait for the source to accept connections
/// 2. Wait for the destination to accept connections
/// 3. Dump the source with `pg_dump` into `config.dump_file`
/// 4. Load that file into the destination with `psql`
///
/// The dump file is left on disk afterwards. A failed import leaves the
/// destination partially loaded.
///
/// # Errors
///
/// Fails at the first stage that does not succeed; the error wraps an
/// [`crate::error::EtlError`] that determines the process exit code.
///
/// # Examples
///
/// ```no_run
/// # use anyhow::Result;
/// # use postgres_etl_transfer::commands::transfer;
/// # use postgres_etl_transfer::config::EtlConfig;
/// # async fn example() -> Result<()> {
/// transfer(&EtlConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn transfer(config: &EtlConfig) -> Result<()> {
    let mut stage = Stage::Init;
    run_tracked(config, &mut stage).await
}

/// Run every stage, leaving `stage` at `Done` or `Failed`
async fn run_tracked(config: &EtlConfig, stage: &mut Stage) -> Result<()> {
    let result = run_stages(config, stage).await;

    match &result {
        Ok(()) => tracing::info!("🎉 Transfer completed successfully"),
        Err(_) => {
            tracing::error!("✗ Transfer failed during {}", stage);
            enter(stage, Stage::Failed);
        }
    }
    result
}

async fn run_stages(config: &EtlConfig, stage: &mut Stage) -> Result<()> {
    tracing::info!("🚀 Starting transfer...");
    config.validate()?;
    utils::check_required_tools(&utils::transfer_tools(&config.tools))?;

    enter(stage, Stage::WaitSource);
    wait_for_endpoint(&config.tools.pg_isready, &config.source, &config.probe, "Source").await?;

    enter(stage, Stage::WaitDestination);
    wait_for_endpoint(
        &config.tools.pg_isready,
        &config.destination,
        &config.probe,
        "Destination",
    )
    .await?;

    enter(stage, Stage::Export);
    tracing::info!("📤 Exporting data from source database...");
    migration::dump_database(&config.tools.pg_dump, &config.source, &config.dump_file)
        .await
        .context("Failed to export data from source database")?;

    enter(stage, Stage::Import);
    tracing::info!("📥 Importing data into destination database...");
    migration::restore_database(&config.tools.psql, &config.destination, &config.dump_file)
        .await
        .context("Failed to import data into destination database")?;

    enter(stage, Stage::Done);
    Ok(())
}

fn enter(stage: &mut Stage, next: Stage) {
    tracing::debug!("Stage {} -> {}", stage, next);
    *stage = next;
}
