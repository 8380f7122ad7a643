// ABOUTME: Wrapper for pg_dump to export the source database
// ABOUTME: Writes a plain SQL transfer file for the import step

use crate::config::ConnectionConfig;
use crate::error::{EtlError, Step};
use crate::postgres::connection::{client_command, program_name};
use std::path::Path;
use std::process::Stdio;

/// Dump the whole source database to `output_path` as plain SQL
///
/// Runs once with no retry. The tool's output is streamed to the console.
///
/// # Errors
///
/// - [`EtlError::Spawn`] if `pg_dump` cannot be started
/// - [`EtlError::CommandFailed`] if it exits non-zero
/// - [`EtlError::TransferFileMissing`] if it succeeded without writing `output_path`
pub async fn dump_database(
    pg_dump: &Path,
    source: &ConnectionConfig,
    output_path: &Path,
) -> Result<(), EtlError> {
    tracing::info!(
        "Dumping database '{}' from {} to {}",
        source.database,
        source.host,
        output_path.display()
    );

    let status = client_command(pg_dump, source)
        .arg("--file")
        .arg(output_path)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| EtlError::Spawn {
            program: program_name(pg_dump),
            source,
        })?;

    if !status.success() {
        return Err(EtlError::CommandFailed {
            step: Step::Export,
            program: program_name(pg_dump),
            status,
            output: String::new(),
        });
    }

    if !output_path.exists() {
        return Err(EtlError::TransferFileMissing {
            path: output_path.to_path_buf(),
        });
    }

    tracing::info!("✓ Data export completed");
    Ok(())
}
