// ABOUTME: Wrapper for psql to import the transfer file into the destination
// ABOUTME: Replays the SQL file verbatim with statement echo enabled

use crate::config::ConnectionConfig;
use crate::error::{EtlError, Step};
use crate::postgres::connection::{client_command, program_name};
use std::path::Path;
use std::process::Stdio;

/// Load `input_path` into the destination database with `psql --echo-all`
///
/// The file is handed to psql unchanged. psql keeps going after a failed
/// statement, so a zero exit does not mean every statement applied.
pub async fn restore_database(
    psql: &Path,
    destination: &ConnectionConfig,
    input_path: &Path,
) -> Result<(), EtlError> {
    tracing::info!(
        "Importing {} into database '{}' on {}",
        input_path.display(),
        destination.database,
        destination.host
    );

    if !input_path.exists() {
        return Err(EtlError::TransferFileMissing {
            path: input_path.to_path_buf(),
        });
    }

    let status = client_command(psql, destination)
        .arg("--echo-all")
        .arg("--file")
        .arg(input_path)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| EtlError::Spawn {
            program: program_name(psql),
            source,
        })?;

    if !status.success() {
        return Err(EtlError::CommandFailed {
            step: Step::Import,
            program: program_name(psql),
            status,
            output: String::new(),
        });
    }

    tracing::info!("✓ Data import completed");
    Ok(())
}
