// ABOUTME: Pre-flight checks run before any database is contacted
// ABOUTME: Verifies the PostgreSQL client tools can be found

use crate::config::ToolPaths;
use crate::error::EtlError;
use std::path::Path;
use which::which;

/// Check that the client tools a step needs are available
///
/// Bare names are looked up in PATH; paths must point at an executable.
///
/// # Errors
///
/// Returns [`EtlError::MissingTools`] listing every tool that was not found,
/// with installation instructions.
///
/// # Examples
///
/// ```no_run
/// # use postgres_etl_transfer::config::ToolPaths;
/// # use postgres_etl_transfer::utils::{check_required_tools, transfer_tools};
/// let tools = ToolPaths::default();
/// check_required_tools(&transfer_tools(&tools))?;
/// # Ok::<(), postgres_etl_transfer::error::EtlError>(())
/// ```
pub fn check_required_tools(tools: &[&Path]) -> Result<(), EtlError> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|tool| which(tool).is_err())
        .map(|tool| tool.display().to_string())
        .collect();

    if !missing.is_empty() {
        return Err(EtlError::MissingTools(missing));
    }

    Ok(())
}

/// Every tool a full transfer invokes
pub fn transfer_tools(tools: &ToolPaths) -> [&Path; 3] {
    [
        tools.pg_isready.as_path(),
        tools.pg_dump.as_path(),
        tools.psql.as_path(),
    ]
}
