// ABOUTME: Builds PostgreSQL client tool invocations for one endpoint
// ABOUTME: Adds host, port, user and database flags and passes the password via PGPASSWORD

use crate::config::ConnectionConfig;
use std::path::Path;
use std::process::Command;

/// Environment variable libpq reads the password from
pub const PASSWORD_ENV: &str = "PGPASSWORD";

/// Start a `pg_dump`/`psql` command with the endpoint's connection flags
///
/// The password is only set on the child process; the parent environment is
/// inherited otherwise. `--no-password` makes the tool fail instead of
/// prompting when the password is rejected.
pub fn client_command(program: &Path, conn: &ConnectionConfig) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg("--host").arg(&conn.host);
    if let Some(port) = conn.port {
        cmd.arg("--port").arg(port.to_string());
    }
    cmd.arg("--username")
        .arg(&conn.user)
        .arg("--dbname")
        .arg(&conn.database)
        .arg("--no-password")
        .env(PASSWORD_ENV, &conn.password);
    cmd
}

pub(crate) fn program_name(program: &Path) -> String {
    program.display().to_string()
}
