// ABOUTME: Typed errors for readiness probing, dump and restore steps
// ABOUTME: Maps each failure to the process exit code reported by the CLI

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

/// External tool invocation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    Export,
    Import,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Probe => write!(f, "Readiness check"),
            Step::Export => write!(f, "Export"),
            Step::Import => write!(f, "Import"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The tool could not be started at all.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{step} failed: {program} exited with {status}{}", render_output(.output))]
    CommandFailed {
        step: Step,
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("PostgreSQL on {host} is not ready after {attempts} retries")]
    NotReady { host: String, attempts: u32 },

    #[error("Transfer file {} does not exist", .path.display())]
    TransferFileMissing { path: PathBuf },

    #[error(
        "Missing required PostgreSQL client tools: {}\n\
         \n\
         Please install PostgreSQL client tools:\n\
         - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
         - macOS: brew install postgresql\n\
         - RHEL/CentOS: sudo yum install postgresql",
        .0.join(", ")
    )]
    MissingTools(Vec<String>),
}

fn render_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(": {}", output)
    }
}

impl EtlError {
    /// Process exit code for this failure.
    ///
    /// Export and import failures propagate the tool's own exit code; every
    /// other failure exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            EtlError::CommandFailed {
                step: Step::Export | Step::Import,
                status,
                ..
            } => status
                .code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Exit code for an error surfaced from a command, looking through any context
/// layers for an [`EtlError`].
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EtlError>())
        .map(EtlError::exit_code)
        .unwrap_or(1)
}
