// ABOUTME: Connection, retry and tool configuration for a transfer run
// ABOUTME: Built from defaults, an optional TOML file, then CLI overrides

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the transfer file, relative to the working directory
pub const DEFAULT_DUMP_FILE: &str = "data_dump.sql";

/// Connection parameters for one PostgreSQL endpoint
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl ConnectionConfig {
    pub fn source_default() -> Self {
        Self {
            host: "source_postgres".to_string(),
            database: "source_db".to_string(),
            user: "postgres".to_string(),
            password: "secret".to_string(),
            port: None,
        }
    }

    pub fn destination_default() -> Self {
        Self {
            host: "destination_postgres".to_string(),
            database: "destination_db".to_string(),
            user: "postgres".to_string(),
            password: "secret".to_string(),
            port: None,
        }
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("{} host cannot be empty", label);
        }
        if self.database.trim().is_empty() {
            bail!("{} database name cannot be empty", label);
        }
        if self.user.trim().is_empty() {
            bail!("{} user cannot be empty", label);
        }
        Ok(())
    }
}

// Passwords never reach the logs
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .field("port", &self.port)
            .finish()
    }
}

/// Retry budget for the readiness prober
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Maximum number of readiness attempts
    pub max_retry: u32,
    /// Pause between two consecutive attempts
    pub delay: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            max_retry: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// Programs invoked for each step, resolved through PATH unless absolute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    pub pg_isready: PathBuf,
    pub pg_dump: PathBuf,
    pub psql: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pg_isready: PathBuf::from("pg_isready"),
            pg_dump: PathBuf::from("pg_dump"),
            psql: PathBuf::from("psql"),
        }
    }
}

/// Everything a transfer run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub source: ConnectionConfig,
    pub destination: ConnectionConfig,
    pub dump_file: PathBuf,
    pub probe: ProbePolicy,
    pub tools: ToolPaths,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source: ConnectionConfig::source_default(),
            destination: ConnectionConfig::destination_default(),
            dump_file: PathBuf::from(DEFAULT_DUMP_FILE),
            probe: ProbePolicy::default(),
            tools: ToolPaths::default(),
        }
    }
}

impl EtlConfig {
    /// Check that every endpoint and the transfer file are usable
    pub fn validate(&self) -> Result<()> {
        self.source.validate("Source")?;
        self.destination.validate("Destination")?;
        if self.dump_file.as_os_str().is_empty() {
            bail!("Transfer file path cannot be empty");
        }
        Ok(())
    }

    /// Apply the values present in a parsed config file on top of `self`
    pub fn merge(&mut self, file: FileConfig) {
        if let Some(source) = file.source {
            self.source = source;
        }
        if let Some(destination) = file.destination {
            self.destination = destination;
        }
        if let Some(dump_file) = file.dump_file {
            self.dump_file = dump_file;
        }
        if let Some(probe) = file.probe {
            if let Some(max_retry) = probe.max_retry {
                self.probe.max_retry = max_retry;
            }
            if let Some(delay_secs) = probe.delay_secs {
                self.probe.delay = Duration::from_secs(delay_secs);
            }
        }
        if let Some(tools) = file.tools {
            self.tools = tools;
        }
    }
}

/// On-disk shape of the TOML config file; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<ConnectionConfig>,
    pub destination: Option<ConnectionConfig>,
    pub dump_file: Option<PathBuf>,
    pub probe: Option<ProbeSection>,
    pub tools: Option<ToolPaths>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    pub max_retry: Option<u32>,
    pub delay_secs: Option<u64>,
}

pub fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("Failed to parse transfer config")
}

/// Load defaults overlaid with the TOML file at `path`
pub fn load_from_file(path: impl AsRef<Path>) -> Result<EtlConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let file = parse_config(&contents)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    let mut config = EtlConfig::default();
    config.merge(file);
    Ok(config)
}
