// ABOUTME: CLI entry point for postgres-etl-transfer
// ABOUTME: Builds the transfer config and routes to the requested command

use clap::{Args, Parser};
use postgres_etl_transfer::commands;
use postgres_etl_transfer::config::{self, EtlConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "postgres-etl-transfer")]
#[command(about = "Copy a PostgreSQL database to another server with pg_dump and psql", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,
    /// Only wait for both servers to accept connections, then exit
    #[arg(long)]
    wait_only: bool,
}

#[derive(Args, Clone, Default)]
struct SettingsArgs {
    /// Path to a TOML file with source, destination, probe and tool settings
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    destination: DestinationArgs,
    /// Where the dump is written and read back from
    #[arg(long)]
    dump_file: Option<PathBuf>,
    /// Maximum readiness attempts per server
    #[arg(long)]
    max_retry: Option<u32>,
    /// Seconds to wait between readiness attempts
    #[arg(long = "retry-delay")]
    retry_delay_secs: Option<u64>,
}

#[derive(Args, Clone, Default)]
struct SourceArgs {
    #[arg(id = "source_host", long = "source-host")]
    host: Option<String>,
    #[arg(id = "source_port", long = "source-port")]
    port: Option<u16>,
    #[arg(id = "source_database", long = "source-db")]
    database: Option<String>,
    #[arg(id = "source_user", long = "source-user")]
    user: Option<String>,
    #[arg(
        id = "source_password",
        long = "source-password",
        env = "ETL_SOURCE_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,
}

#[derive(Args, Clone, Default)]
struct DestinationArgs {
    #[arg(id = "destination_host", long = "destination-host")]
    host: Option<String>,
    #[arg(id = "destination_port", long = "destination-port")]
    port: Option<u16>,
    #[arg(id = "destination_database", long = "destination-db")]
    database: Option<String>,
    #[arg(id = "destination_user", long = "destination-user")]
    user: Option<String>,
    #[arg(
        id = "destination_password",
        long = "destination-password",
        env = "ETL_DESTINATION_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = run(&cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(postgres_etl_transfer::error::exit_code(&e))
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = build_config(&cli.settings)?;
    if cli.wait_only {
        commands::wait(&config).await
    } else {
        commands::transfer(&config).await
    }
}

fn build_config(args: &SettingsArgs) -> anyhow::Result<EtlConfig> {
    let mut config = match &args.config_path {
        Some(path) => config::load_from_file(path)?,
        None => EtlConfig::default(),
    };

    let source = &mut config.source;
    override_with(&mut source.host, &args.source.host);
    override_with(&mut source.database, &args.source.database);
    override_with(&mut source.user, &args.source.user);
    override_with(&mut source.password, &args.source.password);
    if args.source.port.is_some() {
        source.port = args.source.port;
    }

    let destination = &mut config.destination;
    override_with(&mut destination.host, &args.destination.host);
    override_with(&mut destination.database, &args.destination.database);
    override_with(&mut destination.user, &args.destination.user);
    override_with(&mut destination.password, &args.destination.password);
    if args.destination.port.is_some() {
        destination.port = args.destination.port;
    }

    override_with(&mut config.dump_file, &args.dump_file);
    override_with(&mut config.probe.max_retry, &args.max_retry);
    if let Some(secs) = args.retry_delay_secs {
        config.probe.delay = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

fn override_with<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
