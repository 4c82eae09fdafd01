//! Command-line interface for the tap binary.
//!
//! The CLI exposes subcommands for discovering the stream catalog and for
//! syncing records. Record and schema messages go to stdout; logs and
//! progress go to stderr so that output stays machine-readable.

use std::{io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand};
use tap_fpl::{load_config, run_discover, run_sync, Error, HttpTransport, MessageWriter};

/// Command line interface for extracting Fantasy Premier League data.
#[derive(Debug, Parser)]
#[command(name = "tap-fpl", version, about = "Extract Fantasy Premier League record streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
/// Supported commands exposed by the CLI.
enum Command {
    /// Print the stream catalog for the configured selection.
    Discover(DiscoverArgs),
    /// Sync the selected streams, emitting schema and record messages.
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
/// Arguments accepted by the `discover` subcommand.
struct DiscoverArgs {
    /// Path to the YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Args)]
/// Arguments accepted by the `sync` subcommand.
struct SyncArgs {
    /// Path to the YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    /// Restrict the run to a single named stream.
    #[arg(long = "stream", value_name = "NAME")]
    stream: Option<String>,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration loading, discovery, and
/// sync.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Discover(args) => run_discover_command(args),
        Command::Sync(args) => run_sync_command(args).await,
    }
}

fn run_discover_command(args: DiscoverArgs) -> Result<(), Error> {
    let config = load_config(&args.config)?;
    let catalog = run_discover(&config)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut handle, &catalog)?;
    } else {
        serde_json::to_writer(&mut handle, &catalog)?;
    }

    Ok(())
}

async fn run_sync_command(args: SyncArgs) -> Result<(), Error> {
    let mut config = load_config(&args.config)?;
    if args.stream.is_some() {
        config.stream = args.stream;
    }

    let transport = HttpTransport::new(&config)?;
    let stdout = io::stdout();
    let mut writer = MessageWriter::new(stdout.lock());

    run_sync(&config, &transport, &mut writer).await?;

    Ok(())
}
