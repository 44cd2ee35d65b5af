use anyhow::Result;
use clap::Parser;
use meetcost::{
    app,
    cli::{
        handle_estimate_command, handle_import_command, handle_meetings_command,
        handle_pause_command, handle_set_command, handle_start_command, handle_status_command,
        handle_stop_command, handle_watch_command, Cli, CliCommand,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("meetcost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Start) => handle_start_command().await,
        Some(CliCommand::Pause) => handle_pause_command().await,
        Some(CliCommand::Stop) => handle_stop_command().await,
        Some(CliCommand::Status) => handle_status_command().await,
        Some(CliCommand::Set(args)) => handle_set_command(args).await,
        Some(CliCommand::Watch(args)) => handle_watch_command(args).await,
        Some(CliCommand::Meetings(args)) => handle_meetings_command(args).await,
        Some(CliCommand::Import(args)) => handle_import_command(args).await,
        Some(CliCommand::Estimate(args)) => handle_estimate_command(args),
        None => app::run_service().await,
    }
}
