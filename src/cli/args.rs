use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meetcost")]
#[command(about = "Live meeting cost tracker", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Start or resume the meeting timer
    Start,
    /// Pause the meeting timer
    Pause,
    /// Stop the meeting and record it
    Stop,
    /// Show the current meeting cost
    Status,
    /// Change one meeting setting (title, type, participants, cost_method, custom_rate)
    Set(SetCliArgs),
    /// Follow the running cost live
    Watch(WatchCliArgs),
    /// Browse recorded meetings
    Meetings(MeetingsCliArgs),
    /// Import a calendar event from a JSON file
    Import(ImportCliArgs),
    /// Estimate a meeting's cost without the service
    Estimate(EstimateCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct SetCliArgs {
    /// Setting to change
    pub field: String,
    /// New value
    pub value: String,
    /// Show the resulting cost without applying the change
    #[arg(long)]
    pub preview: bool,
}

#[derive(ClapArgs, Debug)]
pub struct WatchCliArgs {
    /// Refresh interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,
}

#[derive(ClapArgs, Debug)]
pub struct MeetingsCliArgs {
    #[command(subcommand)]
    pub command: MeetingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeetingsCommand {
    /// List recorded meetings, newest first
    List {
        /// Maximum number of meetings to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one recorded meeting
    Show {
        /// Meeting ID
        id: i64,
    },
    /// Aggregate statistics across recorded meetings
    Stats,
}

#[derive(ClapArgs, Debug)]
pub struct ImportCliArgs {
    /// Path to a calendar event JSON file
    pub file: PathBuf,
    /// Load the imported settings into the tracker
    #[arg(long)]
    pub apply: bool,
}

#[derive(ClapArgs, Debug)]
pub struct EstimateCliArgs {
    /// Number of attendees
    #[arg(short, long, default_value = "1")]
    pub participants: u32,
    /// Cost method (salary-based, fixed-rate, role-based, custom)
    #[arg(short, long, default_value = "fixed-rate")]
    pub method: String,
    /// Hourly rate for the custom method
    #[arg(short, long)]
    pub rate: Option<f64>,
    /// Meeting length in minutes
    #[arg(long, default_value = "60")]
    pub minutes: f64,
}
