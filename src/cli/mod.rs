pub mod args;
pub mod client;
pub mod estimate;
pub mod format;
pub mod import;
pub mod meeting;
pub mod tracker;

pub use args::{
    Cli, CliCommand, EstimateCliArgs, ImportCliArgs, MeetingsCliArgs, MeetingsCommand, SetCliArgs,
    WatchCliArgs,
};
pub use estimate::handle_estimate_command;
pub use import::handle_import_command;
pub use meeting::handle_meetings_command;
pub use tracker::{
    handle_pause_command, handle_set_command, handle_start_command, handle_status_command,
    handle_stop_command, handle_watch_command,
};
