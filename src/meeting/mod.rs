//! Meeting cost tracking.
//!
//! The tracker state machine, its tick task, and the session that ties them
//! to persistence and post-meeting hooks.

pub mod clock;
pub mod config;
pub mod error;
pub mod post_meeting_hook;
pub mod session;
pub mod sink;
pub mod status;
pub mod ticker;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigUpdate, MeetingConfig, MeetingType};
pub use error::TrackerError;
pub use post_meeting_hook::{MeetingResult, PostMeetingHook, ShellCommandHook};
pub use session::{CostPreview, MeetingSession, MeetingStopResult};
pub use sink::{MeetingSink, SqliteMeetingSink};
pub use status::{TrackerStatus, TrackerStatusHandle};
pub use ticker::{TickEvent, Ticker};
pub use tracker::{MeetingRun, MeetingSummary, MeetingTracker, TrackerPhase, TrackerSnapshot};
