//! Local SQLite storage for finished meetings.

mod init;
pub mod meetings;


pub use init::{migrate, Database};
pub use meetings::{MeetingRecord, MeetingRepository, MeetingStats};
