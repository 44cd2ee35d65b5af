//! API route modules.

pub mod calendar;
pub mod meetings;
pub mod subscription;
pub mod tracker;
