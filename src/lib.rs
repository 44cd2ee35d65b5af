pub mod api;
pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod cost;
pub mod db;
pub mod global;
pub mod meeting;
pub mod subscription;
