//! CLI handler for calendar event import.

use anyhow::{Context, Result};
use std::path::Path;

use crate::calendar::CalendarEvent;
use crate::cli::args::ImportCliArgs;
use crate::cli::client::ApiClient;
use crate::cli::format::{format_cost, format_duration};

pub async fn handle_import_command(args: ImportCliArgs) -> Result<()> {
    let event = read_event(&args.file)?;
    let body = serde_json::to_value(&event)?;

    let client = ApiClient::from_config()?;
    let path = if args.apply {
        "/calendar/import?apply=true"
    } else {
        "/calendar/import"
    };
    let json = client.post(path, Some(&body)).await?;

    let imported = &json["imported"];
    let config = &imported["config"];
    println!(
        "Imported '{}' ({} participants)",
        config["title"].as_str().unwrap_or(""),
        config["participants"].as_u64().unwrap_or(1)
    );
    println!(
        "Scheduled: {}  Estimated cost: {}",
        format_duration(imported["duration_seconds"].as_f64().unwrap_or(0.0)),
        format_cost(imported["estimated_cost"].as_f64().unwrap_or(0.0))
    );
    if let Some(efficiency) = imported["efficiency"].as_str() {
        println!("Efficiency: {}", efficiency);
    }
    if json["applied"].as_bool().unwrap_or(false) {
        println!("Tracker loaded with the imported settings.");
    } else {
        println!("Run again with --apply to load it into the tracker.");
    }
    Ok(())
}

fn read_event(path: &Path) -> Result<CalendarEvent> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar event file {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid calendar event in {:?}", path))
}
