//! CLI handlers for tracker control.
//!
//! All commands communicate via the HTTP API.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::args::{SetCliArgs, WatchCliArgs};
use crate::cli::client::ApiClient;
use crate::cli::format::{format_cost, format_duration};

pub async fn handle_start_command() -> Result<()> {
    let client = ApiClient::from_config()?;
    let json = client.post("/tracker/start", None).await?;
    let snapshot = &json["snapshot"];
    println!(
        "Meeting '{}' running ({} participants, {}/h)",
        str_field(&snapshot["config"], "title"),
        snapshot["config"]["participants"].as_u64().unwrap_or(1),
        format_cost(snapshot["hourly_rate"].as_f64().unwrap_or(0.0)),
    );
    Ok(())
}

pub async fn handle_pause_command() -> Result<()> {
    let client = ApiClient::from_config()?;
    let json = client.post("/tracker/pause", None).await?;
    let snapshot = &json["snapshot"];
    println!(
        "Meeting paused at {} ({} so far)",
        format_duration(snapshot["elapsed_seconds"].as_f64().unwrap_or(0.0)),
        format_cost(snapshot["total_cost"].as_f64().unwrap_or(0.0)),
    );
    Ok(())
}

pub async fn handle_stop_command() -> Result<()> {
    let client = ApiClient::from_config()?;
    let json = client.post("/tracker/stop", None).await?;

    let summary = &json["summary"];
    println!("Meeting '{}' stopped", str_field(summary, "title"));
    println!(
        "Duration: {}",
        format_duration(json["duration_seconds"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Total cost: {}",
        format_cost(json["total_cost"].as_f64().unwrap_or(0.0))
    );
    if let Some(efficiency) = json["efficiency"].as_str() {
        println!("Efficiency: {}", efficiency);
    }
    match json["meeting_id"].as_i64() {
        Some(id) => println!("Saved as meeting #{}", id),
        None => println!("Not saved (no time tracked)"),
    }
    Ok(())
}

pub async fn handle_status_command() -> Result<()> {
    let client = ApiClient::from_config()?;
    let snapshot = client.get("/tracker").await?;
    print_snapshot(&snapshot);
    if !snapshot["running"].as_bool().unwrap_or(false) {
        if let Some(line) = last_meeting_line(&snapshot) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn last_meeting_line(snapshot: &Value) -> Option<String> {
    let last = snapshot.get("last_meeting").filter(|v| !v.is_null())?;
    let summary = &last["summary"];
    let saved = match last["meeting_id"].as_i64() {
        Some(id) => format!("saved as #{}", id),
        None => "not saved".to_string(),
    };
    Some(format!(
        "Last meeting: '{}' {} for {} ({})",
        str_field(summary, "title"),
        format_cost(summary["total_cost"].as_f64().unwrap_or(0.0)),
        format_duration(summary["elapsed_seconds"].as_f64().unwrap_or(0.0)),
        saved
    ))
}

pub async fn handle_set_command(args: SetCliArgs) -> Result<()> {
    let client = ApiClient::from_config()?;
    let body = json!({
        "field": args.field,
        "value": parse_value(&args.value),
    });

    if args.preview {
        let json = client.post("/tracker/preview", Some(&body)).await?;
        println!(
            "Cost now: {}  With change: {}",
            format_cost(json["current_total_cost"].as_f64().unwrap_or(0.0)),
            format_cost(json["total_cost"].as_f64().unwrap_or(0.0)),
        );
        return Ok(());
    }

    let snapshot = client.put("/tracker/config", &body).await?;
    println!("Updated {}", args.field);
    print_snapshot(&snapshot);
    Ok(())
}

/// Poll the tracker and show the running cost on a spinner line until the
/// meeting is no longer running.
pub async fn handle_watch_command(args: WatchCliArgs) -> Result<()> {
    let client = ApiClient::from_config()?;
    let interval = Duration::from_millis(args.interval_ms.max(100));

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    loop {
        let snapshot = client.get("/tracker").await?;
        pb.set_message(watch_line(&snapshot));

        if !snapshot["running"].as_bool().unwrap_or(false) {
            pb.finish_with_message(watch_line(&snapshot));
            break;
        }
        tokio::time::sleep(interval).await;
    }
    Ok(())
}

/// Parse a CLI value as JSON when possible so numbers arrive as numbers.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn watch_line(snapshot: &Value) -> String {
    let mut line = format!(
        "[{}] {} {} ({})",
        str_field(snapshot, "state"),
        str_field(&snapshot["config"], "title"),
        format_cost(snapshot["total_cost"].as_f64().unwrap_or(0.0)),
        format_duration(snapshot["elapsed_seconds"].as_f64().unwrap_or(0.0)),
    );
    if let Some(trend) = trend(snapshot) {
        line.push_str(&format!(" {}", trend));
    }
    line
}

/// Cost change across the kept samples, when the plan exposes them.
fn trend(snapshot: &Value) -> Option<String> {
    let history = snapshot["cost_history"].as_array()?;
    let first = history.first()?.as_f64()?;
    let last = history.last()?.as_f64()?;
    Some(format!("+{} over last {} samples", format_cost(last - first), history.len()))
}

fn print_snapshot(snapshot: &Value) {
    let config = &snapshot["config"];
    println!(
        "Meeting: {} ({})",
        str_field(config, "title"),
        str_field(snapshot, "state")
    );
    println!(
        "Participants: {}  Method: {}  Rate: {}/h",
        config["participants"].as_u64().unwrap_or(1),
        str_field(config, "cost_method"),
        format_cost(snapshot["hourly_rate"].as_f64().unwrap_or(0.0)),
    );
    println!(
        "Elapsed: {}  Cost: {}",
        format_duration(snapshot["elapsed_seconds"].as_f64().unwrap_or(0.0)),
        format_cost(snapshot["total_cost"].as_f64().unwrap_or(0.0)),
    );
    if let Some(efficiency) = snapshot["efficiency"].as_str() {
        println!("Efficiency: {}", efficiency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::ConfigUpdate;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("8"), json!(8));
        assert_eq!(parse_value("112.5"), json!(112.5));
        assert_eq!(parse_value("Weekly sync"), json!("Weekly sync"));
        assert_eq!(parse_value("\"42\""), json!("42"));
    }

    #[test]
    fn test_watch_line_without_history() {
        let snapshot = json!({
            "state": "running",
            "config": {"title": "Standup"},
            "total_cost": 12.5,
            "elapsed_seconds": 90.0,
            "cost_history": null,
        });
        assert_eq!(watch_line(&snapshot), "[running] Standup $12.50 (01:30)");
    }

    #[test]
    fn test_last_meeting_line() {
        let snapshot = json!({
            "last_meeting": {
                "meeting_id": 7,
                "summary": {"title": "Retro", "total_cost": 240.0, "elapsed_seconds": 1800.0},
            },
        });
        assert_eq!(
            last_meeting_line(&snapshot).as_deref(),
            Some("Last meeting: 'Retro' $240.00 for 30:00 (saved as #7)")
        );
        assert!(last_meeting_line(&json!({"last_meeting": null})).is_none());
    }

    #[test]
    fn test_title_value_from_cli_is_accepted() {
        let update = ConfigUpdate::from_field("title", &parse_value("2024")).unwrap();
        assert_eq!(update, ConfigUpdate::Title("2024".to_string()));
    }

    #[test]
    fn test_trend_from_history() {
        let snapshot = json!({"cost_history": [1.0, 2.0, 4.5]});
        assert_eq!(
            trend(&snapshot).as_deref(),
            Some("+$3.50 over last 3 samples")
        );
        assert!(trend(&json!({"cost_history": []})).is_none());
    }
}
