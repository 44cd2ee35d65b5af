//! CLI handler for recorded meetings.

use anyhow::Result;
use serde_json::Value;

use crate::cli::args::{MeetingsCliArgs, MeetingsCommand};
use crate::cli::client::ApiClient;
use crate::cli::format::{format_cost, format_duration};

pub async fn handle_meetings_command(args: MeetingsCliArgs) -> Result<()> {
    let client = ApiClient::from_config()?;
    match args.command {
        MeetingsCommand::List { limit } => list_meetings(&client, limit).await,
        MeetingsCommand::Show { id } => show_meeting(&client, id).await,
        MeetingsCommand::Stats => show_stats(&client).await,
    }
}

async fn list_meetings(client: &ApiClient, limit: usize) -> Result<()> {
    let json = client.get(&format!("/meetings?limit={}", limit)).await?;

    let meetings = json
        .get("meetings")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    if meetings.is_empty() {
        println!("No meetings recorded yet.");
        return Ok(());
    }

    for meeting in &meetings {
        println!(
            "#{} {} {} {} - {}",
            meeting["id"].as_i64().unwrap_or(0),
            meeting["title"].as_str().unwrap_or("Untitled"),
            format_duration(meeting["duration_seconds"].as_f64().unwrap_or(0.0)),
            format_cost(meeting["total_cost"].as_f64().unwrap_or(0.0)),
            meeting["ended_at"].as_str().unwrap_or(""),
        );
    }

    println!("\nFor details, use: meetcost meetings show <ID>");
    Ok(())
}

async fn show_meeting(client: &ApiClient, id: i64) -> Result<()> {
    let meeting = client.get(&format!("/meetings/{}", id)).await?;
    print_meeting(&meeting);
    Ok(())
}

fn print_meeting(meeting: &Value) {
    let text = |key: &str| meeting[key].as_str().unwrap_or("").to_string();

    println!("Meeting #{}", meeting["id"].as_i64().unwrap_or(0));
    println!("Title: {}", text("title"));
    println!("Type: {}", text("meeting_type"));
    println!(
        "Participants: {}",
        meeting["participants"].as_i64().unwrap_or(1)
    );
    println!(
        "Method: {} at {}/h",
        text("cost_method"),
        format_cost(meeting["hourly_rate"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Duration: {}",
        format_duration(meeting["duration_seconds"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Total cost: {}",
        format_cost(meeting["total_cost"].as_f64().unwrap_or(0.0))
    );
    if let Some(efficiency) = meeting["efficiency"].as_str() {
        println!("Efficiency: {}", efficiency);
    }
    if let Some(started) = meeting["started_at"].as_str() {
        println!("Started: {}", started);
    }
    println!("Ended: {}", text("ended_at"));
}

async fn show_stats(client: &ApiClient) -> Result<()> {
    let stats = client.get("/meetings/stats").await?;

    let count = stats["meeting_count"].as_i64().unwrap_or(0);
    if count == 0 {
        println!("No meetings recorded yet.");
        return Ok(());
    }

    println!("Meetings: {}", count);
    println!(
        "Total cost: {}",
        format_cost(stats["total_cost"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Total time: {}",
        format_duration(stats["total_duration_seconds"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Average cost: {}",
        format_cost(stats["average_cost"].as_f64().unwrap_or(0.0))
    );
    println!(
        "Average length: {}",
        format_duration(stats["average_duration_seconds"].as_f64().unwrap_or(0.0))
    );
    if let Some(per_minute) = stats["cost_per_minute"].as_f64() {
        println!("Cost per minute: {}", format_cost(per_minute));
    }
    Ok(())
}
