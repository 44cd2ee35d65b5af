//! Offline cost estimate. Uses the configured rate table; no service needed.

use anyhow::Result;

use crate::cli::args::EstimateCliArgs;
use crate::cli::format::{format_cost, format_duration};
use crate::config::Config;
use crate::cost::{calculate_cost, CostMethod, EfficiencyRating, RateTable};
use crate::meeting::{ConfigUpdate, MeetingConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub hourly_rate: f64,
    pub duration_seconds: f64,
    pub total_cost: f64,
    pub efficiency: Option<EfficiencyRating>,
}

pub fn handle_estimate_command(args: EstimateCliArgs) -> Result<()> {
    let config = Config::load()?;
    let estimate = estimate(&args, &config.rates)?;

    println!(
        "{} participants for {} at {}/h each",
        args.participants.max(1),
        format_duration(estimate.duration_seconds),
        format_cost(estimate.hourly_rate)
    );
    println!("Estimated cost: {}", format_cost(estimate.total_cost));
    if let Some(efficiency) = estimate.efficiency {
        println!("Efficiency: {}", efficiency);
    }
    Ok(())
}

/// Apply the arguments through the same validation as live edits.
pub fn estimate(args: &EstimateCliArgs, rates: &RateTable) -> Result<Estimate> {
    let mut meeting = MeetingConfig::default();
    meeting.apply(ConfigUpdate::Participants(args.participants as i64))?;
    meeting.apply(ConfigUpdate::CostMethod(CostMethod::parse(&args.method)))?;
    if let Some(rate) = args.rate {
        meeting.apply(ConfigUpdate::CustomRate(rate))?;
    }
    if meeting.cost_method == CostMethod::Custom && meeting.custom_rate.is_none() {
        return Err(crate::meeting::TrackerError::MissingCustomRate.into());
    }

    let duration_seconds = (args.minutes * 60.0).max(0.0);
    let total_cost = calculate_cost(duration_seconds, &meeting, rates);
    Ok(Estimate {
        hourly_rate: rates.hourly_rate(meeting.cost_method, meeting.custom_rate),
        duration_seconds,
        total_cost,
        efficiency: EfficiencyRating::classify(total_cost, duration_seconds),
    })
}
