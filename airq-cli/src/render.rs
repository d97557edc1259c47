//! Human-friendly output for the terminal.

use std::fmt::Write as _;

use airq_core::{
    AirQualityReport, MapConfig, MapView, Pollutant, PollutantReading, ViewState, level,
};
use chrono::NaiveDateTime;

const NO_DATA_HINT: &str = "Detailed air quality data might not be available for this specific \
                            point or time. Try a nearby major area.";

pub fn render_state(state: &ViewState) -> String {
    match state {
        ViewState::NoSelection => {
            "Air Quality\n  Select a location to view air quality data.".to_string()
        }
        ViewState::Loading { selection } => {
            format!("Loading air quality for {}...", selection.location)
        }
        ViewState::Failed { message, .. } => format!("Error Fetching Data\n  {message}"),
        ViewState::Loaded { report, .. } => render_report(report),
    }
}

pub fn render_map(view: &MapView) -> String {
    match view {
        MapView::Rendered { url, zoom, .. } => format!("Map (zoom {zoom}): {url}"),
        MapView::Unavailable { reasons } => {
            let mut out = String::from("Map Configuration Error\n");
            for reason in reasons {
                let _ = writeln!(out, "  {reason}");
            }
            out.push_str("  Run `airq configure` to set map credentials.");
            out
        }
    }
}

pub fn render_map_status(config: &MapConfig) -> String {
    match config {
        MapConfig::Ready { .. } => "Map credentials: ready".to_string(),
        MapConfig::Missing { reasons } => format!("Map credentials: missing ({})", reasons.join(" ")),
    }
}

fn render_report(report: &AirQualityReport) -> String {
    let mut out = String::from("Air Quality Report\n");
    let _ = writeln!(out, "  Coordinates: {}", report.location);
    if let Some(address) = &report.address {
        let _ = writeln!(out, "  {address}");
    }
    if !report.timezone.is_empty() {
        let _ = writeln!(out, "  Timezone: {}", report.timezone);
    }

    for pollutant in [Pollutant::CarbonMonoxide, Pollutant::CarbonDioxide, Pollutant::Dust] {
        if let Some(reading) = report.reading(pollutant) {
            render_reading(&mut out, pollutant, reading, &report.timezone);
        }
    }

    // Pollen only when the provider had something.
    for pollutant in [Pollutant::BirchPollen, Pollutant::GrassPollen] {
        if let Some(reading) = report.reading(pollutant).filter(|r| !r.sample.is_absent()) {
            render_reading(&mut out, pollutant, reading, &report.timezone);
        }
    }

    if report.is_empty() {
        let _ = writeln!(out, "\n  {NO_DATA_HINT}");
    }

    out.trim_end().to_string()
}

fn render_reading(out: &mut String, pollutant: Pollutant, reading: &PollutantReading, timezone: &str) {
    let _ = writeln!(out, "\n  {}", pollutant.label());
    let _ = writeln!(out, "    {}", format_value(pollutant, reading));
    let _ = writeln!(
        out,
        "    Last updated: {}",
        format_time(reading.sample.timestamp.as_deref(), timezone)
    );
}

fn format_value(pollutant: Pollutant, reading: &PollutantReading) -> String {
    let Some(value) = reading.sample.value else {
        return "N/A".to_string();
    };

    let mut text = format!("{value:.2}");
    if let Some(unit) = &reading.unit {
        let _ = write!(text, " {unit}");
    }
    if let Some(level) = level::classify(pollutant, value) {
        let _ = write!(text, " ({level})");
    }
    text
}

/// `Jun 1, 2024 01:00 (GMT)`; falls back to the raw timestamp if it doesn't parse.
fn format_time(timestamp: Option<&str>, timezone: &str) -> String {
    let Some(ts) = timestamp else {
        return "N/A".to_string();
    };
    let zone = if timezone.is_empty() { "UTC" } else { timezone };

    match NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M") {
        Ok(dt) => format!("{} ({zone})", dt.format("%b %-d, %Y %H:%M")),
        Err(_) => ts.to_string(),
    }
}
