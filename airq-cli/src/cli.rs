use std::sync::mpsc;

use airq_core::{
    Config, Location, MapPicker, OpenMeteoGeocoder, OpenMeteoProvider, Place, PlaceSearch,
    Selection, Session, ViewState,
};
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "airq", version, about = "Air quality for any point on the map")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set map credentials and the provider endpoint.
    Configure,

    /// Show air quality at explicit coordinates.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Optional label shown with the report.
        #[arg(long)]
        address: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search for a place by name and show its air quality.
    Search {
        /// Place name, e.g. "Berlin".
        query: String,

        /// Take the first match instead of asking.
        #[arg(long)]
        first: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, address, json } => {
                let config = Config::load()?;
                let mut picker = MapPicker::new(config.map_config(), None);

                let mut selection = pick(&mut picker, |p| p.click(Location::new(lat, lon)))?;
                if address.is_some() {
                    selection.address = address;
                }

                lookup(&config, &picker, selection, json).await
            }
            Command::Search { query, first, json } => {
                let config = Config::load()?;
                let geocoder = OpenMeteoGeocoder::from_settings(&config.provider)?;

                let places = geocoder
                    .search(&query)
                    .await
                    .with_context(|| format!("Place search for '{query}' failed"))?;
                let place = choose(places, first, &query)?;

                let mut picker = MapPicker::new(config.map_config(), None);
                let selection = pick(&mut picker, |p| p.choose_place(&place))?;

                lookup(&config, &picker, selection, json).await
            }
        }
    }
}

/// Drive the picker once and collect what its listener received.
fn pick(
    picker: &mut MapPicker,
    action: impl FnOnce(&mut MapPicker) -> bool,
) -> anyhow::Result<Selection> {
    let (tx, rx) = mpsc::channel();
    let listener = picker.on_select(move |selection| {
        // The receiver lives until after the action returns.
        let _ = tx.send(selection);
    })?;

    action(picker);
    drop(listener);

    rx.try_recv().map_err(|_| anyhow!("Map picker did not produce a selection"))
}

fn choose(mut places: Vec<Place>, first: bool, query: &str) -> anyhow::Result<Place> {
    if places.is_empty() {
        bail!("No places found for '{query}'");
    }
    if first || places.len() == 1 {
        return Ok(places.swap_remove(0));
    }

    Select::new("Pick a place:", places)
        .prompt()
        .context("Place selection was cancelled")
}

async fn lookup(
    config: &Config,
    picker: &MapPicker,
    selection: Selection,
    json: bool,
) -> anyhow::Result<()> {
    let provider = OpenMeteoProvider::from_settings(&config.provider)?;
    debug!(location = %selection.location, address = ?selection.address, "Looking up air quality");
    let mut session = Session::new();

    if !json {
        println!("{}", render::render_map(&picker.view()));
        eprintln!("{}", render::render_state(&ViewState::Loading { selection: selection.clone() }));
    }

    let state = session.run(&provider, selection).await;

    if json {
        return match state {
            ViewState::Loaded { report, .. } => {
                let out =
                    serde_json::to_string_pretty(report).context("Failed to serialize report")?;
                println!("{out}");
                Ok(())
            }
            ViewState::Failed { message, .. } => Err(anyhow!(message.clone())),
            _ => Ok(()),
        };
    }

    println!("{}", render::render_state(state));
    if matches!(state, ViewState::Failed { .. }) {
        bail!("Air quality lookup failed");
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("Map API key:")
        .with_default(config.map.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Configuration was cancelled")?;
    let map_id = Text::new("Map ID:")
        .with_default(config.map.map_id.as_deref().unwrap_or_default())
        .prompt()
        .context("Configuration was cancelled")?;
    let base_url = Text::new("Air quality API base URL:")
        .with_default(&config.provider.base_url)
        .prompt()
        .context("Configuration was cancelled")?;

    config.set_map_credentials(&api_key, &map_id);
    config.provider.base_url = base_url.trim().to_string();

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    println!("{}", render::render_map_status(&config.map_config()));

    Ok(())
}
