//! Host-side view state for a single lookup at a time.
//!
//! Fetches are never cancelled. Each selection gets a [`Ticket`]; only the
//! result for the newest ticket is applied and older ones are dropped.

use tracing::debug;

use crate::{
    error::FetchError,
    model::{AirQualityReport, AirQualityRequest},
    picker::Selection,
    provider::AirQualityProvider,
};

/// What the display should show. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    NoSelection,
    Loading { selection: Selection },
    Failed { selection: Selection, message: String },
    Loaded { selection: Selection, report: AirQualityReport },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Session {
    state: ViewState,
    latest: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self { state: ViewState::NoSelection, latest: 0 }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start loading for a new selection; any outstanding ticket becomes stale.
    pub fn select(&mut self, selection: Selection) -> Ticket {
        self.latest += 1;
        self.state = ViewState::Loading { selection };
        Ticket(self.latest)
    }

    /// Apply a fetch result. Returns `false` and changes nothing for a stale ticket.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<AirQualityReport, FetchError>,
    ) -> bool {
        if ticket.0 != self.latest {
            debug!(ticket = ticket.0, latest = self.latest, "Discarding stale air quality result");
            return false;
        }

        let ViewState::Loading { selection } = &self.state else {
            return false;
        };
        let selection = selection.clone();

        self.state = match result {
            Ok(report) => ViewState::Loaded { selection, report },
            Err(err) => ViewState::Failed { selection, message: err.to_string() },
        };
        true
    }

    /// Select, fetch and resolve in one go.
    pub async fn run(
        &mut self,
        provider: &dyn AirQualityProvider,
        selection: Selection,
    ) -> &ViewState {
        let mut request = AirQualityRequest::new(selection.location);
        request.address = selection.address.clone();

        let ticket = self.select(selection);
        let result = provider.fetch_air_quality(&request).await;
        self.resolve(ticket, result);

        &self.state
    }
}
