//! Map picker: turns clicks and search hits into [`Selection`]s.
//!
//! Exactly one selection listener may be registered at a time. Registration
//! hands back a [`SelectionListener`] guard and dropping the guard removes the
//! callback, so the picker never calls into a host that has gone away.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use reqwest::Url;
use thiserror::Error;

use crate::{config::MapConfig, geocode::Place, model::Location};

const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
const ZOOM_WITH_MARKER: u8 = 6;
const ZOOM_WITHOUT_MARKER: u8 = 3;
const MAP_SIZE: &str = "640x400";

/// Where the map opens when nothing has been picked yet.
pub const DEFAULT_CENTER: Location = Location::new(52.52, 13.41);

/// A location picked by the user, with an address when it came from a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub location: Location,
    pub address: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("A selection listener is already registered")]
    ListenerBusy,
}

/// What the host should draw in the map area.
#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    Rendered {
        center: Location,
        zoom: u8,
        marker: Option<Location>,
        url: String,
    },
    /// Credentials are missing; show the reasons instead of a map.
    Unavailable { reasons: Vec<String> },
}

type Callback = Box<dyn FnMut(Selection) + Send>;

struct Slot {
    id: u64,
    callback: Callback,
}

type SharedSlot = Arc<Mutex<Option<Slot>>>;

pub struct MapPicker {
    config: MapConfig,
    center: Location,
    marker: Option<Location>,
    listener: SharedSlot,
    next_id: u64,
}

impl std::fmt::Debug for MapPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPicker")
            .field("ready", &self.config.is_ready())
            .field("center", &self.center)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

/// Guard for a registered selection callback. Dropping it deregisters the callback.
#[must_use = "dropping the listener immediately deregisters the callback"]
pub struct SelectionListener {
    slot: Weak<Mutex<Option<Slot>>>,
    id: u64,
}

impl Drop for SelectionListener {
    fn drop(&mut self) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|s| s.id == self.id) {
            *guard = None;
        }
    }
}

impl MapPicker {
    pub fn new(config: MapConfig, initial_center: Option<Location>) -> Self {
        let center = initial_center.unwrap_or(DEFAULT_CENTER);
        Self {
            config,
            center,
            marker: initial_center,
            listener: Arc::new(Mutex::new(None)),
            next_id: 0,
        }
    }

    /// Register the selection callback.
    pub fn on_select<F>(&mut self, callback: F) -> Result<SelectionListener, PickerError>
    where
        F: FnMut(Selection) + Send + 'static,
    {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(PickerError::ListenerBusy);
        }

        self.next_id += 1;
        let id = self.next_id;
        *slot = Some(Slot { id, callback: Box::new(callback) });

        Ok(SelectionListener { slot: Arc::downgrade(&self.listener), id })
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// A click on the map. Returns whether a listener received the selection.
    pub fn click(&mut self, location: Location) -> bool {
        self.select(Selection { location, address: None })
    }

    /// A search hit was chosen.
    pub fn choose_place(&mut self, place: &Place) -> bool {
        self.select(Selection { location: place.location, address: Some(place.address()) })
    }

    fn select(&mut self, selection: Selection) -> bool {
        self.marker = Some(selection.location);
        self.center = selection.location;

        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(Slot { callback, .. }) => {
                callback(selection);
                true
            }
            None => false,
        }
    }

    pub fn marker(&self) -> Option<Location> {
        self.marker
    }

    pub fn view(&self) -> MapView {
        let (api_key, map_id) = match &self.config {
            MapConfig::Ready { api_key, map_id } => (api_key, map_id),
            MapConfig::Missing { reasons } => {
                return MapView::Unavailable { reasons: reasons.clone() };
            }
        };

        let zoom = if self.marker.is_some() { ZOOM_WITH_MARKER } else { ZOOM_WITHOUT_MARKER };

        let params = [
            ("center", coordinates(self.center)),
            ("zoom", zoom.to_string()),
            ("size", MAP_SIZE.to_string()),
            ("map_id", map_id.clone()),
            ("key", api_key.clone()),
        ];
        let mut url = match Url::parse_with_params(STATIC_MAP_URL, &params) {
            Ok(url) => url,
            Err(err) => {
                return MapView::Unavailable { reasons: vec![format!("Map URL is invalid: {err}")] };
            }
        };
        if let Some(marker) = self.marker {
            url.query_pairs_mut().append_pair("markers", &coordinates(marker));
        }

        MapView::Rendered { center: self.center, zoom, marker: self.marker, url: url.into() }
    }
}

fn coordinates(location: Location) -> String {
    format!("{:.6},{:.6}", location.latitude, location.longitude)
}
