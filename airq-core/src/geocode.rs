//! Text search to coordinates, backed by the keyless Open-Meteo geocoding API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::ProviderSettings, error::FetchError, model::Location, provider::error_from_body,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

const MAX_RESULTS: usize = 5;

/// A search hit: where it is and what to call it.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub location: Location,
}

impl Place {
    /// `name, region, country`, skipping empty parts.
    pub fn address(&self) -> String {
        [Some(self.name.as_str()), self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.address(), self.location)
    }
}

#[async_trait]
pub trait PlaceSearch: Send + Sync + std::fmt::Debug {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), http }
    }

    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the geocoder")?;

        Ok(Self::with_client(settings.geocoding_url.as_str(), http))
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // Absent when nothing matched.
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[async_trait]
impl PlaceSearch for OpenMeteoGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let url = format!("{}/v1/search", self.base_url);
        let count = MAX_RESULTS.to_string();

        debug!(%url, query, "Searching places");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            let err = error_from_body(status, &body);
            warn!(error = %err, query, "Place search failed");
            return Err(err);
        }

        let parsed: GeoResponse = serde_json::from_str(&body).map_err(FetchError::Decode)?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| Place {
                name: r.name,
                region: r.admin1,
                country: r.country,
                location: Location::new(r.latitude, r.longitude),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::serve_once;

    fn local(base_url: String) -> OpenMeteoGeocoder {
        let http = Client::builder().no_proxy().build().unwrap();
        OpenMeteoGeocoder::with_client(base_url, http)
    }

    #[test]
    fn address_skips_missing_parts() {
        let place = Place {
            name: "Berlin".into(),
            region: None,
            country: Some("Germany".into()),
            location: Location::new(52.52437, 13.41053),
        };
        assert_eq!(place.address(), "Berlin, Germany");
        assert_eq!(place.to_string(), "Berlin, Germany (Lat 52.52, Lng 13.41)");
    }

    #[tokio::test]
    async fn parses_results() {
        let body = r#"{
            "results": [
                {"id": 2950159, "name": "Berlin", "latitude": 52.52437, "longitude": 13.41053,
                 "country": "Germany", "admin1": "Land Berlin"},
                {"id": 5083330, "name": "Berlin", "latitude": 44.46867, "longitude": -71.18508,
                 "country": "United States", "admin1": "New Hampshire"}
            ],
            "generationtime_ms": 0.9
        }"#;
        let (base_url, request_line) = serve_once("200 OK", body).await;

        let places = local(base_url).search("Berlin").await.unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].address(), "Berlin, Land Berlin, Germany");
        assert_eq!(places[1].location, Location::new(44.46867, -71.18508));

        let line = request_line.await.unwrap();
        assert!(line.starts_with("GET /v1/search?name=Berlin&count=5"), "unexpected: {line}");
    }

    #[tokio::test]
    async fn no_match_is_empty_not_error() {
        let (base_url, _) = serve_once("200 OK", r#"{"generationtime_ms": 0.2}"#).await;

        let places = local(base_url).search("Nowhereville").await.unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn rejection_reason_is_surfaced() {
        let body = r#"{"error":true,"reason":"Parameter count must be between 1 and 100."}"#;
        let (base_url, _) = serve_once("400 Bad Request", body).await;

        let err = local(base_url).search("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Parameter count must be between 1 and 100.");
    }
}
