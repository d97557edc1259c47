use std::{collections::HashMap, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::ProviderSettings,
    error::FetchError,
    model::{
        AirQualityReport, AirQualityRequest, Location, Pollutant, PollutantReading,
        PollutantSeries,
    },
    provider::{error_from_body, truncate_body},
    selector::select,
};

use super::AirQualityProvider;

pub const DEFAULT_BASE_URL: &str = "https://air-quality-api.open-meteo.com";

/// Fetcher for the Open-Meteo air quality API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    pollutants: Vec<Pollutant>,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pollutants: Pollutant::requested().to_vec(),
            http,
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the air quality provider")?;

        Ok(Self::with_client(settings.base_url.as_str(), http))
    }

    /// Fetch and select samples relative to an explicit reference date.
    pub async fn fetch_for_date(
        &self,
        request: &AirQualityRequest,
        reference_date: NaiveDate,
    ) -> Result<AirQualityReport, FetchError> {
        let result = self.fetch_inner(request, reference_date).await;
        if let Err(err) = &result {
            warn!(error = %err, location = %request.location, "Failed to fetch air quality data");
        }
        result
    }

    async fn fetch_inner(
        &self,
        request: &AirQualityRequest,
        reference_date: NaiveDate,
    ) -> Result<AirQualityReport, FetchError> {
        let url = format!("{}/v1/air-quality", self.base_url);
        let (latitude, longitude) = request.location.rounded();
        let hourly = Pollutant::hourly_param(&self.pollutants);

        debug!(%url, %latitude, %longitude, "Requesting air quality");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", hourly.as_str()),
            ])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = truncate_body(&body), "Provider returned an error");
            return Err(error_from_body(status, &body));
        }

        let parsed: OmResponse = serde_json::from_str(&body).map_err(FetchError::Decode)?;

        Ok(build_report(parsed, request.address.clone(), reference_date))
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    /// A pollutant key may be present but `null`; that reads as no series.
    #[serde(flatten)]
    series: HashMap<String, Option<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    timezone: String,
    #[serde(default)]
    hourly_units: HashMap<String, String>,
    hourly: OmHourly,
}

fn build_report(
    parsed: OmResponse,
    address: Option<String>,
    reference_date: NaiveDate,
) -> AirQualityReport {
    let reading = |pollutant: Pollutant| {
        let series = parsed
            .hourly
            .series
            .get(pollutant.as_str())
            .and_then(Option::as_deref)
            .map(|values| PollutantSeries::new(&parsed.hourly.time, values));

        PollutantReading {
            sample: select(series, reference_date),
            unit: parsed.hourly_units.get(pollutant.as_str()).cloned(),
        }
    };

    AirQualityReport {
        location: Location::new(parsed.latitude, parsed.longitude),
        timezone: parsed.timezone.clone(),
        address,
        carbon_monoxide: reading(Pollutant::CarbonMonoxide),
        carbon_dioxide: reading(Pollutant::CarbonDioxide),
        dust: reading(Pollutant::Dust),
        birch_pollen: reading(Pollutant::BirchPollen),
        grass_pollen: reading(Pollutant::GrassPollen),
    }
}

#[async_trait]
impl AirQualityProvider for OpenMeteoProvider {
    async fn fetch_air_quality(
        &self,
        request: &AirQualityRequest,
    ) -> Result<AirQualityReport, FetchError> {
        let today = Utc::now().date_naive();
        self.fetch_for_date(request, today).await
    }
}
