use serde::{Deserialize, Serialize};

/// A point on the map. Produced by the picker, consumed by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Coordinates formatted with two decimals, as sent to the provider.
    ///
    /// Ties round away from zero, so `52.125` is sent as `52.13`.
    pub fn rounded(&self) -> (String, String) {
        (two_decimals(self.latitude), two_decimals(self.longitude))
    }
}

fn two_decimals(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat {:.2}, Lng {:.2}", self.latitude, self.longitude)
    }
}

/// Hourly variables requested from the air quality provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    BirchPollen,
    GrassPollen,
    CarbonMonoxide,
    NitrogenDioxide,
    SulphurDioxide,
    Ozone,
    Dust,
    Pm10,
    Pm2_5,
    CarbonDioxide,
}

impl Pollutant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::BirchPollen => "birch_pollen",
            Pollutant::GrassPollen => "grass_pollen",
            Pollutant::CarbonMonoxide => "carbon_monoxide",
            Pollutant::NitrogenDioxide => "nitrogen_dioxide",
            Pollutant::SulphurDioxide => "sulphur_dioxide",
            Pollutant::Ozone => "ozone",
            Pollutant::Dust => "dust",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::CarbonDioxide => "carbon_dioxide",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::BirchPollen => "Birch Pollen",
            Pollutant::GrassPollen => "Grass Pollen",
            Pollutant::CarbonMonoxide => "Carbon Monoxide (CO)",
            Pollutant::NitrogenDioxide => "Nitrogen Dioxide (NO₂)",
            Pollutant::SulphurDioxide => "Sulphur Dioxide (SO₂)",
            Pollutant::Ozone => "Ozone (O₃)",
            Pollutant::Dust => "Dust",
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::CarbonDioxide => "Carbon Dioxide (CO₂)",
        }
    }

    /// Everything put into the `hourly` query parameter, in request order.
    pub const fn requested() -> &'static [Pollutant] {
        &[
            Pollutant::BirchPollen,
            Pollutant::GrassPollen,
            Pollutant::CarbonMonoxide,
            Pollutant::NitrogenDioxide,
            Pollutant::SulphurDioxide,
            Pollutant::Ozone,
            Pollutant::Dust,
            Pollutant::Pm10,
            Pollutant::Pm2_5,
            Pollutant::CarbonDioxide,
        ]
    }

    /// The subset surfaced in an [`AirQualityReport`].
    pub const fn tracked() -> &'static [Pollutant] {
        &[
            Pollutant::CarbonMonoxide,
            Pollutant::CarbonDioxide,
            Pollutant::Dust,
            Pollutant::BirchPollen,
            Pollutant::GrassPollen,
        ]
    }

    /// Comma-separated identifiers for the `hourly` query parameter.
    pub fn hourly_param(pollutants: &[Pollutant]) -> String {
        pollutants.iter().map(Pollutant::as_str).collect::<Vec<_>>().join(",")
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parallel hourly timestamps and values for one pollutant.
#[derive(Debug, Clone, Copy)]
pub struct PollutantSeries<'a> {
    pub times: &'a [String],
    pub values: &'a [Option<f64>],
}

impl<'a> PollutantSeries<'a> {
    pub fn new(times: &'a [String], values: &'a [Option<f64>]) -> Self {
        Self { times, values }
    }

    /// Entries in their given order. Only the common prefix of both slices is yielded.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, Option<f64>)> + 'a {
        self.times.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// The one reading chosen to represent a pollutant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantSample {
    pub value: Option<f64>,
    pub timestamp: Option<String>,
}

impl PollutantSample {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// A selected sample plus the unit the provider reported for that pollutant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    #[serde(flatten)]
    pub sample: PollutantSample,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityRequest {
    pub location: Location,
    /// Human-readable address from the picker; overrides anything the provider says.
    pub address: Option<String>,
}

impl AirQualityRequest {
    pub fn new(location: Location) -> Self {
        Self { location, address: None }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    /// Coordinates as echoed by the provider (grid-snapped).
    pub location: Location,
    pub timezone: String,
    pub address: Option<String>,
    pub carbon_monoxide: PollutantReading,
    pub carbon_dioxide: PollutantReading,
    pub dust: PollutantReading,
    pub birch_pollen: PollutantReading,
    pub grass_pollen: PollutantReading,
}

impl AirQualityReport {
    /// Reading for a tracked pollutant; `None` for pollutants the report does not carry.
    pub fn reading(&self, pollutant: Pollutant) -> Option<&PollutantReading> {
        match pollutant {
            Pollutant::CarbonMonoxide => Some(&self.carbon_monoxide),
            Pollutant::CarbonDioxide => Some(&self.carbon_dioxide),
            Pollutant::Dust => Some(&self.dust),
            Pollutant::BirchPollen => Some(&self.birch_pollen),
            Pollutant::GrassPollen => Some(&self.grass_pollen),
            _ => None,
        }
    }

    /// True when none of CO, CO₂ and dust has a value.
    pub fn is_empty(&self) -> bool {
        self.carbon_monoxide.sample.is_absent()
            && self.carbon_dioxide.sample.is_absent()
            && self.dust.sample.is_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_coordinates_to_two_decimals() {
        let loc = Location::new(52.5167, 13.3833);
        assert_eq!(loc.rounded(), ("52.52".to_string(), "13.38".to_string()));

        let neg = Location::new(-33.8688, 151.2093);
        assert_eq!(neg.rounded(), ("-33.87".to_string(), "151.21".to_string()));
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        let loc = Location::new(52.125, 13.375);
        assert_eq!(loc.rounded(), ("52.13".to_string(), "13.38".to_string()));

        let near_origin = Location::new(-0.125, 0.625);
        assert_eq!(near_origin.rounded(), ("-0.13".to_string(), "0.63".to_string()));
    }

    #[test]
    fn hourly_param_keeps_request_order() {
        let param = Pollutant::hourly_param(Pollutant::requested());
        assert_eq!(
            param,
            "birch_pollen,grass_pollen,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,\
             ozone,dust,pm10,pm2_5,carbon_dioxide"
        );
    }

    #[test]
    fn every_tracked_pollutant_is_requested() {
        for p in Pollutant::tracked() {
            assert!(Pollutant::requested().contains(p), "{p} is tracked but not requested");
        }
    }

    #[test]
    fn series_entries_stop_at_shorter_slice() {
        let times = vec!["2024-06-01T00:00".to_string(), "2024-06-01T01:00".to_string()];
        let values = vec![Some(1.0)];
        let series = PollutantSeries::new(&times, &values);

        let entries: Vec<_> = series.entries().collect();
        assert_eq!(entries, vec![("2024-06-01T00:00", Some(1.0))]);
    }

    #[test]
    fn reading_serializes_flat() {
        let reading = PollutantReading {
            sample: PollutantSample { value: Some(250.0), timestamp: Some("2024-06-01T01:00".into()) },
            unit: Some("μg/m³".into()),
        };

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["value"], 250.0);
        assert_eq!(json["timestamp"], "2024-06-01T01:00");
        assert_eq!(json["unit"], "μg/m³");
    }
}
