use crate::model::Pollutant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
            Level::VeryHigh => "Very High",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Thresholds {
    /// Values between `low` and `high` (inclusive) are moderate.
    pub fn classify(&self, value: f64) -> Level {
        if value < self.low {
            Level::Low
        } else if value > self.very_high {
            Level::VeryHigh
        } else if value > self.high {
            Level::High
        } else {
            Level::Moderate
        }
    }
}

/// Thresholds in the units Open-Meteo reports: µg/m³ for CO and dust, ppm for CO₂.
pub fn thresholds(pollutant: Pollutant) -> Option<Thresholds> {
    match pollutant {
        Pollutant::CarbonMonoxide => Some(Thresholds { low: 4400.0, high: 9400.0, very_high: 15400.0 }),
        Pollutant::CarbonDioxide => Some(Thresholds { low: 700.0, high: 1000.0, very_high: 2000.0 }),
        Pollutant::Dust => Some(Thresholds { low: 50.0, high: 150.0, very_high: 250.0 }),
        _ => None,
    }
}

pub fn classify(pollutant: Pollutant, value: f64) -> Option<Level> {
    thresholds(pollutant).map(|t| t.classify(value))
}
