//! Picks the one hourly reading reported for a pollutant.
//!
//! The provider returns a multi-day hourly window with gaps. We prefer the
//! earliest present reading on the reference date ("today") and otherwise fall
//! back to the first present reading anywhere in the window. The fallback scan
//! restarts from the beginning of the series, so it can return a reading older
//! than the skipped same-day slots.

use chrono::NaiveDate;

use crate::model::{PollutantSample, PollutantSeries};

/// Select the sample to report for `series` relative to `reference_date`.
///
/// Never fails: an absent or empty series, or one with no present value,
/// yields [`PollutantSample::absent`].
pub fn select(series: Option<PollutantSeries<'_>>, reference_date: NaiveDate) -> PollutantSample {
    let Some(series) = series else {
        return PollutantSample::absent();
    };

    let on_reference_date = series
        .entries()
        .filter(|(ts, _)| date_part(ts) == Some(reference_date))
        .find_map(|(ts, value)| value.map(|v| (ts, v)));

    let chosen = on_reference_date
        .or_else(|| series.entries().find_map(|(ts, value)| value.map(|v| (ts, v))));

    match chosen {
        Some((ts, value)) => PollutantSample {
            value: Some(value),
            timestamp: Some(ts.to_string()),
        },
        None => PollutantSample::absent(),
    }
}

/// Calendar date of an ISO-8601 timestamp such as `2024-06-01T13:00`.
fn date_part(timestamp: &str) -> Option<NaiveDate> {
    let date = timestamp.split('T').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn times(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn absent_series_yields_absent_sample() {
        let sample = select(None, date("2024-06-01"));
        assert_eq!(sample, PollutantSample::absent());
    }

    #[test]
    fn empty_series_yields_absent_sample() {
        let t: Vec<String> = vec![];
        let v: Vec<Option<f64>> = vec![];
        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert_eq!(sample, PollutantSample::absent());
    }

    #[test]
    fn all_null_series_yields_absent_sample() {
        let t = times(&["2024-06-01T00:00", "2024-06-01T01:00"]);
        let v = vec![None, None];
        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert!(sample.is_absent());
        assert_eq!(sample.timestamp, None);
    }

    #[test]
    fn prefers_reference_date_over_earlier_days() {
        let t = times(&["2024-05-31T22:00", "2024-05-31T23:00", "2024-06-01T05:00", "2024-06-02T00:00"]);
        let v = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert_eq!(sample.value, Some(3.0));
        assert_eq!(sample.timestamp.as_deref(), Some("2024-06-01T05:00"));
    }

    #[test]
    fn first_present_value_on_reference_date_wins() {
        let t = times(&["2024-06-01T00:00", "2024-06-01T01:00", "2024-06-01T02:00"]);
        let v = vec![None, Some(10.0), Some(20.0)];

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert_eq!(sample.value, Some(10.0));
        assert_eq!(sample.timestamp.as_deref(), Some("2024-06-01T01:00"));
    }

    #[test]
    fn falls_back_to_lowest_index_present_value() {
        let t = times(&["2024-05-30T00:00", "2024-05-31T00:00", "2024-06-01T00:00", "2024-06-02T00:00"]);
        let v = vec![None, Some(7.0), None, Some(9.0)];

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert_eq!(sample.value, Some(7.0));
        assert_eq!(sample.timestamp.as_deref(), Some("2024-05-31T00:00"));
    }

    #[test]
    fn fallback_restarts_from_the_start() {
        // Same-day slots are all null, so the fallback picks yesterday even
        // though tomorrow also has a value.
        let t = times(&["2024-05-31T23:00", "2024-06-01T00:00", "2024-06-01T01:00", "2024-06-02T00:00"]);
        let v = vec![Some(1.5), None, None, Some(2.5)];

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-01"));
        assert_eq!(sample.timestamp.as_deref(), Some("2024-05-31T23:00"));
    }

    #[test]
    fn reference_date_match() {
        let t = times(&["2024-06-01T00:00", "2024-06-01T01:00", "2024-06-02T00:00"]);
        let v = vec![None, Some(250.0), Some(300.0)];
        let series = PollutantSeries::new(&t, &v);

        let expected = PollutantSample {
            value: Some(250.0),
            timestamp: Some("2024-06-01T01:00".to_string()),
        };
        assert_eq!(select(Some(series), date("2024-06-01")), expected);
        // No entry on 2024-06-03: first present value overall.
        assert_eq!(select(Some(series), date("2024-06-03")), expected);
    }

    #[test]
    fn unparsable_timestamps_only_count_in_fallback() {
        let t = times(&["garbage", "2024-06-02T00:00"]);
        let v = vec![Some(1.0), Some(2.0)];

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-02"));
        assert_eq!(sample.value, Some(2.0));

        let sample = select(Some(PollutantSeries::new(&t, &v)), date("2024-06-05"));
        assert_eq!(sample.value, Some(1.0));
    }
}
