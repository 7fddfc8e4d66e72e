//! Shared helpers for reading station files

use regex::Regex;

/// How same-day records of one element are combined into a daily value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyAggregation {
    /// Accumulating elements (rainfall): sub-daily amounts add up
    Sum,
    /// Everything else (temperature, humidity, ...)
    Mean,
}

impl DailyAggregation {
    /// Combine a running `sum` over `count` records
    pub fn finish(self, sum: f64, count: usize) -> Option<f64> {
        match (self, count) {
            (_, 0) => None,
            (DailyAggregation::Sum, _) => Some(sum),
            (DailyAggregation::Mean, n) => Some(sum / n as f64),
        }
    }
}

/// Pick the daily aggregation for an element name
///
/// Names mentioning rain, "rf" or precipitation are summed, anything else is
/// averaged. Matching is case-insensitive and on substrings.
///
/// # Examples
///
/// ```
/// use station_gapfill::utils::{daily_aggregation, DailyAggregation};
///
/// assert_eq!(daily_aggregation("Rainfall"), DailyAggregation::Sum);
/// assert_eq!(daily_aggregation("RF (mm)"), DailyAggregation::Sum);
/// assert_eq!(daily_aggregation("Precipitation"), DailyAggregation::Sum);
/// assert_eq!(daily_aggregation("Max Temperature"), DailyAggregation::Mean);
/// ```
pub fn daily_aggregation(element: &str) -> DailyAggregation {
    let accumulating = Regex::new(r"(?i)rain|rf|prec")
        .map(|re| re.is_match(element))
        .unwrap_or(false);

    if accumulating {
        DailyAggregation::Sum
    } else {
        DailyAggregation::Mean
    }
}

/// Parse a measurement written as text
///
/// Surrounding whitespace is ignored. Anything that is not a finite number
/// (trace markers, dashes, "NaN") counts as missing.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Render a numeric station identifier without a trailing ".0"
///
/// Spreadsheets often store station codes like 63001 as floats.
pub fn format_station_id(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
