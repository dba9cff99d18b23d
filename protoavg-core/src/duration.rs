//! Duration field parsing
//!
//! Benchmark timers emit the elapsed time either as a bare number or with a
//! trailing unit marker (`12.5s`, `1m`, `340ms`). The marker characters are
//! stripped and the remainder parsed as a float.
//!
//! Unit detection follows the raw timer conventions: anything containing
//! `ms` is left unscaled, otherwise an `s` marks seconds and an `m` marks
//! minutes. A value carrying both `s` and `m` (but no `ms`) counts as seconds.
//!
//! The minutes scaling is `value * 60 / 1000`. This is not a true
//! minutes-to-milliseconds conversion, but it is what existing summary data
//! was produced with, so it is kept as is.

use crate::error::{Error, Result};

/// Unit detected from the markers in a duration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// No recognised marker, or an `ms` marker
    Unscaled,
    /// `s` marker without `ms`
    Seconds,
    /// `m` marker without `ms` or `s`
    Minutes,
}

impl DurationUnit {
    /// Classify a raw field by its unit markers
    pub fn detect(text: &str) -> Self {
        if text.contains("ms") {
            DurationUnit::Unscaled
        } else if text.contains('s') {
            DurationUnit::Seconds
        } else if text.contains('m') {
            DurationUnit::Minutes
        } else {
            DurationUnit::Unscaled
        }
    }

    fn scale(self, value: f64) -> f64 {
        match self {
            DurationUnit::Unscaled => value,
            DurationUnit::Seconds => value * 1000.0,
            DurationUnit::Minutes => value * 60.0 / 1000.0,
        }
    }
}

/// Parse a duration field into a float.
///
/// With `to_milliseconds` unset the numeric part is returned unscaled,
/// whatever the marker.
pub fn parse_duration(text: &str, to_milliseconds: bool) -> Result<f64> {
    let unit = DurationUnit::detect(text);
    let numeric: String = text.chars().filter(|&c| c != 'm' && c != 's').collect();

    let value = numeric
        .parse::<f64>()
        .map_err(|source| Error::InvalidDuration { value: text.to_string(), source })?;

    if to_milliseconds {
        Ok(unit.scale(value))
    } else {
        Ok(value)
    }
}
