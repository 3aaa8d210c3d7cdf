//! [`Speed`], the characters-per-second rate a timed stream aims for.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Target typing rate in characters per second.
///
/// Always positive and finite. One character at multiplier `1.0` takes
/// `1 / speed` seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speed(f64);

impl Speed {
    /// 75 characters per second.
    pub const DEFAULT: Speed = Speed(75.0);

    /// Validate a rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpeed`] for zero, negative, NaN or infinite rates.
    pub fn new(chars_per_second: f64) -> Result<Self> {
        if chars_per_second.is_finite() && chars_per_second > 0.0 {
            Ok(Self(chars_per_second))
        } else {
            Err(Error::InvalidSpeed(chars_per_second))
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Speed {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts `75`, `12.5` and fractions such as `15/2`.
impl FromStr for Speed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let malformed = || Error::MalformedSpeed(s.to_string());
        let value = match s.split_once('/') {
            Some((numerator, denominator)) => {
                let numerator: f64 = numerator.trim().parse().map_err(|_| malformed())?;
                let denominator: f64 = denominator.trim().parse().map_err(|_| malformed())?;
                numerator / denominator
            }
            None => s.parse().map_err(|_| malformed())?,
        };
        Self::new(value)
    }
}
