//! Error type shared by the library.

use thiserror::Error;

/// Errors raised while configuring dramatic output.
///
/// Write-path failures are plain [`std::io::Error`]s and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("speed must be a positive, finite number of characters per second, got {0}")]
    InvalidSpeed(f64),

    #[error("could not parse speed '{0}': expected a number like 75, 12.5 or 15/2")]
    MalformedSpeed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
