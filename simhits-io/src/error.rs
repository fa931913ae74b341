//! I/O error types.

use std::fmt;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream lookup that can come back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The event navigator for the current cycle.
    Navigator,
    /// The simulation header of the current event.
    Header,
    /// The event payload inside the header.
    Payload,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::Navigator => "event navigator",
            Self::Header => "SimHeader",
            Self::Payload => "SimEvent",
        };
        f.write_str(what)
    }
}

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// An upstream lookup found nothing for the current event.
    #[error("failed to find the {0}")]
    MissingInput(Lookup),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] simhits_core::Error),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

impl From<simhits_core::ExtractionError> for Error {
    fn from(err: simhits_core::ExtractionError) -> Self {
        Self::CoreError(err.into())
    }
}
