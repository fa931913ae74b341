//! simhits-io: Event sources, the flattening step, and file output.
//!
//! This crate connects the core extraction to the outside: it reads
//! simulated events from JSON-lines files, runs the per-event step that
//! publishes into a value store, and writes flattened events to CSV,
//! binary or (with the `hdf5` feature) HDF5 files.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod reader;
pub mod source;
pub mod step;
mod writer;

pub use error::{Error, Lookup, Result};
#[cfg(feature = "hdf5")]
pub use hdf5::{EventWriteOptions, Hdf5EventSink};
pub use reader::{EventFileReader, NavigatorLines};
pub use source::{EventNavigator, EventSource, NavBuffer};
pub use step::{run_events, FlattenStep, RunConfig, RunStatistics, StepOutcome};
pub use writer::FlattenedFileWriter;
