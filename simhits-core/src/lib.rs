//! simhits-core: Core types for flattening simulated detector events.
//!
//! This crate provides the event data model, the named value store, the
//! hit flattening step, and the downstream event summary.
//!

pub mod error;
pub mod event;
pub mod extraction;
pub mod soa;
pub mod store;
pub mod summary;

pub use error::{Error, ExtractionError, Result, StoreError};
pub use event::{SimEvent, SimHeader, SimHit, SimTrack};
pub use extraction::{
    EventFlattening, ExtractionConfig, FieldNames, FlattenedOutput, HitArrayExtractor,
    TrackScalars,
};
pub use soa::HitArrays;
pub use store::{DataStore, FieldValue, ValueStore};
pub use summary::EventSummary;
