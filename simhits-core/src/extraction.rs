//! Hit flattening traits and configuration.
//!
//! `HitArrayExtractor` turns one [`SimEvent`] into the seven values a
//! downstream analysis step reads from the store: the initial vertex and
//! energy deposit of the truth tracks, and the per-hit `pmtid`, `npe` and
//! `hittime` arrays.
#![allow(clippy::large_enum_variant)]

use crate::error::{ExtractionError, StoreError};
use crate::event::SimEvent;
use crate::soa::HitArrays;
use crate::store::{FieldValue, ValueStore};
use log::warn;

/// Names under which the flattened fields are published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldNames {
    /// Initial X position (default `x`).
    pub x: String,
    /// Initial Y position (default `y`).
    pub y: String,
    /// Initial Z position (default `z`).
    pub z: String,
    /// Energy deposit (default `edep`).
    pub edep: String,
    /// PMT id array (default `pmtid`).
    pub pmt_id: String,
    /// Photoelectron count array (default `npe`).
    pub npe: String,
    /// Hit time array (default `hittime`).
    pub hit_time: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            x: "x".to_string(),
            y: "y".to_string(),
            z: "z".to_string(),
            edep: "edep".to_string(),
            pmt_id: "pmtid".to_string(),
            npe: "npe".to_string(),
            hit_time: "hittime".to_string(),
        }
    }
}

impl FieldNames {
    /// `(field, name)` pairs in publication order.
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("x", self.x.as_str()),
            ("y", self.y.as_str()),
            ("z", self.z.as_str()),
            ("edep", self.edep.as_str()),
            ("pmtid", self.pmt_id.as_str()),
            ("npe", self.npe.as_str()),
            ("hittime", self.hit_time.as_str()),
        ]
    }

    /// Checks that every name is non-empty and unique.
    ///
    /// # Errors
    /// Returns the first empty or repeated name found.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let entries = self.entries();
        for (i, (field, name)) in entries.iter().enumerate() {
            if name.is_empty() {
                return Err(ExtractionError::InvalidFieldName { field: *field });
            }
            if entries[..i].iter().any(|(_, other)| other == name) {
                return Err(ExtractionError::DuplicateFieldName((*name).to_string()));
            }
        }
        Ok(())
    }
}

/// Configuration for hit flattening.
#[derive(Clone, Debug, Default)]
pub struct ExtractionConfig {
    /// Output field names.
    pub field_names: FieldNames,
}

impl ExtractionConfig {
    /// Set the output field names.
    #[must_use]
    pub fn with_field_names(mut self, field_names: FieldNames) -> Self {
        self.field_names = field_names;
        self
    }
}

/// Vertex and energy deposit taken from the truth tracks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackScalars {
    /// Initial X position.
    pub x: f64,
    /// Initial Y position.
    pub y: f64,
    /// Initial Z position.
    pub z: f64,
    /// Energy deposit.
    pub edep: f64,
}

impl TrackScalars {
    /// Placeholder for events without tracks.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            z: f64::NAN,
            edep: f64::NAN,
        }
    }
}

/// Result of flattening one event.
///
/// Either every field is present or none is: a `Skipped` event must not
/// leave partial or stale values in the store.
///
/// `PartialEq` compares floats with IEEE semantics, so two outputs holding
/// the NaN vertex of a trackless event compare unequal even when their
/// bits match.
#[derive(Clone, Debug, PartialEq)]
pub enum FlattenedOutput {
    /// The event had no hits; nothing is published.
    Skipped,
    /// All scalar and array fields of the event.
    Fields {
        names: FieldNames,
        scalars: TrackScalars,
        arrays: HitArrays,
    },
}

impl FlattenedOutput {
    /// Returns true if the event was skipped.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Number of fields that would be published.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Skipped => 0,
            Self::Fields { .. } => 7,
        }
    }

    /// Returns true if no field would be published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_skip()
    }

    /// Number of hits in the arrays (0 when skipped).
    #[must_use]
    pub fn hit_count(&self) -> usize {
        match self {
            Self::Skipped => 0,
            Self::Fields { arrays, .. } => arrays.len(),
        }
    }

    /// The scalar values, if not skipped.
    #[must_use]
    pub fn scalars(&self) -> Option<&TrackScalars> {
        match self {
            Self::Skipped => None,
            Self::Fields { scalars, .. } => Some(scalars),
        }
    }

    /// The hit arrays, if not skipped.
    #[must_use]
    pub fn arrays(&self) -> Option<&HitArrays> {
        match self {
            Self::Skipped => None,
            Self::Fields { arrays, .. } => Some(arrays),
        }
    }

    /// Field names in publication order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Skipped => Vec::new(),
            Self::Fields { names, .. } => names.entries().iter().map(|(_, n)| *n).collect(),
        }
    }

    /// Returns the value that would be published under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        let Self::Fields {
            names,
            scalars,
            arrays,
        } = self
        else {
            return None;
        };
        let (field, _) = names.entries().into_iter().find(|(_, n)| *n == name)?;
        let value = match field {
            "x" => FieldValue::Scalar(scalars.x),
            "y" => FieldValue::Scalar(scalars.y),
            "z" => FieldValue::Scalar(scalars.z),
            "edep" => FieldValue::Scalar(scalars.edep),
            "pmtid" => arrays.pmt_id.clone().into(),
            "npe" => arrays.npe.clone().into(),
            _ => arrays.hit_time.clone().into(),
        };
        Some(value)
    }

    /// Converts into `(name, value)` pairs in publication order.
    #[must_use]
    pub fn into_fields(self) -> Vec<(String, FieldValue)> {
        match self {
            Self::Skipped => Vec::new(),
            Self::Fields {
                names,
                scalars,
                arrays,
            } => {
                let HitArrays {
                    pmt_id,
                    npe,
                    hit_time,
                } = arrays;
                vec![
                    (names.x, FieldValue::Scalar(scalars.x)),
                    (names.y, FieldValue::Scalar(scalars.y)),
                    (names.z, FieldValue::Scalar(scalars.z)),
                    (names.edep, FieldValue::Scalar(scalars.edep)),
                    (names.pmt_id, pmt_id.into()),
                    (names.npe, npe.into()),
                    (names.hit_time, hit_time.into()),
                ]
            }
        }
    }

    /// Reads a published event back from `store`.
    ///
    /// # Errors
    /// Returns an error if a field is missing, has the wrong type, or the
    /// arrays differ in length.
    pub fn from_store<S: ValueStore + ?Sized>(
        store: &S,
        names: &FieldNames,
    ) -> Result<Self, StoreError> {
        let pmt_id = store.int_array(&names.pmt_id)?.to_vec();
        let npe = store.int_array(&names.npe)?.to_vec();
        let hit_time = store.float_array(&names.hit_time)?.to_vec();

        for (name, len) in [(&names.npe, npe.len()), (&names.hit_time, hit_time.len())] {
            if len != pmt_id.len() {
                return Err(StoreError::LengthMismatch {
                    name: name.clone(),
                    expected: pmt_id.len(),
                    found: len,
                });
            }
        }

        let scalars = TrackScalars {
            x: store.scalar(&names.x)?,
            y: store.scalar(&names.y)?,
            z: store.scalar(&names.z)?,
            edep: store.scalar(&names.edep)?,
        };

        Ok(Self::Fields {
            names: names.clone(),
            scalars,
            arrays: HitArrays {
                pmt_id,
                npe,
                hit_time,
            },
        })
    }

    /// Publishes every field into `store`, one `set` per field.
    ///
    /// A skipped output performs no `set` at all. Returns the number of
    /// fields published.
    pub fn publish<S: ValueStore + ?Sized>(self, store: &mut S) -> usize {
        let fields = self.into_fields();
        let count = fields.len();
        for (name, value) in fields {
            store.set(&name, value);
        }
        count
    }
}

/// Trait for event flattening algorithms.
pub trait EventFlattening: Send + Sync {
    /// Algorithm name.
    fn name(&self) -> &'static str;

    /// Configure the extraction.
    fn configure(&mut self, config: ExtractionConfig);

    /// Get current configuration.
    fn config(&self) -> &ExtractionConfig;

    /// Flatten one event.
    ///
    /// An event without hits yields [`FlattenedOutput::Skipped`], which is
    /// not an error.
    ///
    /// # Errors
    /// Returns an error if the configured field names are invalid.
    fn extract(&self, event: &SimEvent) -> Result<FlattenedOutput, ExtractionError>;
}

/// Flattens hits into arrays and keeps the vertex of the last track.
///
/// 1. Scalars: every track overwrites the previous one, so the last track wins
/// 2. Empty hit collection: skip the whole event, scalars included
/// 3. Arrays: one element per hit, in input order
#[derive(Clone, Debug, Default)]
pub struct HitArrayExtractor {
    config: ExtractionConfig,
}

impl HitArrayExtractor {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

/// Scalars of the last track in `event`, if any.
fn last_track_scalars(event: &SimEvent) -> Option<TrackScalars> {
    let mut scalars = None;
    for track in &event.tracks {
        let (x, y, z) = track.init_position();
        scalars = Some(TrackScalars {
            x,
            y,
            z,
            edep: track.edep,
        });
    }
    scalars
}

impl EventFlattening for HitArrayExtractor {
    fn name(&self) -> &'static str {
        "HitArray"
    }

    fn configure(&mut self, config: ExtractionConfig) {
        self.config = config;
    }

    fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn extract(&self, event: &SimEvent) -> Result<FlattenedOutput, ExtractionError> {
        self.config.field_names.validate()?;

        let scalars = last_track_scalars(event);

        if event.hits.is_empty() {
            return Ok(FlattenedOutput::Skipped);
        }

        let scalars = scalars.unwrap_or_else(|| {
            warn!(
                "event {} has {} hits but no tracks; publishing NaN vertex",
                event.event_id,
                event.hits.len()
            );
            TrackScalars::unknown()
        });

        Ok(FlattenedOutput::Fields {
            names: self.config.field_names.clone(),
            scalars,
            arrays: HitArrays::from_hits(&event.hits),
        })
    }
}
