//! Simulated event data types.
//!
//! These mirror the detector simulation output for a single event: the
//! true particle tracks and the PMT hits recorded in the central detector.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One simulated particle track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimTrack {
    /// PDG particle code.
    pub pdg_id: i32,
    /// Initial X position (mm).
    pub init_x: f64,
    /// Initial Y position (mm).
    pub init_y: f64,
    /// Initial Z position (mm).
    pub init_z: f64,
    /// Deposited energy (MeV).
    pub edep: f64,
    /// Initial mass (MeV).
    #[cfg_attr(feature = "serde", serde(default))]
    pub init_mass: f64,
}

impl SimTrack {
    /// Creates a track with the given vertex and energy deposit.
    #[inline]
    #[must_use]
    pub fn new(init_x: f64, init_y: f64, init_z: f64, edep: f64) -> Self {
        Self {
            pdg_id: 0,
            init_x,
            init_y,
            init_z,
            edep,
            init_mass: 0.0,
        }
    }

    /// Returns the initial position as `(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn init_position(&self) -> (f64, f64, f64) {
        (self.init_x, self.init_y, self.init_z)
    }
}

/// One PMT hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimHit {
    /// PMT channel identifier.
    pub pmt_id: i32,
    /// Number of photoelectrons.
    pub npe: i32,
    /// Hit time (ns).
    pub hit_time: f64,
}

impl SimHit {
    /// Creates a new hit.
    #[inline]
    #[must_use]
    pub fn new(pmt_id: i32, npe: i32, hit_time: f64) -> Self {
        Self {
            pmt_id,
            npe,
            hit_time,
        }
    }
}

/// A complete simulated event.
///
/// Track and hit order is significant: downstream consumers index hits
/// positionally.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimEvent {
    /// Event identifier.
    pub event_id: i32,
    /// Simulated tracks, in generation order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tracks: Vec<SimTrack>,
    /// Central detector hits, in recording order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hits: Vec<SimHit>,
}

impl SimEvent {
    /// Creates an empty event.
    #[must_use]
    pub fn new(event_id: i32) -> Self {
        Self {
            event_id,
            tracks: Vec::new(),
            hits: Vec::new(),
        }
    }

    /// Appends a track.
    #[must_use]
    pub fn with_track(mut self, track: SimTrack) -> Self {
        self.tracks.push(track);
        self
    }

    /// Appends a hit.
    #[must_use]
    pub fn with_hit(mut self, hit: SimHit) -> Self {
        self.hits.push(hit);
        self
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// Returns the total number of photoelectrons over all hits.
    #[must_use]
    pub fn total_npe(&self) -> i64 {
        self.hits.iter().map(|h| i64::from(h.npe)).sum()
    }
}

/// Simulation header wrapping the event payload.
///
/// The payload may be absent when the header was written without its
/// event (e.g. a stripped output file).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimHeader {
    /// The simulated event payload.
    #[cfg_attr(feature = "serde", serde(default))]
    pub event: Option<SimEvent>,
}

impl SimHeader {
    /// Creates a header carrying `event`.
    #[must_use]
    pub fn new(event: SimEvent) -> Self {
        Self { event: Some(event) }
    }

    /// Creates a header with no payload.
    #[must_use]
    pub fn empty() -> Self {
        Self { event: None }
    }

    /// Returns the payload, if present.
    #[must_use]
    pub fn event(&self) -> Option<&SimEvent> {
        self.event.as_ref()
    }
}
