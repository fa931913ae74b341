//! Structure of Arrays (`SoA`) view of a hit collection.
//!
//! `HitArrays` stores the hit attributes in parallel vectors, which is the
//! layout the value store and the numpy bridge hand out.

use crate::event::SimHit;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A hit collection stored in Structure of Arrays (`SoA`) format.
///
/// Element `i` of every column belongs to hit `i` of the source collection.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitArrays {
    /// Columnar storage for PMT channel ids.
    pub pmt_id: Vec<i32>,
    /// Columnar storage for photoelectron counts.
    pub npe: Vec<i32>,
    /// Columnar storage for hit times.
    pub hit_time: Vec<f64>,
}

impl HitArrays {
    /// Creates a new empty set of columns with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pmt_id: Vec::with_capacity(capacity),
            npe: Vec::with_capacity(capacity),
            hit_time: Vec::with_capacity(capacity),
        }
    }

    /// Flattens `hits` in traversal order.
    #[must_use]
    pub fn from_hits(hits: &[SimHit]) -> Self {
        let mut arrays = Self::with_capacity(hits.len());
        for hit in hits {
            arrays.push(hit.pmt_id, hit.npe, hit.hit_time);
        }
        arrays
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pmt_id.len()
    }

    /// Returns true if there are no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pmt_id.is_empty()
    }

    /// Pushes a single hit.
    pub fn push(&mut self, pmt_id: i32, npe: i32, hit_time: f64) {
        self.pmt_id.push(pmt_id);
        self.npe.push(npe);
        self.hit_time.push(hit_time);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_from_hits_keeps_order() {
        let hits = [
            SimHit::new(30, 1, 3.3),
            SimHit::new(10, 2, 1.1),
            SimHit::new(20, 5, 2.2),
        ];
        let arrays = HitArrays::from_hits(&hits);

        assert_eq!(arrays.len(), 3);
        assert_eq!(arrays.pmt_id, vec![30, 10, 20]);
        assert_eq!(arrays.npe, vec![1, 2, 5]);
        assert_eq!(arrays.hit_time, vec![3.3, 1.1, 2.2]);
    }

    #[test]
    fn test_empty() {
        let arrays = HitArrays::from_hits(&[]);
        assert!(arrays.is_empty());
        assert_eq!(arrays.len(), 0);
    }
}
