//! Per-event summary computed from published fields.
//!
//! This is the consumer side of the store: it reads back what
//! [`HitArrayExtractor`](crate::extraction::HitArrayExtractor) published
//! and reduces the arrays to a few numbers.

use crate::error::StoreError;
use crate::extraction::FieldNames;
use crate::store::ValueStore;

/// Reduced view of one published event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventSummary {
    /// True vertex `(x, y, z)`.
    pub vertex: (f64, f64, f64),
    /// Energy deposit.
    pub edep: f64,
    /// Sum of `npe` over all hits.
    pub total_pe: i64,
    /// Mean of `hittime`; `None` when there are no hits.
    pub mean_hit_time: Option<f64>,
    /// Number of hits.
    pub n_hits: usize,
}

impl EventSummary {
    /// Reads the default field names from `store`.
    ///
    /// # Errors
    /// Returns an error if any field is missing or has the wrong type.
    pub fn from_store<S: ValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        Self::from_store_with_names(store, &FieldNames::default())
    }

    /// Reads the fields named by `names` from `store`.
    ///
    /// # Errors
    /// Returns an error if any field is missing or has the wrong type.
    pub fn from_store_with_names<S: ValueStore + ?Sized>(
        store: &S,
        names: &FieldNames,
    ) -> Result<Self, StoreError> {
        // Arrays first: a missing array means the event was skipped.
        let pmt_id = store.int_array(&names.pmt_id)?;
        let npe = store.int_array(&names.npe)?;
        let hit_time = store.float_array(&names.hit_time)?;

        let vertex = (
            store.scalar(&names.x)?,
            store.scalar(&names.y)?,
            store.scalar(&names.z)?,
        );
        let edep = store.scalar(&names.edep)?;

        Ok(Self {
            vertex,
            edep,
            total_pe: npe.iter().map(|&v| i64::from(v)).sum(),
            mean_hit_time: hit_time.mean(),
            n_hits: pmt_id.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::store::DataStore;
    use approx::assert_relative_eq;

    fn filled_store() -> DataStore {
        let mut store = DataStore::new();
        store.set("x", 1.0.into());
        store.set("y", 2.0.into());
        store.set("z", 3.0.into());
        store.set("edep", 0.5.into());
        store.set("pmtid", vec![10, 20, 30].into());
        store.set("npe", vec![2, 5, 1].into());
        store.set("hittime", vec![1.1, 2.2, 3.3].into());
        store
    }

    #[test]
    fn test_summary() {
        let summary = EventSummary::from_store(&filled_store()).unwrap();
        assert_eq!(summary.vertex, (1.0, 2.0, 3.0));
        assert_eq!(summary.edep, 0.5);
        assert_eq!(summary.total_pe, 8);
        assert_eq!(summary.n_hits, 3);
        assert_relative_eq!(summary.mean_hit_time.unwrap(), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_array() {
        let mut store = DataStore::new();
        store.set("x", 1.0.into());
        let err = EventSummary::from_store(&store).unwrap_err();
        assert_eq!(err, StoreError::MissingField("pmtid".to_string()));
    }

    #[test]
    fn test_empty_arrays() {
        let mut store = filled_store();
        store.set("pmtid", Vec::<i32>::new().into());
        store.set("npe", Vec::<i32>::new().into());
        store.set("hittime", Vec::<f64>::new().into());
        let summary = EventSummary::from_store(&store).unwrap();
        assert_eq!(summary.total_pe, 0);
        assert_eq!(summary.mean_hit_time, None);
    }
}
