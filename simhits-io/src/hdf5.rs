//! HDF5 output of flattened events, laid out like `NXevent_data`.
//!
//! Per-hit columns (`pmtid`, `npe`, `hittime`) are concatenated over all
//! events; `event_index[i]` is the offset of event `i`'s first hit.

use crate::{Error, Result};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::{s, ArrayView1};
use simhits_core::FlattenedOutput;
use std::path::Path;
use std::str::FromStr;

/// Dataset creation options.
#[derive(Clone, Debug)]
pub struct EventWriteOptions {
    /// Chunk length of the extendable datasets.
    pub chunk_events: usize,
    /// Deflate level, if any.
    pub compression: Option<u8>,
    /// Enable the shuffle filter.
    pub shuffle: bool,
}

impl Default for EventWriteOptions {
    fn default() -> Self {
        Self {
            chunk_events: 4096,
            compression: Some(4),
            shuffle: true,
        }
    }
}

/// Streaming writer for flattened events.
pub struct Hdf5EventSink {
    _file: File,
    event_id: Dataset,
    event_index: Dataset,
    x: Dataset,
    y: Dataset,
    z: Dataset,
    edep: Dataset,
    pmt_id: Dataset,
    npe: Dataset,
    hit_time: Dataset,
    event_count: usize,
    hit_count: usize,
}

impl Hdf5EventSink {
    /// Create a new streaming event sink.
    ///
    /// # Errors
    /// Returns an error if the HDF5 file or datasets cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, options: &EventWriteOptions) -> Result<Self> {
        let file = File::create(path)?;
        set_attr_str_file(&file, "simhits_format_version", "0.1")?;

        let entry = file.create_group("entry")?;
        set_attr_str_group(&entry, "NX_class", "NXentry")?;

        let hits = entry.create_group("hits")?;
        set_attr_str_group(&hits, "NX_class", "NXevent_data")?;

        let hit_time = create_extendable_dataset::<f64>(&hits, "hittime", options)?;
        set_dataset_units(&hit_time, "ns")?;

        Ok(Self {
            event_id: create_extendable_dataset::<i32>(&hits, "event_id", options)?,
            event_index: create_extendable_dataset::<u64>(&hits, "event_index", options)?,
            x: create_extendable_dataset::<f64>(&hits, "x", options)?,
            y: create_extendable_dataset::<f64>(&hits, "y", options)?,
            z: create_extendable_dataset::<f64>(&hits, "z", options)?,
            edep: create_extendable_dataset::<f64>(&hits, "edep", options)?,
            pmt_id: create_extendable_dataset::<i32>(&hits, "pmtid", options)?,
            npe: create_extendable_dataset::<i32>(&hits, "npe", options)?,
            hit_time,
            _file: file,
            event_count: 0,
            hit_count: 0,
        })
    }

    /// Append one event. Skipped events are not written.
    ///
    /// # Errors
    /// Returns an error if HDF5 I/O fails.
    pub fn write_event(&mut self, event_id: i32, output: &FlattenedOutput) -> Result<()> {
        let (Some(scalars), Some(arrays)) = (output.scalars(), output.arrays()) else {
            return Ok(());
        };

        let offset = u64::try_from(self.hit_count)
            .map_err(|_| Error::InvalidFormat("hit offset exceeds u64 range".to_string()))?;
        let n = self.event_count;

        append_slice(&self.event_id, n, &[event_id])?;
        append_slice(&self.event_index, n, &[offset])?;
        append_slice(&self.x, n, &[scalars.x])?;
        append_slice(&self.y, n, &[scalars.y])?;
        append_slice(&self.z, n, &[scalars.z])?;
        append_slice(&self.edep, n, &[scalars.edep])?;

        append_slice(&self.pmt_id, self.hit_count, &arrays.pmt_id)?;
        append_slice(&self.npe, self.hit_count, &arrays.npe)?;
        append_slice(&self.hit_time, self.hit_count, &arrays.hit_time)?;

        self.event_count += 1;
        self.hit_count += arrays.len();
        Ok(())
    }

    /// Number of events written.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Number of hits written.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hit_count
    }
}

fn create_extendable_dataset<T: H5Type>(
    group: &Group,
    name: &str,
    options: &EventWriteOptions,
) -> Result<Dataset> {
    let mut builder = group
        .new_dataset::<T>()
        .shape((0..,))
        .chunk((options.chunk_events.max(1),));

    if let Some(level) = options.compression {
        builder = builder.deflate(level);
    }

    if options.shuffle {
        builder = builder.shuffle();
    }

    Ok(builder.create(name)?)
}

fn append_slice<T: H5Type>(dataset: &Dataset, offset: usize, data: &[T]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    let new_len = offset + data.len();
    dataset.resize((new_len,))?;
    let view = ArrayView1::from(data);
    dataset.write_slice(view, s![offset..new_len])?;
    Ok(())
}

fn set_dataset_units(dataset: &Dataset, units: &str) -> Result<()> {
    let value = to_var_len_unicode(units)?;
    dataset
        .new_attr::<VarLenUnicode>()
        .create("units")?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str_file(file: &File, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    file.new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str_group(group: &Group, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    group
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use simhits_core::{EventFlattening, HitArrayExtractor, SimEvent, SimHit, SimTrack};
    use tempfile::NamedTempFile;

    fn flatten(event: &SimEvent) -> FlattenedOutput {
        HitArrayExtractor::new().extract(event).unwrap()
    }

    #[test]
    fn test_hdf5_event_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let first = SimEvent::new(1)
            .with_track(SimTrack::new(1.0, 2.0, 3.0, 0.5))
            .with_hit(SimHit::new(10, 2, 1.1))
            .with_hit(SimHit::new(20, 5, 2.2));
        let empty = SimEvent::new(2).with_track(SimTrack::new(9.0, 9.0, 9.0, 9.9));
        let last = SimEvent::new(3)
            .with_track(SimTrack::new(4.0, 5.0, 6.0, 1.5))
            .with_hit(SimHit::new(30, 1, 3.3));

        {
            let mut sink = Hdf5EventSink::create(file.path(), &EventWriteOptions::default())
                .unwrap();
            for event in [&first, &empty, &last] {
                sink.write_event(event.event_id, &flatten(event)).unwrap();
            }
            assert_eq!(sink.event_count(), 2);
            assert_eq!(sink.hit_count(), 3);
        }

        let file = File::open(file.path()).unwrap();
        let hits = file.group("entry/hits").unwrap();
        let ids: Vec<i32> = hits.dataset("event_id").unwrap().read_raw().unwrap();
        let index: Vec<u64> = hits.dataset("event_index").unwrap().read_raw().unwrap();
        let edep: Vec<f64> = hits.dataset("edep").unwrap().read_raw().unwrap();
        let pmt_id: Vec<i32> = hits.dataset("pmtid").unwrap().read_raw().unwrap();
        let hit_time: Vec<f64> = hits.dataset("hittime").unwrap().read_raw().unwrap();

        assert_eq!(ids, vec![1, 3]);
        assert_eq!(index, vec![0, 2]);
        assert_eq!(edep, vec![0.5, 1.5]);
        assert_eq!(pmt_id, vec![10, 20, 30]);
        assert_eq!(hit_time, vec![1.1, 2.2, 3.3]);
    }
}
