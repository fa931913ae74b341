//! simhits-python: PyO3 Python bindings for simhits.
#![allow(
    clippy::doc_markdown,
    clippy::needless_pass_by_value,
    clippy::elidable_lifetime_names
)]
//!
//! This crate provides Python bindings using PyO3 and numpy so that
//! flattened events reach Python as numpy arrays.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use simhits_core::{
    DataStore, EventFlattening, HitArrayExtractor, SimEvent, SimHit, SimTrack,
};
use simhits_io::{run_events, EventFileReader, FlattenStep, RunConfig};

pub mod store;

use store::{dict_from_store, field_to_py, PyDataStore};

fn io_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyIOError::new_err(format!("{context}: {err}"))
}

pub(crate) fn value_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(format!("{context}: {err}"))
}

fn build_event(tracks: Vec<(f64, f64, f64, f64)>, hits: Vec<(i32, i32, f64)>) -> SimEvent {
    SimEvent {
        event_id: 0,
        tracks: tracks
            .into_iter()
            .map(|(x, y, z, edep)| SimTrack::new(x, y, z, edep))
            .collect(),
        hits: hits
            .into_iter()
            .map(|(pmt_id, npe, hit_time)| SimHit::new(pmt_id, npe, hit_time))
            .collect(),
    }
}

/// Flatten one event given as track tuples `(x, y, z, edep)` and hit
/// tuples `(pmtid, npe, hittime)`.
///
/// Returns a dict with the seven fields, or an empty dict when the event
/// has no hits.
#[pyfunction]
#[pyo3(signature = (tracks, hits))]
fn flatten_event<'py>(
    py: Python<'py>,
    tracks: Vec<(f64, f64, f64, f64)>,
    hits: Vec<(i32, i32, f64)>,
) -> PyResult<Bound<'py, PyDict>> {
    let event = build_event(tracks, hits);
    let output = HitArrayExtractor::new()
        .extract(&event)
        .map_err(|e| value_error("flatten_event", e))?;

    let dict = PyDict::new(py);
    for (name, value) in output.into_fields() {
        dict.set_item(name, field_to_py(py, &value))?;
    }
    Ok(dict)
}

/// Flatten one event and publish it into `store`.
///
/// Returns the number of fields published (0 for a skipped event).
#[pyfunction]
#[pyo3(signature = (store, tracks, hits))]
fn flatten_into(
    mut store: PyRefMut<'_, PyDataStore>,
    tracks: Vec<(f64, f64, f64, f64)>,
    hits: Vec<(i32, i32, f64)>,
) -> PyResult<usize> {
    let event = build_event(tracks, hits);
    let output = HitArrayExtractor::new()
        .extract(&event)
        .map_err(|e| value_error("flatten_into", e))?;
    Ok(output.publish(&mut store.inner))
}

/// Run the flattening step over every event of a JSON-lines file.
///
/// Returns one entry per event: a dict of numpy arrays and floats, an
/// empty dict for events without hits, or None when the event could not
/// be looked up.
#[pyfunction]
#[pyo3(signature = (path, evt_max=None))]
fn read_events_numpy<'py>(
    py: Python<'py>,
    path: &str,
    evt_max: Option<usize>,
) -> PyResult<Bound<'py, PyList>> {
    let mut buffer = EventFileReader::open(path)
        .and_then(EventFileReader::into_buffer)
        .map_err(|e| io_error(&format!("read_events_numpy: open {path}"), e))?;

    let mut store = DataStore::new();
    let mut entries: Vec<PyObject> = Vec::new();
    let mut failure = None;

    run_events(
        &mut buffer,
        &FlattenStep::new(HitArrayExtractor::new()),
        &mut store,
        &RunConfig::default().with_evt_max(evt_max),
        |result, store| {
            if failure.is_some() {
                return;
            }
            let entry = match result {
                Ok(_) => dict_from_store(py, store).map(|d| d.into_any().unbind()),
                Err(_) => Ok(py.None()),
            };
            match entry {
                Ok(obj) => entries.push(obj),
                Err(e) => failure = Some(e),
            }
        },
    );

    if let Some(err) = failure {
        return Err(err);
    }
    PyList::new(py, entries)
}

/// Python module for simhits.
#[pymodule]
fn simhits(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDataStore>()?;
    m.add_function(wrap_pyfunction!(flatten_event, m)?)?;
    m.add_function(wrap_pyfunction!(flatten_into, m)?)?;
    m.add_function(wrap_pyfunction!(read_events_numpy, m)?)?;
    Ok(())
}
