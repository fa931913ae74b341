//! Python-visible value store.

use numpy::{PyReadonlyArray1, ToPyArray};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyFloat};
use simhits_core::{DataStore, FieldValue, ValueStore};

use crate::value_error;

/// Converts one stored value into a Python object.
pub(crate) fn field_to_py(py: Python<'_>, value: &FieldValue) -> PyObject {
    match value {
        FieldValue::Scalar(v) => PyFloat::new(py, *v).into_any().unbind(),
        FieldValue::IntArray(a) => a.to_pyarray(py).into_any().unbind(),
        FieldValue::FloatArray(a) => a.to_pyarray(py).into_any().unbind(),
    }
}

/// Converts a Python float or 1-D int32/float64 array into a stored value.
fn field_from_py(name: &str, value: &Bound<'_, PyAny>) -> PyResult<FieldValue> {
    if let Ok(array) = value.extract::<PyReadonlyArray1<'_, i32>>() {
        return Ok(FieldValue::IntArray(array.as_array().to_owned()));
    }
    if let Ok(array) = value.extract::<PyReadonlyArray1<'_, f64>>() {
        return Ok(FieldValue::FloatArray(array.as_array().to_owned()));
    }
    if let Ok(v) = value.extract::<f64>() {
        return Ok(FieldValue::Scalar(v));
    }
    Err(value_error(
        &format!("DataStore.set({name})"),
        "expected a float or a 1-D int32/float64 array",
    ))
}

/// Builds a dict holding every field of `store`.
pub(crate) fn dict_from_store<'py>(
    py: Python<'py>,
    store: &DataStore,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (name, value) in store.iter() {
        dict.set_item(name, field_to_py(py, value))?;
    }
    Ok(dict)
}

/// Python wrapper for DataStore.
#[pyclass(name = "DataStore")]
#[derive(Default)]
pub struct PyDataStore {
    pub(crate) inner: DataStore,
}

#[pymethods]
impl PyDataStore {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, name: &str, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = field_from_py(name, value)?;
        self.inner.set(name, value);
        Ok(())
    }

    /// Returns the field, or None when it was never published.
    fn __getitem__(&self, py: Python<'_>, name: &str) -> PyObject {
        self.inner
            .get(name)
            .map_or_else(|| py.None(), |value| field_to_py(py, value))
    }

    fn __contains__(&self, name: &str) -> bool {
        self.inner.get(name).is_some()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys().map(str::to_string).collect()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        dict_from_store(py, &self.inner)
    }

    fn __repr__(&self) -> String {
        format!("DataStore(keys={:?})", self.keys())
    }
}
