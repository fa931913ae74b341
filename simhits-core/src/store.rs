//! Named value store shared between processing steps.
//!
//! A step publishes scalars and 1-D arrays under string keys; later steps
//! (or the Python side) read them back by name.

use crate::error::StoreError;
use ndarray::Array1;
use std::collections::BTreeMap;

/// A value held by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Floating-point scalar.
    Scalar(f64),
    /// Integer array.
    IntArray(Array1<i32>),
    /// Floating-point array.
    FloatArray(Array1<f64>),
}

impl FieldValue {
    /// Human readable kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::IntArray(_) => "int array",
            Self::FloatArray(_) => "float array",
        }
    }

    /// Returns the array length, or `None` for scalars.
    #[must_use]
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::IntArray(a) => Some(a.len()),
            Self::FloatArray(a) => Some(a.len()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<i32>> for FieldValue {
    fn from(values: Vec<i32>) -> Self {
        Self::IntArray(Array1::from_vec(values))
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(values: Vec<f64>) -> Self {
        Self::FloatArray(Array1::from_vec(values))
    }
}

/// Sink for named values.
///
/// Implementations replace any previous value stored under the same name.
pub trait ValueStore {
    /// Stores `value` under `name`.
    fn set(&mut self, name: &str, value: FieldValue);

    /// Returns the value stored under `name`.
    fn get(&self, name: &str) -> Option<&FieldValue>;

    /// Returns the scalar stored under `name`.
    ///
    /// # Errors
    /// Returns an error if the field is absent or not a scalar.
    fn scalar(&self, name: &str) -> Result<f64, StoreError> {
        match lookup(self, name)? {
            FieldValue::Scalar(v) => Ok(*v),
            other => Err(mismatch(name, "scalar", other)),
        }
    }

    /// Returns the integer array stored under `name`.
    ///
    /// # Errors
    /// Returns an error if the field is absent or not an integer array.
    fn int_array(&self, name: &str) -> Result<&Array1<i32>, StoreError> {
        match lookup(self, name)? {
            FieldValue::IntArray(a) => Ok(a),
            other => Err(mismatch(name, "int array", other)),
        }
    }

    /// Returns the float array stored under `name`.
    ///
    /// # Errors
    /// Returns an error if the field is absent or not a float array.
    fn float_array(&self, name: &str) -> Result<&Array1<f64>, StoreError> {
        match lookup(self, name)? {
            FieldValue::FloatArray(a) => Ok(a),
            other => Err(mismatch(name, "float array", other)),
        }
    }
}

fn lookup<'a, S: ValueStore + ?Sized>(
    store: &'a S,
    name: &str,
) -> Result<&'a FieldValue, StoreError> {
    store
        .get(name)
        .ok_or_else(|| StoreError::MissingField(name.to_string()))
}

fn mismatch(name: &str, expected: &'static str, found: &FieldValue) -> StoreError {
    StoreError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// In-memory value store.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    values: BTreeMap<String, FieldValue>,
    set_calls: usize,
}

impl DataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct fields held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of `set` calls received since creation.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_calls
    }

    /// Removes all fields. The `set` counter is kept.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl ValueStore for DataStore {
    fn set(&mut self, name: &str, value: FieldValue) {
        self.set_calls += 1;
        self.values.insert(name.to_string(), value);
    }

    fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }
}
