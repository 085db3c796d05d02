use numpy::PyReadonlyArray1;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use terrabgc_core::BgcError;

/// Validate that a numpy array is C-contiguous and copy it out.
pub fn to_vec(arr: &PyReadonlyArray1<'_, f64>, name: &str) -> PyResult<Vec<f64>> {
    arr.as_slice()
        .map(<[f64]>::to_vec)
        .map_err(|_| PyValueError::new_err(format!("{name} must be C-contiguous")))
}

/// Bad input becomes `ValueError`; failures inside the daily loop become
/// `RuntimeError`.
pub fn to_py_err(err: BgcError) -> PyErr {
    match err {
        BgcError::InvalidParameter { .. } | BgcError::Forcing(_) | BgcError::Config(_) => {
            PyValueError::new_err(err.to_string())
        }
        BgcError::InvariantViolation { .. } | BgcError::NumericalDomain { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}
