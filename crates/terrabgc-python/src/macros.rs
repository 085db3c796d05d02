/// Generate a frozen `#[pyclass]` with one numpy array attribute per
/// column of a core timeseries, plus `from_timeseries()` to move the
/// columns over without copying element by element.
macro_rules! define_timeseries_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: Py<numpy::PyArray1<f64>>,
            )+
        }

        impl $name {
            pub fn from_timeseries(py: pyo3::Python<'_>, ts: $core_type) -> Self {
                Self {
                    $(
                        $field: numpy::PyArray1::from_vec(py, ts.$field).unbind(),
                    )+
                }
            }
        }
    };
}
