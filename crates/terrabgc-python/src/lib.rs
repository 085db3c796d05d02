#[macro_use]
mod macros;
mod convert;

mod engine;

use pyo3::prelude::*;

/// Register a submodule in sys.modules so `from parent.child import ...` works.
fn register_submodule(py: Python<'_>, parent_name: &str, child: &Bound<'_, PyModule>) -> PyResult<()> {
    let full_name = format!("{}.{}", parent_name, child.name()?);
    py.import("sys")?.getattr("modules")?.set_item(full_name, child)?;
    Ok(())
}

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    let parent_name = m.name()?.to_string();

    m.add_function(wrap_pyfunction!(version, m)?)?;
    engine::register(m)?;

    let sub = m.getattr("engine")?;
    register_submodule(py, &parent_name, sub.downcast::<PyModule>()?)?;
    Ok(())
}
