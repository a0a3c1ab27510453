//! Map projections and datum transformations.
//!
//! Build a [`Proj`] from a PROJ string, WKT, PROJJSON or a registered name,
//! then move points between two of them with [`transform`].

pub mod builder;
pub mod error;
pub mod geodesy;
pub mod grid;
mod names;
pub mod params;
pub mod parse;
pub mod point;
pub mod proj;
pub mod transform;

#[cfg(feature = "python")]
mod py;

pub use builder::Proj;
pub use error::{ProjError, Result};
pub use parse::{definition, register_definition, CrsDefinition};
pub use point::Point;
pub use transform::{transform, transform_batch};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}
