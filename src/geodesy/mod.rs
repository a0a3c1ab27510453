//! Datums and the geocentric bridge between them.

pub mod datum;
pub mod geocentric;

pub use datum::{datum_transform, datums_equal, Datum, DatumKind, GridRef};
