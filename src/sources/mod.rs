//! Snapshot sources API

use crate::error::{FleetError, Result};
use crate::FleetSnapshot;

/// Fleet snapshot source
pub trait SnapshotSource {
    /// Fetch one fully materialized snapshot
    ///
    /// Records whose date cannot be parsed are excluded from the
    /// snapshot and reported in the returned list instead of aborting
    /// the fetch.
    fn fetch(&mut self) -> Result<(FleetSnapshot, Vec<FleetError>)>;
}

mod json_file;

pub use json_file::JsonSource;

#[cfg(feature = "csv")]
mod csv_file;

#[cfg(feature = "csv")]
pub use csv_file::{CsvPositionsSource, FieldsConfiguration};
