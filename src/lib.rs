//! fleet2map - equipment map view-model resolver from raw fleet snapshots
//!
//! Joins three time-stamped datasets (position fixes, state catalog,
//! state-change events) by equipment id and resolves, per unit, the
//! latest position, the latest operating state and the full ordered
//! state history, ready for a map or table to render.

mod error;
mod resolver;
mod sources;

pub use error::{FleetError, Result};
pub use resolver::display::{
    DisplayConfiguration, DisplayOptions, EquipmentCard, HistoryRow, MarkerCard, StateHistoryCard,
};
pub use resolver::record::{
    Equipment, EquipmentState, FleetSnapshot, PositionRecord, StateHistoryEntry,
};
pub use resolver::timeline::{latest, sorted_descending, Dated};
pub use resolver::view::{EquipmentView, SnapshotToViews, StateHistoryView};
pub use sources::JsonSource;
pub use sources::SnapshotSource;

#[cfg(feature = "csv")]
pub use sources::{CsvPositionsSource, FieldsConfiguration};
