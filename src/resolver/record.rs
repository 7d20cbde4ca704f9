//! Fleet snapshot definitions

use geo::geometry::Point;
use time::OffsetDateTime;

/// A physical unit tracked by id. Reference data, read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Equipment {
    pub id: String,
    pub name: String,
}

impl Equipment {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}

/// One recorded observation of an equipment location
///
/// Coordinates keep the wire values untouched: lon is `x`, lat is `y`.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionRecord {
    pub equipment_id: String,
    pub coordinates: Point,
    pub date: OffsetDateTime,
}

impl PositionRecord {
    pub fn basic(equipment_id: String, coordinates: Point, date: OffsetDateTime) -> Self {
        Self {
            equipment_id,
            coordinates,
            date,
        }
    }
}

/// A catalog entry for a possible operating state. Reference data.
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentState {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl EquipmentState {
    pub fn new(id: String, name: String, color: String) -> Self {
        Self { id, name, color }
    }
}

/// One recorded transition of an equipment to an operating state
///
/// `state_id` may reference a catalog entry that does not exist; the
/// join resolves it to a fallback instead of dropping the entry.
#[derive(Clone, Debug, PartialEq)]
pub struct StateHistoryEntry {
    pub equipment_id: String,
    pub date: OffsetDateTime,
    pub state_id: String,
}

impl StateHistoryEntry {
    pub fn basic(equipment_id: String, date: OffsetDateTime, state_id: String) -> Self {
        Self {
            equipment_id,
            date,
            state_id,
        }
    }
}

/// The fully materialized input of one resolution pass
///
/// Loaded once per session from a [`crate::SnapshotSource`] and treated
/// as immutable for the duration of every resolution over it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FleetSnapshot {
    pub equipment: Vec<Equipment>,
    pub positions: Vec<PositionRecord>,
    pub states: Vec<EquipmentState>,
    pub history: Vec<StateHistoryEntry>,
}
