//! JSON dataset source integration
//!
//! Reads the four wire datasets the presentation layer ships: the
//! equipment catalog, the per-equipment position history, the state
//! catalog and the per-equipment state history. Dates arrive as
//! RFC 3339 strings and are parsed here, once, into comparable
//! timestamps.

use std::io::Read;

use geo::geometry::Point;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::SnapshotSource;
use crate::error::{FleetError, Result};
use crate::{Equipment, EquipmentState, FleetSnapshot, PositionRecord, StateHistoryEntry};

/// JSON datasets source
pub struct JsonSource<R>
where
    R: Read,
{
    equipment: R,
    positions: R,
    states: R,
    history: R,
}

impl<R> JsonSource<R>
where
    R: Read,
{
    /// One reader per wire dataset
    pub fn new(equipment: R, positions: R, states: R, history: R) -> Self {
        Self {
            equipment,
            positions,
            states,
            history,
        }
    }
}

impl<R> SnapshotSource for JsonSource<R>
where
    R: Read,
{
    fn fetch(&mut self) -> Result<(FleetSnapshot, Vec<FleetError>)> {
        let equipment_rows: Vec<EquipmentRow> = read_dataset("equipment", &mut self.equipment)?;
        let position_rows: Vec<PositionHistoryRow> = read_dataset("positions", &mut self.positions)?;
        let state_rows: Vec<StateRow> = read_dataset("states", &mut self.states)?;
        let history_rows: Vec<StateHistoryRow> = read_dataset("state history", &mut self.history)?;

        let mut rejected = vec![];

        let mut snapshot = FleetSnapshot::default();

        for row in equipment_rows {
            snapshot.equipment.push(Equipment::new(row.id, row.name));
        }

        for row in state_rows {
            snapshot
                .states
                .push(EquipmentState::new(row.id, row.name, row.color));
        }

        for row in position_rows {
            for pos in row.positions {
                match OffsetDateTime::parse(&pos.date, &Rfc3339) {
                    Ok(date) => snapshot.positions.push(PositionRecord::basic(
                        row.equipment_id.clone(),
                        Point::new(pos.lon, pos.lat),
                        date,
                    )),
                    Err(e) => rejected.push(FleetError::InvalidDate {
                        equipment_id: row.equipment_id.clone(),
                        raw: pos.date,
                        source: e,
                    }),
                }
            }
        }

        for row in history_rows {
            for event in row.states {
                match OffsetDateTime::parse(&event.date, &Rfc3339) {
                    Ok(date) => snapshot.history.push(StateHistoryEntry::basic(
                        row.equipment_id.clone(),
                        date,
                        event.state_id,
                    )),
                    Err(e) => rejected.push(FleetError::InvalidDate {
                        equipment_id: row.equipment_id.clone(),
                        raw: event.date,
                        source: e,
                    }),
                }
            }
        }

        Ok((snapshot, rejected))
    }
}

fn read_dataset<T, R>(dataset: &'static str, rdr: &mut R) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    serde_json::from_reader(rdr).map_err(|e| FleetError::Malformed { dataset, source: e })
}

#[derive(Debug, Deserialize)]
struct EquipmentRow {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionHistoryRow {
    equipment_id: String,
    positions: Vec<PositionRow>,
}

#[derive(Debug, Deserialize)]
struct PositionRow {
    lat: f64,
    lon: f64,
    date: String,
}

#[derive(Debug, Deserialize)]
struct StateRow {
    id: String,
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateHistoryRow {
    equipment_id: String,
    states: Vec<StateEventRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateEventRow {
    date: String,
    state_id: String,
}

#[cfg(test)]
pub mod tests {
    use time::macros::datetime;

    use super::JsonSource;
    use crate::{FleetError, SnapshotSource};

    const EQUIPMENT: &str = r##"[{"id": "E1", "name": "Excavator"}]"##;
    const STATES: &str = r##"[{"id": "S1", "name": "Idle", "color": "#888"}]"##;

    #[test]
    fn full_snapshot() -> Result<(), String> {
        let positions = r##"[{
            "equipmentId": "E1",
            "positions": [
                {"lat": 1.0, "lon": 2.0, "date": "2024-01-01T00:00:00Z"},
                {"lat": 3.0, "lon": 4.0, "date": "2024-01-02T00:00:00Z"}
            ]
        }]"##;
        let history = r##"[{
            "equipmentId": "E1",
            "states": [{"date": "2024-01-01T00:00:00Z", "stateId": "S1"}]
        }]"##;

        let mut source = JsonSource::new(
            EQUIPMENT.as_bytes(),
            positions.as_bytes(),
            STATES.as_bytes(),
            history.as_bytes(),
        );
        let (snapshot, rejected) = source.fetch().map_err(|e| e.to_string())?;

        assert!(rejected.is_empty());
        assert_eq!(1, snapshot.equipment.len());
        assert_eq!("Excavator", snapshot.equipment[0].name);
        assert_eq!(2, snapshot.positions.len());
        assert_eq!(datetime!(2024-01-02 0:00 UTC), snapshot.positions[1].date);
        assert_eq!(2.0, snapshot.positions[0].coordinates.x());
        assert_eq!(1.0, snapshot.positions[0].coordinates.y());
        assert_eq!(1, snapshot.states.len());
        assert_eq!(1, snapshot.history.len());
        assert_eq!("S1", snapshot.history[0].state_id);

        Ok(())
    }

    #[test]
    fn bad_date_rejected_rest_kept() -> Result<(), String> {
        let positions = r##"[{
            "equipmentId": "E1",
            "positions": [
                {"lat": 1.0, "lon": 2.0, "date": "not-a-date"},
                {"lat": 3.0, "lon": 4.0, "date": "2024-01-02T00:00:00Z"}
            ]
        }]"##;

        let mut source = JsonSource::new(
            EQUIPMENT.as_bytes(),
            positions.as_bytes(),
            STATES.as_bytes(),
            "[]".as_bytes(),
        );
        let (snapshot, rejected) = source.fetch().map_err(|e| e.to_string())?;

        assert_eq!(1, snapshot.positions.len());
        assert_eq!(datetime!(2024-01-02 0:00 UTC), snapshot.positions[0].date);
        assert_eq!(1, rejected.len());
        match &rejected[0] {
            FleetError::InvalidDate { equipment_id, raw, .. } => {
                assert_eq!("E1", equipment_id.as_str());
                assert_eq!("not-a-date", raw.as_str());
            }
            other => return Err(format!("unexpected error: {:?}", other)),
        }

        Ok(())
    }

    #[test]
    fn malformed_dataset_fails() {
        let mut source = JsonSource::new(
            "not json".as_bytes(),
            "[]".as_bytes(),
            "[]".as_bytes(),
            "[]".as_bytes(),
        );

        assert!(source.fetch().is_err());
    }
}
