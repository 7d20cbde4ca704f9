//! Equipment join API

use std::collections::{BTreeMap, BTreeSet};

use time::OffsetDateTime;
use tracing::warn;

use super::record::{EquipmentState, FleetSnapshot, PositionRecord, StateHistoryEntry};
use super::timeline::{latest, sorted_descending};

/// One state-history entry resolved against the state catalog
///
/// `state` is `None` when the recorded state id has no catalog match;
/// the entry is kept and the projector substitutes the fallback label.
#[derive(Clone, Debug, PartialEq)]
pub struct StateHistoryView {
    pub date: OffsetDateTime,
    pub state: Option<EquipmentState>,
}

/// The denormalized view of one equipment unit
///
/// `name` is the catalog name, `None` when the id was only observed in
/// a stream. `last_position` is `None` for units without a single valid
/// position fix; those stay in the listing but carry no map marker.
/// `history` is ordered most recent first.
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentView {
    pub equipment_id: String,
    pub name: Option<String>,
    pub last_position: Option<PositionRecord>,
    pub current_state: Option<EquipmentState>,
    pub history: Vec<StateHistoryView>,
}

/// Default views builder from a fleet snapshot
pub struct SnapshotToViews {}

impl SnapshotToViews {
    /// Resolve one view per equipment id observed in the snapshot
    ///
    /// The output covers the union of the equipment catalog and the ids
    /// appearing in the position and state-history streams, one view
    /// per id, ordered by id. The snapshot is never mutated, so two
    /// passes over the same snapshot yield the same views.
    pub fn build(snapshot: &FleetSnapshot) -> Vec<EquipmentView> {
        let mut names: BTreeMap<&str, &str> = BTreeMap::new();
        for eq in &snapshot.equipment {
            names.insert(&eq.id, &eq.name);
        }

        let mut catalog: BTreeMap<&str, &EquipmentState> = BTreeMap::new();
        for state in &snapshot.states {
            catalog.insert(&state.id, state);
        }

        let mut positions: BTreeMap<&str, Vec<&PositionRecord>> = BTreeMap::new();
        for pos in &snapshot.positions {
            let stream = positions.entry(&pos.equipment_id).or_insert(vec![]);
            stream.push(pos);
        }

        let mut history: BTreeMap<&str, Vec<&StateHistoryEntry>> = BTreeMap::new();
        for entry in &snapshot.history {
            let stream = history.entry(&entry.equipment_id).or_insert(vec![]);
            stream.push(entry);
        }

        let mut ids: BTreeSet<&str> = BTreeSet::new();
        ids.extend(names.keys());
        ids.extend(positions.keys());
        ids.extend(history.keys());

        let mut views = vec![];

        for id in ids {
            let name = match names.get(id) {
                Some(n) => Some(n.to_string()),
                None => {
                    warn!(equipment_id = id, "equipment id not in catalog");
                    None
                }
            };

            let last_position = positions
                .get(id)
                .and_then(|stream| latest(stream))
                .map(|pos| (*pos).clone());

            let events = history.get(id).map(|s| s.as_slice()).unwrap_or(&[]);

            let current_state = latest(events).and_then(|event| {
                let found = catalog.get(event.state_id.as_str());
                if found.is_none() {
                    warn!(
                        equipment_id = id,
                        state_id = event.state_id.as_str(),
                        "current state id not in catalog"
                    );
                }
                found.map(|s| (*s).clone())
            });

            let entries = sorted_descending(events)
                .into_iter()
                .map(|event| StateHistoryView {
                    date: event.date,
                    state: catalog.get(event.state_id.as_str()).map(|s| (*s).clone()),
                })
                .collect();

            views.push(EquipmentView {
                equipment_id: id.to_string(),
                name,
                last_position,
                current_state,
                history: entries,
            });
        }

        views
    }
}
