//! Display projection API
//!
//! Turns resolved [`EquipmentView`]s into display-ready strings. Pure
//! formatting: fallback substitution and date rendering only, no join
//! or ordering decision is re-derived here.

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, OwnedFormatItem};
use time::OffsetDateTime;

use super::view::{EquipmentView, StateHistoryView};
use crate::error::Result;

/// Map marker data of one equipment unit
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerCard {
    pub lat: f64,
    pub lon: f64,
    /// Rendered date of the last recorded position
    pub recorded_at: String,
}

/// One rendered state-history table row
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub date: String,
    pub state_name: String,
    pub color: String,
}

/// Display-ready view of one equipment unit
///
/// `marker` is `None` for units without a valid position; they are
/// omitted from map rendering but stay in tabular listings.
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentCard {
    pub equipment_id: String,
    pub name: String,
    pub marker: Option<MarkerCard>,
    pub state_label: String,
    pub state_color: String,
    pub history: Vec<HistoryRow>,
}

/// The detail-modal record: one unit's rendered state history
#[derive(Clone, Debug, PartialEq)]
pub struct StateHistoryCard {
    pub equipment_name: String,
    pub rows: Vec<HistoryRow>,
}

/// Projection options: fallback labels and date rendering
pub struct DisplayOptions {
    /// Label for equipment ids without a catalog match
    pub unknown_equipment: String,
    /// Label for state ids without a catalog match
    pub unknown_state: String,
    /// Color for state ids without a catalog match
    pub fallback_color: String,
    /// Date format, RFC 3339 when not set
    format: Option<OwnedFormatItem>,
}

impl DisplayOptions {
    /// Start with the default fallbacks and RFC 3339 dates
    pub fn new() -> Self {
        Self {
            unknown_equipment: "Unknown Equipment".to_string(),
            unknown_state: "Unknown".to_string(),
            fallback_color: "#000".to_string(),
            format: None,
        }
    }

    /// Set the date format, eg.: `[day]/[month]/[year] [hour]:[minute]`
    pub fn date_format(&mut self, fmt: &str) -> Result<&mut Self> {
        self.format = Some(format_description::parse_owned::<2>(fmt)?);

        Ok(self)
    }

    fn render_date(&self, date: OffsetDateTime) -> Result<String> {
        let rendered = match &self.format {
            Some(f) => date.format(f)?,
            None => date.format(&Rfc3339)?,
        };

        Ok(rendered)
    }

    fn render_entry(&self, entry: &StateHistoryView) -> Result<HistoryRow> {
        let (state_name, color) = match &entry.state {
            Some(state) => (state.name.clone(), state.color.clone()),
            None => (self.unknown_state.clone(), self.fallback_color.clone()),
        };

        Ok(HistoryRow {
            date: self.render_date(entry.date)?,
            state_name,
            color,
        })
    }

    /// Render one equipment view
    pub fn project(&self, view: &EquipmentView) -> Result<EquipmentCard> {
        let name = view
            .name
            .clone()
            .unwrap_or_else(|| self.unknown_equipment.clone());

        let marker = match &view.last_position {
            Some(pos) => Some(MarkerCard {
                lat: pos.coordinates.y(),
                lon: pos.coordinates.x(),
                recorded_at: self.render_date(pos.date)?,
            }),
            None => None,
        };

        let (state_label, state_color) = match &view.current_state {
            Some(state) => (state.name.clone(), state.color.clone()),
            None => (self.unknown_state.clone(), self.fallback_color.clone()),
        };

        let mut history = vec![];
        for entry in &view.history {
            history.push(self.render_entry(entry)?);
        }

        Ok(EquipmentCard {
            equipment_id: view.equipment_id.clone(),
            name,
            marker,
            state_label,
            state_color,
            history,
        })
    }

    /// Render every view, keeping the resolved order
    pub fn project_all(&self, views: &[EquipmentView]) -> Result<Vec<EquipmentCard>> {
        let mut cards = vec![];
        for view in views {
            cards.push(self.project(view)?);
        }

        Ok(cards)
    }

    /// Render the state-history card of a user-selected equipment id
    ///
    /// `None` when the id was not observed in the snapshot at all.
    pub fn history_card(
        &self,
        views: &[EquipmentView],
        equipment_id: &str,
    ) -> Result<Option<StateHistoryCard>> {
        let view = match views.iter().find(|v| v.equipment_id == equipment_id) {
            Some(v) => v,
            None => return Ok(None),
        };

        let mut rows = vec![];
        for entry in &view.history {
            rows.push(self.render_entry(entry)?);
        }

        Ok(Some(StateHistoryCard {
            equipment_name: view
                .name
                .clone()
                .unwrap_or_else(|| self.unknown_equipment.clone()),
            rows,
        }))
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Display section of the YAML configuration file
///
/// Every field is optional; missing fields keep the crate defaults.
/// The labels exist so the UI locale can be applied, eg.:
///
/// ```yaml
/// display:
///   unknown_equipment: Equipamento Desconhecido
///   unknown_state: Desconhecido
///   date_format: "[day]/[month]/[year] [hour]:[minute]"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DisplayConfiguration {
    pub unknown_equipment: Option<String>,
    pub unknown_state: Option<String>,
    pub fallback_color: Option<String>,
    pub date_format: Option<String>,
}

impl DisplayConfiguration {
    /// Build the projection options, parsing the configured date format
    pub fn into_options(self) -> Result<DisplayOptions> {
        let mut options = DisplayOptions::new();

        if let Some(label) = self.unknown_equipment {
            options.unknown_equipment = label;
        }
        if let Some(label) = self.unknown_state {
            options.unknown_state = label;
        }
        if let Some(color) = self.fallback_color {
            options.fallback_color = color;
        }
        if let Some(fmt) = self.date_format {
            options.date_format(&fmt)?;
        }

        Ok(options)
    }
}
