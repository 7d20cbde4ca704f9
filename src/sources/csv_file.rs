//! CSV positions source integration
//!
//! Alternate source for the position dataset: a flat CSV of position
//! fixes, one row per fix. Column names are configurable so exports
//! from different trackers can be loaded without reshaping.

use std::io::Read;

use csv::{Reader, StringRecord};
use geo::geometry::Point;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{FleetError, Result};
use crate::PositionRecord;

/// CSV position fixes source
pub struct CsvPositionsSource<R>
where
    R: Read,
{
    rdr: Reader<R>,
    fields: FieldsConfiguration,
}

impl<R> CsvPositionsSource<R>
where
    R: Read,
{
    pub fn new(rdr: Reader<R>, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            rdr,
            fields: match fields {
                Some(f) => f,
                None => FieldsConfiguration::default(),
            },
        }
    }

    /// Read every position fix, skipping rows that cannot be parsed
    ///
    /// Skipped rows are reported in the second element; a broken CSV
    /// stream still fails the whole read.
    pub fn fetch_positions(&mut self) -> Result<(Vec<PositionRecord>, Vec<FleetError>)> {
        let mut positions = vec![];
        let mut rejected = vec![];

        let mut header = self.rdr.headers().map_err(FleetError::from)?.clone();
        let header_idx = parse_header(&self.fields, &mut header)?;

        for row in self.rdr.records() {
            let mut rec = row.map_err(FleetError::from)?;

            match parse_row(&header_idx, &mut rec) {
                Ok(pos) => positions.push(pos),
                Err(e) => rejected.push(e),
            }
        }

        Ok((positions, rejected))
    }
}

/// Column names of the CSV positions file
///
/// Missing fields of a partial `fields:` section keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfiguration {
    pub equipment: String,
    pub lat: String,
    pub lon: String,
    pub date: String,
}

impl Default for FieldsConfiguration {
    fn default() -> Self {
        Self {
            equipment: "equipmentid".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            date: "date".to_string(),
        }
    }
}

/// Field to index map
#[derive(Debug)]
struct FieldsIndex {
    equipment: usize,
    lat: usize,
    lon: usize,
    date: usize,
}

fn parse_header(fields: &FieldsConfiguration, header: &mut StringRecord) -> Result<FieldsIndex> {
    header.trim();

    let position_of = |name: &str, field: &'static str| {
        header
            .iter()
            .position(|h| h.to_lowercase() == name)
            .ok_or(FleetError::MissingField { field, row: 1 })
    };

    Ok(FieldsIndex {
        equipment: position_of(&fields.equipment, "equipment")?,
        lat: position_of(&fields.lat, "latitude")?,
        lon: position_of(&fields.lon, "longitude")?,
        date: position_of(&fields.date, "date")?,
    })
}

fn parse_row(header: &FieldsIndex, row: &mut StringRecord) -> Result<PositionRecord> {
    row.trim();

    let line = row.position().map(|p| p.line()).unwrap_or(0);

    let equipment_id = row
        .get(header.equipment)
        .ok_or(FleetError::MissingField {
            field: "equipment",
            row: line,
        })?
        .to_string();

    let lat = row
        .get(header.lat)
        .ok_or(FleetError::MissingField {
            field: "latitude",
            row: line,
        })?
        .parse::<f64>()
        .map_err(|e| FleetError::InvalidCoordinate {
            field: "latitude",
            row: line,
            source: e,
        })?;

    let lon = row
        .get(header.lon)
        .ok_or(FleetError::MissingField {
            field: "longitude",
            row: line,
        })?
        .parse::<f64>()
        .map_err(|e| FleetError::InvalidCoordinate {
            field: "longitude",
            row: line,
            source: e,
        })?;

    let raw_date = row.get(header.date).ok_or(FleetError::MissingField {
        field: "date",
        row: line,
    })?;

    let date = OffsetDateTime::parse(raw_date, &Rfc3339).map_err(|e| FleetError::InvalidDate {
        equipment_id: equipment_id.clone(),
        raw: raw_date.to_string(),
        source: e,
    })?;

    Ok(PositionRecord::basic(
        equipment_id,
        Point::new(lon, lat),
        date,
    ))
}

#[cfg(test)]
pub mod tests {
    use csv::ReaderBuilder;
    use time::macros::datetime;

    use super::CsvPositionsSource;
    use crate::FleetError;

    #[test]
    fn positions_from_csv() -> Result<(), String> {
        let data = "equipmentId,lat,lon,date\n\
            E1,-26.31832,-48.8702222,2024-01-01T00:00:00Z\n\
            E1,-26.3185919,-48.8619776,2024-01-02T00:00:00Z\n";

        let rdr = ReaderBuilder::new().from_reader(data.as_bytes());
        let mut source = CsvPositionsSource::new(rdr, None);

        let (positions, rejected) = source.fetch_positions().map_err(|e| e.to_string())?;

        assert!(rejected.is_empty());
        assert_eq!(2, positions.len());
        assert_eq!("E1", positions[0].equipment_id);
        assert_eq!(-26.31832, positions[0].coordinates.y());
        assert_eq!(-48.8702222, positions[0].coordinates.x());
        assert_eq!(datetime!(2024-01-02 0:00 UTC), positions[1].date);

        Ok(())
    }

    #[test]
    fn bad_rows_skipped() -> Result<(), String> {
        let data = "equipmentId,lat,lon,date\n\
            E1,not-a-number,-48.86,2024-01-01T00:00:00Z\n\
            E1,-26.31,-48.87,yesterday\n\
            E2,-26.32,-48.88,2024-01-03T00:00:00Z\n";

        let rdr = ReaderBuilder::new().from_reader(data.as_bytes());
        let mut source = CsvPositionsSource::new(rdr, None);

        let (positions, rejected) = source.fetch_positions().map_err(|e| e.to_string())?;

        assert_eq!(1, positions.len());
        assert_eq!("E2", positions[0].equipment_id);
        assert_eq!(2, rejected.len());
        assert!(matches!(
            rejected[0],
            FleetError::InvalidCoordinate {
                field: "latitude",
                ..
            }
        ));
        assert!(matches!(rejected[1], FleetError::InvalidDate { .. }));

        Ok(())
    }

    #[test]
    fn partial_fields_section_merges_with_defaults() -> Result<(), String> {
        let yaml = "date: timestamp";

        let fields: super::FieldsConfiguration =
            serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

        assert_eq!("timestamp", fields.date);
        assert_eq!("equipmentid", fields.equipment);
        assert_eq!("lat", fields.lat);
        assert_eq!("lon", fields.lon);

        Ok(())
    }

    #[test]
    fn missing_header_fails() {
        let data = "device,lat,lon,date\nE1,-26.31,-48.87,2024-01-01T00:00:00Z\n";

        let rdr = ReaderBuilder::new().from_reader(data.as_bytes());
        let mut source = CsvPositionsSource::new(rdr, None);

        assert!(source.fetch_positions().is_err());
    }
}
