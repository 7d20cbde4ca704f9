//! fleet2map cli - equipment map view-model resolver from raw fleet snapshots

use std::fs::{self, File};

use argopt::{cmd_group, subcmd};
use serde::Deserialize;

use fleet2map::{
    DisplayConfiguration, DisplayOptions, FleetError, FleetSnapshot, JsonSource, SnapshotSource,
    SnapshotToViews,
};

#[cfg(feature = "csv")]
use csv::Reader;
#[cfg(feature = "csv")]
use fleet2map::{CsvPositionsSource, FieldsConfiguration};

/// CLI of fleet2map - Resolve your fleet snapshots into a map listing
#[cmd_group(commands = [map, history])]
fn main() -> Result<(), String> {}

/// Print the map listing: one marker per equipment with a position
#[subcmd]
fn map(
    /// Equipment catalog JSON file
    equipment: String,
    /// Position history JSON file
    positions: String,
    /// State catalog JSON file
    states: String,
    /// State history JSON file
    state_history: String,
    /// Replace the position dataset with a CSV of position fixes
    #[opt(long)]
    positions_csv: Option<String>,
    /// Display and fields configuration. Default: .fleet2map.yaml, ~/.fleet2map.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let configs = load_configs(config);
    let options = projector_options(&configs)?;

    let (snapshot, rejected) = load_snapshot(
        &equipment,
        &positions,
        &states,
        &state_history,
        positions_csv,
        &configs,
    )?;
    report_rejected(&rejected);

    let views = SnapshotToViews::build(&snapshot);
    let cards = options.project_all(&views).map_err(|e| e.to_string())?;

    for card in cards {
        if let Some(marker) = card.marker {
            println!(
                "{} ({}): {}, {} @ {} - {}",
                card.name, card.equipment_id, marker.lat, marker.lon, marker.recorded_at,
                card.state_label
            );
        }
    }

    Ok(())
}

/// Print the state history of one equipment unit
#[subcmd]
fn history(
    /// Equipment id to inspect
    equipment_id: String,
    /// Equipment catalog JSON file
    equipment: String,
    /// Position history JSON file
    positions: String,
    /// State catalog JSON file
    states: String,
    /// State history JSON file
    state_history: String,
    /// Display and fields configuration. Default: .fleet2map.yaml, ~/.fleet2map.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let configs = load_configs(config);
    let options = projector_options(&configs)?;

    let (snapshot, rejected) =
        load_snapshot(&equipment, &positions, &states, &state_history, None, &configs)?;
    report_rejected(&rejected);

    let views = SnapshotToViews::build(&snapshot);
    let card = options
        .history_card(&views, &equipment_id)
        .map_err(|e| e.to_string())?
        .ok_or(format!("Equipment `{}` not found", equipment_id))?;

    println!("{}", card.equipment_name);
    for row in card.rows {
        println!("{} - {} ({})", row.date, row.state_name, row.color);
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
}

fn report_rejected(rejected: &[FleetError]) {
    for e in rejected {
        eprintln!("warning: {}", e);
    }
}

fn projector_options(configs: &Configs) -> Result<DisplayOptions, String> {
    configs
        .display
        .clone()
        .unwrap_or_default()
        .into_options()
        .map_err(|e| e.to_string())
}

fn load_snapshot(
    equipment: &str,
    positions: &str,
    states: &str,
    state_history: &str,
    positions_csv: Option<String>,
    configs: &Configs,
) -> Result<(FleetSnapshot, Vec<FleetError>), String> {
    let equipment = open(equipment, "equipment")?;
    let positions = open(positions, "positions")?;
    let states = open(states, "states")?;
    let state_history = open(state_history, "state history")?;

    let mut source = JsonSource::new(equipment, positions, states, state_history);
    let (mut snapshot, mut rejected) = source.fetch().map_err(|e| e.to_string())?;

    #[cfg(feature = "csv")]
    if let Some(csv_path) = positions_csv {
        let csv = open(&csv_path, "positions CSV")?;
        let mut source = CsvPositionsSource::new(Reader::from_reader(csv), configs.fields.clone());

        let (csv_positions, csv_rejected) = source.fetch_positions().map_err(|e| e.to_string())?;
        snapshot.positions = csv_positions;
        rejected.extend(csv_rejected);
    }

    #[cfg(not(feature = "csv"))]
    {
        let _ = configs;
        if positions_csv.is_some() {
            return Err("CSV support was not built in".to_string());
        }
    }

    Ok((snapshot, rejected))
}

fn open(path: &str, dataset: &str) -> Result<File, String> {
    File::open(path).map_err(|e| format!("Failed on open the {} file: {}", dataset, e))
}

/// Load the current config
fn load_configs(provided: Option<String>) -> Configs {
    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(sprovided);
    }

    options.push(".fleet2map.yaml".to_string());

    if let Some(home) = dirs::home_dir() {
        if let Some(shome) = home.to_str() {
            options.push(format!("{}/.fleet2map.yaml", shome));
        }
    }

    let mut yaml: Option<String> = None;
    for fi in options {
        if let Ok(s) = fs::read_to_string(fi) {
            yaml = Some(s);
            break;
        }
    }

    if let Some(s) = yaml {
        if let Ok(conf) = serde_yaml::from_str::<Configs>(&s) {
            return conf;
        }
    }

    Configs::default()
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Configs {
    #[serde(default)]
    pub display: Option<DisplayConfiguration>,
    #[cfg(feature = "csv")]
    #[serde(default)]
    pub fields: Option<FieldsConfiguration>,
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "\ndisplay:\n  unknown_equipment: Equipamento Desconhecido\n  date_format: \"[day]/[month]/[year]\"";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    let display = conf.display.ok_or("display section not parsed")?;
    assert_eq!(
        Some("Equipamento Desconhecido".to_string()),
        display.unknown_equipment
    );
    assert_eq!(
        Some("[day]/[month]/[year]".to_string()),
        display.date_format
    );
    assert_eq!(None, display.unknown_state);

    Ok(())
}

/// A partial `fields:` section must not break the rest of the config
#[cfg(feature = "csv")]
#[test]
fn parse_configs_with_partial_fields() -> Result<(), String> {
    let yaml = "\ndisplay:\n  unknown_state: Desconhecido\nfields:\n  date: timestamp";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    let display = conf.display.ok_or("display section not parsed")?;
    assert_eq!(Some("Desconhecido".to_string()), display.unknown_state);

    let fields = conf.fields.ok_or("fields section not parsed")?;
    assert_eq!("timestamp", fields.date);
    assert_eq!("equipmentid", fields.equipment);

    Ok(())
}
