//! CSV and settings loaders
//!
//! Tracking files are wide: one row per frame, one column per
//! (player, axis). Home and away files share `frameID` and are merged into a
//! single [`Tracking`].

use anyhow::{bail, Context, Result};
use pc_core::model::{ColumnKey, Event, Point, SampleField, Tracking, TrackingFrame};
use pc_core::{ModelSettings, ThreatGrid};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const FRAME_COLUMN: &str = "frameID";
const PERIOD_COLUMN: &str = "Period";
const TIME_COLUMN: &str = "Time [s]";

/// Tracking plus whether the feed already carried player velocities.
#[derive(Debug, Clone)]
pub struct TrackingData {
    pub tracking: Tracking,
    pub has_velocities: bool,
}

/// Load and merge the home and away tracking files.
pub fn load_tracking(home: &Path, away: &Path) -> Result<TrackingData> {
    let mut tracking = Tracking::new();
    let home_velocities = read_tracking_file(home, &mut tracking)?;
    let away_velocities = read_tracking_file(away, &mut tracking)?;

    info!("Loaded {} tracking frames", tracking.len());
    Ok(TrackingData { tracking, has_velocities: home_velocities && away_velocities })
}

/// Merge one wide tracking file into `tracking`. Returns true when the file
/// has velocity columns.
fn read_tracking_file(path: &Path, tracking: &mut Tracking) -> Result<bool> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open tracking CSV: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let column_index = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("{} has no '{}' column", path.display(), name))
    };
    let frame_col = column_index(FRAME_COLUMN)?;
    let period_col = column_index(PERIOD_COLUMN)?;
    let time_col = column_index(TIME_COLUMN)?;

    let mut keys = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(key) = ColumnKey::parse(header)? {
            keys.push((idx, key));
        }
    }
    let has_velocities = keys
        .iter()
        .any(|(_, key)| matches!(key, ColumnKey::Player { field: SampleField::Vx, .. }));
    debug!("{}: {} model columns", path.display(), keys.len());

    for (row, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Bad record at line {} of {}", row + 2, path.display()))?;

        let frame_id: u64 = record[frame_col]
            .trim()
            .parse()
            .with_context(|| format!("Invalid frameID '{}' at line {}", &record[frame_col], row + 2))?;
        let period: u8 = record[period_col]
            .trim()
            .parse()
            .with_context(|| format!("Invalid Period '{}' at line {}", &record[period_col], row + 2))?;
        let time_s = parse_cell(&record[time_col])
            .with_context(|| format!("Invalid time '{}' at line {}", &record[time_col], row + 2))?;

        let mut frame = match tracking.frames.remove(&frame_id) {
            Some(existing) => {
                if existing.period != period {
                    bail!(
                        "Frame {} is period {} in one file and {} in {}",
                        frame_id,
                        existing.period,
                        period,
                        path.display()
                    );
                }
                existing
            }
            None => TrackingFrame::new(frame_id, period, time_s),
        };

        for (idx, key) in &keys {
            let value = parse_cell(&record[*idx]).with_context(|| {
                format!("Invalid value '{}' in column {} at line {}", &record[*idx], idx, row + 2)
            })?;
            frame.apply(*key, value);
        }
        tracking.insert(frame);
    }

    Ok(has_velocities)
}

/// Empty cells and `NaN` mean the value is missing.
fn parse_cell(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    Ok(cell.parse::<f64>()?)
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: u64,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "start_frameID")]
    start_frame: u64,
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            team: row.team,
            start: Point::new(row.start_x, row.start_y),
            end: Point::new(row.end_x, row.end_y),
            start_frame: row.start_frame,
        }
    }
}

pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open events CSV: {}", path.display()))?;

    let mut events = Vec::new();
    for (row, result) in reader.deserialize::<EventRow>().enumerate() {
        let record =
            result.with_context(|| format!("Bad event at line {} of {}", row + 2, path.display()))?;
        events.push(Event::from(record));
    }
    Ok(events)
}

pub fn find_event(events: &[Event], id: u64) -> Result<&Event> {
    events
        .iter()
        .find(|e| e.id == id)
        .with_context(|| format!("Event {} not found ({} events loaded)", id, events.len()))
}

/// Headerless numeric matrix, one pitch row per line.
pub fn load_xt(path: &Path) -> Result<ThreatGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open xT CSV: {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad xT row {}", line + 1))?;
        let row = record
            .iter()
            .map(|cell| cell.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Non-numeric value in xT row {}", line + 1))?;
        rows.push(row);
    }

    let grid = ThreatGrid::new(rows)?;
    debug!("Loaded {}x{} xT grid", grid.cells_x(), grid.cells_y());
    Ok(grid)
}

/// Model settings from a YAML or JSON file (chosen by extension), or the
/// `PITCH_CONTROL_PROFILE` preset when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<ModelSettings> {
    let Some(path) = path else {
        return Ok(ModelSettings::from_env_or_default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
    let settings = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => ModelSettings::from_yaml_str(&text)?,
        Some("json") => ModelSettings::from_json_str(&text)?,
        other => bail!("Unsupported parameter file type {:?}: {}", other, path.display()),
    };
    Ok(settings)
}
