use anyhow::{Context, Result};
use chrono::Utc;
use pc_core::ControlSurface;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// JSON form of a control surface. `attacking[row][col]` is the control at
/// `(x[col], y[row])`.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceReport {
    pub event_id: u64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub attacking: Vec<Vec<f64>>,
    pub checksum: f64,
    pub unconverged_cells: usize,
    /// RFC3339
    pub generated_at: String,
}

impl SurfaceReport {
    pub fn new(event_id: u64, surface: &ControlSurface) -> Self {
        Self {
            event_id,
            x: surface.grid.x.clone(),
            y: surface.grid.y.clone(),
            attacking: surface.rows().map(<[f64]>::to_vec).collect(),
            checksum: surface.checksum,
            unconverged_cells: surface.unconverged_cells,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Pretty JSON to `out`, or stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
