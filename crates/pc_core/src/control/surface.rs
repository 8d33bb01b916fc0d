//! Full-pitch control surface for one event
//!
//! The pitch is cut into a regular mesh of cell centres and the solver runs
//! once per cell. Cells share only the read-only rosters and parameters, so
//! they are evaluated in parallel with rayon; results are identical to a
//! sequential run because every cell is independent.

use super::offside::OffsideOptions;
use super::roster::EventRosters;
use super::solver::{resolve_control, ControlOutcome};
use crate::config::{ModelParams, PitchDimensions};
use crate::error::{PitchControlError, Result};
use crate::model::{AttackDirection, Event, GoalkeeperPair, Point, Tracking};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cell-centre axes of a regular pitch mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PitchGrid {
    /// `cells_x` columns along the length; rows follow the pitch aspect ratio.
    pub fn new(pitch: &PitchDimensions, cells_x: usize) -> Result<Self> {
        pitch.validate()?;
        if cells_x == 0 {
            return Err(PitchControlError::InvalidGrid {
                reason: "at least one column is required".to_string(),
            });
        }
        let cells_y = (cells_x as f64 * pitch.width / pitch.length).round() as usize;
        if cells_y == 0 {
            return Err(PitchControlError::InvalidGrid {
                reason: format!("{} columns leave no rows for a {}x{} pitch", cells_x, pitch.length, pitch.width),
            });
        }

        Ok(Self { x: centres(pitch.length, cells_x), y: centres(pitch.width, cells_y) })
    }

    pub fn cells_x(&self) -> usize {
        self.x.len()
    }

    pub fn cells_y(&self) -> usize {
        self.y.len()
    }

    pub fn len(&self) -> usize {
        self.x.len() * self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Centre of the cell at row-major index `idx`.
    pub fn centre(&self, idx: usize) -> Point {
        Point::new(self.x[idx % self.cells_x()], self.y[idx / self.cells_x()])
    }
}

fn centres(extent: f64, cells: usize) -> Vec<f64> {
    let step = extent / cells as f64;
    (0..cells).map(|i| i as f64 * step - extent / 2.0 + step / 2.0).collect()
}

/// Surface generation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOptions {
    pub pitch: PitchDimensions,
    pub cells_x: usize,
    /// Drop offside attackers before evaluating
    pub offsides: bool,
    /// Fallback for a defending keeper on the halfway line
    pub defending_direction: Option<AttackDirection>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            pitch: PitchDimensions::default(),
            cells_x: 50,
            offsides: true,
            defending_direction: None,
        }
    }
}

impl SurfaceOptions {
    pub fn offside_options(&self, params: &ModelParams) -> Option<OffsideOptions> {
        if !self.offsides {
            return None;
        }
        let options = OffsideOptions::from_params(params);
        Some(match self.defending_direction {
            Some(direction) => options.with_defending_direction(direction),
            None => options,
        })
    }
}

/// Attacking control probability over the pitch mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub grid: PitchGrid,
    /// Row-major (`cells_y` rows of `cells_x`), row 0 at the lowest y
    pub attacking: Vec<f64>,
    /// Mean of attacking + defending over all cells
    pub checksum: f64,
    pub unconverged_cells: usize,
}

impl ControlSurface {
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.attacking[row * self.grid.cells_x() + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.attacking.chunks(self.grid.cells_x())
    }
}

/// Evaluate control for every cell of `grid` given fixed rosters.
///
/// Fails with `ModelDivergence` when the mean claimed probability falls
/// more than `model_converge_tol` short of 1.
pub fn control_surface(
    rosters: &EventRosters,
    grid: PitchGrid,
    params: &ModelParams,
) -> Result<ControlSurface> {
    let outcomes: Vec<ControlOutcome> = (0..grid.len())
        .into_par_iter()
        .map(|idx| {
            resolve_control(
                &grid.centre(idx),
                &rosters.attackers,
                &rosters.defenders,
                Some(&rosters.ball_start),
                params,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let checksum = outcomes.iter().map(ControlOutcome::total).sum::<f64>() / outcomes.len() as f64;
    if 1.0 - checksum >= params.model_converge_tol {
        return Err(PitchControlError::ModelDivergence {
            checksum,
            tolerance: params.model_converge_tol,
        });
    }

    let unconverged_cells = outcomes.iter().filter(|o| !o.converged()).count();
    if unconverged_cells > 0 {
        warn!("{} of {} cells did not converge", unconverged_cells, outcomes.len());
    }

    Ok(ControlSurface {
        attacking: outcomes.iter().map(|o| o.attacking).collect(),
        grid,
        checksum,
        unconverged_cells,
    })
}

/// Pitch control surface at the moment of `event`.
pub fn generate_pitch_control_for_event(
    event: &Event,
    tracking: &Tracking,
    params: &ModelParams,
    goalkeepers: &GoalkeeperPair,
    options: &SurfaceOptions,
) -> Result<ControlSurface> {
    let grid = PitchGrid::new(&options.pitch, options.cells_x)?;
    let offsides = options.offside_options(params);
    let rosters = EventRosters::resolve(event, tracking, params, goalkeepers, offsides.as_ref())?;

    debug!(
        "Event {}: evaluating {}x{} grid from ball at ({:.1}, {:.1})",
        event.id,
        grid.cells_x(),
        grid.cells_y(),
        rosters.ball_start.x,
        rosters.ball_start.y
    );

    control_surface(&rosters, grid, params)
}
