use super::grid::ThreatGrid;
use crate::config::{ModelParams, PitchDimensions};
use crate::control::{
    control_surface, resolve_control, EventRosters, OffsideOptions, PitchGrid, SurfaceOptions,
};
use crate::error::{PitchControlError, Result};
use crate::model::{AttackDirection, Event, GoalkeeperPair, Point, TeamSide, Tracking};
use crate::prep::playing_direction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An event resolved against tracking data: who attacks, which way, and
/// where the ball goes.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub rosters: EventRosters,
    pub direction: AttackDirection,
    pub target: Point,
}

impl EventContext {
    /// Rosters come from the event's start frame. The attack direction is
    /// read from the home goalkeeper at kick-off and reversed for the away
    /// side.
    pub fn resolve(
        event: &Event,
        tracking: &Tracking,
        params: &ModelParams,
        goalkeepers: &GoalkeeperPair,
        offsides: Option<&OffsideOptions>,
    ) -> Result<Self> {
        let rosters = EventRosters::resolve(event, tracking, params, goalkeepers, offsides)?;
        let home_direction = playing_direction(tracking, TeamSide::Home)?;
        let direction = match rosters.possession {
            TeamSide::Home => home_direction,
            TeamSide::Away => home_direction.reversed(),
        };

        Ok(Self { rosters, direction, target: event.end })
    }

    pub fn start(&self) -> Point {
        self.rosters.ball_start
    }

    /// Attacking control at `location` for a ball played from the event start.
    pub fn control_at(&self, location: &Point, params: &ModelParams) -> Result<f64> {
        let outcome = resolve_control(
            location,
            &self.rosters.attackers,
            &self.rosters.defenders,
            Some(&self.rosters.ball_start),
            params,
        )?;
        Ok(outcome.attacking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    /// Control-weighted xT at the target minus the same at the start
    pub value_added: f64,
    /// Raw xT change, ignoring control
    pub xt_difference: f64,
    pub control_start: f64,
    pub control_target: f64,
    pub xt_start: f64,
    pub xt_target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestTarget {
    pub value_added: f64,
    pub location: Point,
}

/// Expected threat added by playing the ball from the event start to its end.
pub fn action_value_added(
    context: &EventContext,
    xt: &ThreatGrid,
    params: &ModelParams,
    pitch: &PitchDimensions,
) -> Result<ActionValue> {
    pitch.validate()?;
    let start = context.start();
    let control_start = context.control_at(&start, params)?;
    let control_target = context.control_at(&context.target, params)?;
    let xt_start = xt.value_at(&start, context.direction, pitch);
    let xt_target = xt.value_at(&context.target, context.direction, pitch);

    let value = ActionValue {
        value_added: control_target * xt_target - control_start * xt_start,
        xt_difference: xt_target - xt_start,
        control_start,
        control_target,
        xt_start,
        xt_target,
    };
    debug!(
        "Action value: {:+.4} (xT {:.4} -> {:.4}, control {:.3} -> {:.3})",
        value.value_added, xt_start, xt_target, control_start, control_target
    );
    Ok(value)
}

/// The most valuable cell the ball could have been played to.
///
/// `xt` must have the same shape as the control surface built from
/// `options` (50 x 32 for the default 105 x 68 pitch).
pub fn max_value_added_target(
    context: &EventContext,
    xt: &ThreatGrid,
    params: &ModelParams,
    options: &SurfaceOptions,
) -> Result<BestTarget> {
    let grid = PitchGrid::new(&options.pitch, options.cells_x)?;
    if grid.cells_x() != xt.cells_x() || grid.cells_y() != xt.cells_y() {
        return Err(PitchControlError::InvalidGrid {
            reason: format!(
                "xT grid is {}x{} but the control surface is {}x{}",
                xt.cells_x(),
                xt.cells_y(),
                grid.cells_x(),
                grid.cells_y()
            ),
        });
    }

    let start = context.start();
    let control_start = context.control_at(&start, params)?;
    let value_start = control_start * xt.value_at(&start, context.direction, &options.pitch);

    let surface = control_surface(&context.rosters, grid, params)?;
    let oriented = xt.oriented(context.direction);

    let (best_idx, best_value) = surface
        .attacking
        .iter()
        .zip(oriented.values())
        .map(|(control, threat)| control * threat)
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, value)| if value > best.1 { (idx, value) } else { best });

    Ok(BestTarget { value_added: best_value - value_start, location: surface.grid.centre(best_idx) })
}
