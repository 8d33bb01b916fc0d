//! Offside filter
//!
//! Attackers standing in an offside position cannot receive the ball, so they
//! are dropped before pitch control is computed.
//!
//! Coordinates are flipped into the defending team's frame, where their own
//! goal is at +x. In that frame the offside line is
//! `max(second_deepest_defender, ball, halfway) + tolerance` and any attacker
//! strictly beyond it is offside. Standing exactly on the line is onside.

use super::player::{PlayerState, Role};
use crate::config::ModelParams;
use crate::error::{PitchControlError, Result};
use crate::model::{AttackDirection, GoalkeeperPair, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsideOptions {
    /// Margin added to the line to absorb tracking jitter (m)
    pub tolerance: f64,
    /// Nominal attack direction of the defending team. Only consulted when
    /// their goalkeeper stands exactly on the halfway line.
    pub defending_direction: Option<AttackDirection>,
}

impl Default for OffsideOptions {
    fn default() -> Self {
        Self { tolerance: 0.2, defending_direction: None }
    }
}

impl OffsideOptions {
    pub fn from_params(params: &ModelParams) -> Self {
        Self { tolerance: params.offside_tolerance, defending_direction: None }
    }

    pub fn with_defending_direction(mut self, direction: AttackDirection) -> Self {
        self.defending_direction = Some(direction);
        self
    }
}

/// Offside line in the defending team's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsideLine {
    /// Sign of the x half the defending team defends (+1 or -1)
    pub defending_half: f64,
    /// Line position, tolerance included, in the defending frame
    pub line: f64,
}

impl OffsideLine {
    pub fn is_offside(&self, player: &PlayerState) -> bool {
        player.position.x * self.defending_half > self.line
    }
}

/// Locate the offside line for a defending roster.
pub fn offside_line(
    defenders: &[PlayerState],
    ball: &Point,
    goalkeepers: &GoalkeeperPair,
    options: &OffsideOptions,
) -> Result<OffsideLine> {
    let defending_side = defenders
        .first()
        .map(|p| p.id.side)
        .ok_or(PitchControlError::EmptyRoster { role: Role::Defending })?;

    let keeper_id = goalkeepers.for_side(defending_side);
    let keeper = defenders
        .iter()
        .find(|p| p.id == keeper_id)
        .ok_or(PitchControlError::GoalkeeperNotOnPitch { goalkeeper: keeper_id })?;

    let defending_half = if keeper.position.x > 0.0 {
        1.0
    } else if keeper.position.x < 0.0 {
        -1.0
    } else {
        match options.defending_direction {
            Some(direction) => direction.defended_half(),
            None => {
                return Err(PitchControlError::AmbiguousDefendingHalf {
                    side: defending_side,
                    keeper_x: keeper.position.x,
                })
            }
        }
    };

    if defenders.len() < 2 {
        return Err(PitchControlError::InsufficientDefenders { found: defenders.len() });
    }

    let mut depths: Vec<f64> = defenders.iter().map(|p| p.position.x * defending_half).collect();
    depths.sort_by(|a, b| b.total_cmp(a));
    let second_deepest = depths[1];

    // f64::max ignores a NaN ball coordinate
    let line = second_deepest.max(ball.x * defending_half).max(0.0) + options.tolerance;

    Ok(OffsideLine { defending_half, line })
}

/// Drop attackers that are in an offside position.
pub fn filter_offside(
    attackers: Vec<PlayerState>,
    defenders: &[PlayerState],
    ball: &Point,
    goalkeepers: &GoalkeeperPair,
    options: &OffsideOptions,
) -> Result<Vec<PlayerState>> {
    let line = offside_line(defenders, ball, goalkeepers, options)?;

    Ok(attackers
        .into_iter()
        .filter(|p| {
            let offside = line.is_offside(p);
            if offside {
                debug!("{} is offside (x = {:.2}, line = {:.2})", p.id, p.position.x, line.line);
            }
            !offside
        })
        .collect())
}
