//! Player kinematics and the interception-time model
//!
//! A player keeps moving at their current velocity for `reaction_time`
//! seconds, then sprints straight at the target at `max_speed`. Arrival is
//! uncertain: the probability of having arrived by time T is a logistic curve
//! centred on that interception time.

use crate::config::ModelParams;
use crate::model::{PlayerId, PlayerSample, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which side of the ball a roster is on for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Attacking,
    Defending,
}

/// Immutable kinematic snapshot of one on-pitch player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub is_goalkeeper: bool,
    pub position: Point,
    pub velocity: Point,
    /// Ball-control rate when this player's team attacks
    pub lambda_att: f64,
    /// Ball-control rate when defending (goalkeeper rate for keepers)
    pub lambda_def: f64,
    pub max_speed: f64,
    pub reaction_time: f64,
    pub tti_sigma: f64,
}

impl PlayerState {
    /// Build from a tracking sample. Returns `None` for off-frame players
    /// (NaN position). A missing velocity is treated as standing still.
    pub fn from_sample(
        id: PlayerId,
        sample: &PlayerSample,
        params: &ModelParams,
        is_goalkeeper: bool,
    ) -> Option<Self> {
        let position = sample.position()?;
        Some(Self {
            id,
            is_goalkeeper,
            position,
            velocity: sample.velocity(),
            lambda_att: params.lambda_att,
            lambda_def: if is_goalkeeper { params.lambda_gk } else { params.lambda_def },
            max_speed: params.max_player_speed,
            reaction_time: params.reaction_time,
            tti_sigma: params.tti_sigma,
        })
    }

    /// Ball-control rate for the role this player's team has in the evaluation.
    pub fn control_rate(&self, role: Role) -> f64 {
        match role {
            Role::Attacking => self.lambda_att,
            Role::Defending => self.lambda_def,
        }
    }

    /// Expected time (s) to reach `target`.
    pub fn time_to_intercept(&self, target: &Point) -> f64 {
        let reaction_end = self.position + self.velocity * self.reaction_time;
        self.reaction_time + (target - reaction_end).norm() / self.max_speed
    }

    /// Probability the player has reached a point by time `t`, given their
    /// interception time for that point.
    pub fn probability_arrive_by(&self, t: f64, time_to_intercept: f64) -> f64 {
        let scale = PI / (3f64.sqrt() * self.tti_sigma);
        1.0 / (1.0 + (-scale * (t - time_to_intercept)).exp())
    }
}

/// A player's stake in one control evaluation: cached interception time plus
/// the control probability accumulated so far.
///
/// Lives for exactly one solver call. Nothing here is written back to
/// [`PlayerState`], so grid cells never see each other's accumulation.
#[derive(Debug, Clone)]
pub struct Contender<'a> {
    pub player: &'a PlayerState,
    pub time_to_intercept: f64,
    pub rate: f64,
    pub control: f64,
}

impl<'a> Contender<'a> {
    pub fn new(player: &'a PlayerState, target: &Point, role: Role) -> Self {
        Self {
            player,
            time_to_intercept: player.time_to_intercept(target),
            rate: player.control_rate(role),
            control: 0.0,
        }
    }

    pub fn probability_arrive_by(&self, t: f64) -> f64 {
        self.player.probability_arrive_by(t, self.time_to_intercept)
    }
}
