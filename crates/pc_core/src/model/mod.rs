//! Typed identifiers and tracking data shapes
//!
//! Column names like `Team_A_Player_7_x` are parsed exactly once, at the
//! loading boundary ([`ColumnKey::parse`]). Everything past that point works
//! with [`PlayerId`] and never looks at strings again.

pub mod tracking;

pub use tracking::{
    ColumnKey, Event, FrameId, PlayerSample, SampleField, TeamFrame, Tracking, TrackingFrame,
};

use crate::error::{PitchControlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pitch position or velocity in centred metric coordinates.
pub type Point = nalgebra::Vector2<f64>;

/// Home/away side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const HOME_LABEL: &'static str = "Team_A";
    pub const AWAY_LABEL: &'static str = "Team_B";

    /// Resolve a possession/team label from event data.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim() {
            Self::HOME_LABEL => Ok(TeamSide::Home),
            Self::AWAY_LABEL => Ok(TeamSide::Away),
            other => Err(PitchControlError::UnknownTeam { label: other.to_string() }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => Self::HOME_LABEL,
            TeamSide::Away => Self::AWAY_LABEL,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// Opaque player identifier: side plus shirt/tracking number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId {
    pub side: TeamSide,
    pub number: u32,
}

impl PlayerId {
    pub fn new(side: TeamSide, number: u32) -> Self {
        Self { side, number }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_Player_{}", self.side.label(), self.number)
    }
}

/// Goalkeeper identifiers for both sides, resolved before any model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalkeeperPair {
    pub home: PlayerId,
    pub away: PlayerId,
}

impl GoalkeeperPair {
    pub fn new(home: PlayerId, away: PlayerId) -> Self {
        Self { home, away }
    }

    pub fn for_side(&self, side: TeamSide) -> PlayerId {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }
}

/// Direction a team attacks in, along the pitch x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackDirection {
    LeftToRight,
    RightToLeft,
}

impl AttackDirection {
    /// +1 for left-to-right, -1 for right-to-left.
    pub fn sign(self) -> f64 {
        match self {
            AttackDirection::LeftToRight => 1.0,
            AttackDirection::RightToLeft => -1.0,
        }
    }

    /// Sign of the x half this team defends (its own goal).
    pub fn defended_half(self) -> f64 {
        -self.sign()
    }

    pub fn reversed(self) -> Self {
        match self {
            AttackDirection::LeftToRight => AttackDirection::RightToLeft,
            AttackDirection::RightToLeft => AttackDirection::LeftToRight,
        }
    }
}
