use crate::control::Role;
use crate::model::{PlayerId, TeamSide};
use thiserror::Error;

/// Broad classification of a [`PitchControlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad inputs or parameters. Fix the call, not the model.
    Configuration,
    /// The post-grid checksum fell outside tolerance.
    ModelDivergence,
    /// A probability increment went negative. Indicates a bug or a
    /// violated model precondition.
    NumericInvariant,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PitchControlError {
    #[error("Unknown team label: {label} (expected Team_A or Team_B)")]
    UnknownTeam { label: String },

    #[error("Defending goalkeeper {goalkeeper} is not on the pitch")]
    GoalkeeperNotOnPitch { goalkeeper: PlayerId },

    #[error("{role:?} roster is empty")]
    EmptyRoster { role: Role },

    #[error("No goalkeeper found for {side:?}: no player tracked in the first frame")]
    NoGoalkeeper { side: TeamSide },

    #[error("Offside line needs at least two defenders, found {found}")]
    InsufficientDefenders { found: usize },

    #[error("Cannot tell which half {side:?} defends: goalkeeper x = {keeper_x}")]
    AmbiguousDefendingHalf { side: TeamSide, keeper_x: f64 },

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Frame {frame_id} not found in tracking data")]
    MissingFrame { frame_id: u64 },

    #[error("Invalid column name: {column}")]
    InvalidColumn { column: String },

    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("Checksum failed: mean control {checksum:.4} is not within {tolerance} of 1")]
    ModelDivergence { checksum: f64, tolerance: f64 },

    #[error("Negative control increment {value:e} for {player} at T = {time:.3}s")]
    NegativeContribution { player: PlayerId, value: f64, time: f64 },

    #[error("Settings parse error: {0}")]
    Settings(String),
}

impl PitchControlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PitchControlError::ModelDivergence { .. } => ErrorKind::ModelDivergence,
            PitchControlError::NegativeContribution { .. } => ErrorKind::NumericInvariant,
            _ => ErrorKind::Configuration,
        }
    }
}

impl From<serde_json::Error> for PitchControlError {
    fn from(err: serde_json::Error) -> Self {
        PitchControlError::Settings(err.to_string())
    }
}

impl From<serde_yaml::Error> for PitchControlError {
    fn from(err: serde_yaml::Error) -> Self {
        PitchControlError::Settings(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PitchControlError>;
