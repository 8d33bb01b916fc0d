//! # pc_core - Physics-Based Pitch Control Model
//!
//! Estimates, for any point on a football pitch, the probability that the
//! team in possession would win the ball if it were played there now. Built
//! on player interception times and a time-integrated ball-control race
//! between the two teams.
//!
//! ## Features
//! - Per-point control with early-exit shortcuts and per-player shares
//! - Offside-aware attacking rosters
//! - Full-pitch surfaces evaluated in parallel (rayon)
//! - Expected-threat (xT) pass scoring on top of the surface
//!
//! ## Usage
//! ```rust,ignore
//! use pc_core::{prep, ModelParams, SurfaceOptions};
//!
//! prep::recentre(&mut tracking, pitch);
//! prep::compute_velocities(&mut tracking, Some(prep::MAX_PLAUSIBLE_SPEED));
//! let gks = prep::find_goalkeepers(&tracking)?;
//! let surface = pc_core::generate_pitch_control_for_event(
//!     &event, &tracking, &ModelParams::default(), &gks, &SurfaceOptions::default(),
//! )?;
//! ```

// Model entry points carry rosters, params and options side by side
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod control;
pub mod error;
pub mod model;
pub mod prep;
pub mod threat;

pub use config::{ModelParams, ModelSettings, PitchDimensions};
pub use control::{
    control_at_target, generate_pitch_control_for_event, ControlOutcome, ControlSurface,
    EventRosters, OffsideOptions, PlayerState, Resolution, SurfaceOptions,
};
pub use error::{ErrorKind, PitchControlError, Result};
pub use model::{
    AttackDirection, Event, GoalkeeperPair, PlayerId, Point, TeamSide, Tracking, TrackingFrame,
};
pub use threat::{action_value_added, max_value_added_target, EventContext, ThreatGrid};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
