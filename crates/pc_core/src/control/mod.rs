//! Pitch control model
//!
//! - `player`: per-player interception time and arrival probability
//! - `roster`: attacking/defending rosters for an event
//! - `offside`: offside line and attacker filter
//! - `solver`: control probability at one target point
//! - `surface`: control over the whole pitch mesh

pub mod offside;
pub mod player;
pub mod roster;
pub mod solver;
pub mod surface;

pub use offside::{filter_offside, offside_line, OffsideLine, OffsideOptions};
pub use player::{Contender, PlayerState, Role};
pub use roster::{assemble_team, EventRosters};
pub use solver::{
    ball_travel_time, control_at_target, resolve_control, ControlOutcome, PlayerControl,
    Resolution,
};
pub use surface::{
    control_surface, generate_pitch_control_for_event, ControlSurface, PitchGrid, SurfaceOptions,
};
