//! # Model Configuration
//!
//! Raw, serde-loadable knobs live in [`ModelSettings`]. They are validated and
//! turned into the immutable [`ModelParams`] the model reads, which also
//! carries the derived ball-control rates and shortcut thresholds.
//!
//! ## Usage
//! ```rust
//! use pc_core::config::{ModelParams, ModelSettings};
//!
//! let params = ModelParams::default();
//! let paper = ModelParams::from_settings(&ModelSettings::paper()).unwrap();
//! assert!(paper.lambda_def > params.lambda_def);
//! ```
//!
//! ## Environment Variables
//!
//! - `PITCH_CONTROL_PROFILE`: Select preset (`paper`, anything else = standard)

mod model_params;
mod pitch;

pub use model_params::{ModelParams, ModelSettings};
pub use pitch::PitchDimensions;
