//! # Expected Threat Scoring
//!
//! Combines pitch control with an expected-threat (xT) grid to score passes.
//! A pass is worth the control-weighted xT at its target minus the same at
//! its start; [`max_value_added_target`] searches the whole pitch for the
//! best option available at that instant.
//!
//! ## Usage
//! ```rust,ignore
//! let context = EventContext::resolve(&event, &tracking, &params, &gks, Some(&offsides))?;
//! let value = action_value_added(&context, &xt, &params, &pitch)?;
//! ```

mod grid;
mod value;

pub use grid::ThreatGrid;
pub use value::{action_value_added, max_value_added_target, ActionValue, BestTarget, EventContext};
