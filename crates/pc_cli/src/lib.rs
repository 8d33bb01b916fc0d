//! Pitch Control CLI library
//!
//! CSV tracking/events/xT → pitch control surfaces and pass scores as JSON.

pub mod loader;
pub mod report;

use anyhow::{Context, Result};
use pc_core::model::{Event, GoalkeeperPair, Tracking};
use pc_core::{prep, ModelParams, PitchDimensions, SurfaceOptions};
use std::path::PathBuf;
use tracing::{debug, info};

pub use loader::{find_event, load_events, load_settings, load_tracking, load_xt, TrackingData};
pub use report::{write_json, SurfaceReport};

/// Input files and switches shared by every subcommand.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub home: PathBuf,
    pub away: PathBuf,
    pub events: PathBuf,
    pub event_id: u64,
    pub params: Option<PathBuf>,
    /// Raw coordinates run 0..L x 0..W and need shifting to the centre spot
    pub recentre: bool,
    pub offsides: bool,
    pub cells_x: usize,
}

/// Everything the model needs for one event, loaded and prepared.
#[derive(Debug, Clone)]
pub struct Session {
    pub tracking: Tracking,
    pub event: Event,
    pub params: ModelParams,
    pub goalkeepers: GoalkeeperPair,
    pub options: SurfaceOptions,
}

impl Session {
    pub fn load(config: &SessionConfig) -> Result<Self> {
        let settings = load_settings(config.params.as_deref())?;
        let params = ModelParams::from_settings(&settings).context("Invalid model parameters")?;

        let TrackingData { mut tracking, has_velocities } =
            load_tracking(&config.home, &config.away)?;
        let pitch = PitchDimensions::default();
        if config.recentre {
            prep::recentre(&mut tracking, pitch);
        }
        if !has_velocities {
            debug!("No velocity columns, estimating from positions");
            prep::compute_velocities(&mut tracking, Some(prep::MAX_PLAUSIBLE_SPEED));
        }

        let events = load_events(&config.events)?;
        let mut event = find_event(&events, config.event_id)?.clone();
        if config.recentre {
            prep::recentre_event(&mut event, pitch);
        }
        let goalkeepers = prep::find_goalkeepers(&tracking)?;

        // Nominal direction of the defending team, used if their keeper is on halfway
        let defending_direction = prep::playing_direction(&tracking, event.possession()?.opponent()).ok();

        let options = SurfaceOptions {
            pitch,
            cells_x: config.cells_x,
            offsides: config.offsides,
            defending_direction,
        };

        info!(
            "Event {} ({}) at frame {}, goalkeepers {} / {}",
            event.id, event.team, event.start_frame, goalkeepers.home, goalkeepers.away
        );
        Ok(Self { tracking, event, params, goalkeepers, options })
    }
}
