//! Pitch Control CLI
//!
//! Pitch control surfaces and xT pass scoring from CSV tracking data.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: log filter (default `info`; `--verbose` forces `debug`)
//! - `PITCH_CONTROL_PROFILE`: parameter preset when `--params` is not given

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pc_cli::{load_xt, write_json, Session, SessionConfig, SurfaceReport};
use pc_core::generate_pitch_control_for_event;
use pc_core::threat::{action_value_added, max_value_added_target, EventContext};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pitch_control")]
#[command(about = "Pitch control surfaces and expected-threat pass scoring", long_about = None)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EventArgs {
    /// Home team tracking CSV
    #[arg(long)]
    home: PathBuf,

    /// Away team tracking CSV
    #[arg(long)]
    away: PathBuf,

    /// Events CSV
    #[arg(long)]
    events: PathBuf,

    /// Event id to evaluate
    #[arg(long)]
    event: u64,

    /// Model parameter file (.yaml or .json)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Shift raw 0..105 x 0..68 coordinates to the centre spot
    #[arg(long, default_value = "false")]
    recentre: bool,

    /// Keep offside attackers
    #[arg(long, default_value = "false")]
    no_offsides: bool,

    /// Grid columns along the pitch length
    #[arg(long, default_value = "50")]
    cells_x: usize,

    /// Output JSON file (stdout if omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

impl EventArgs {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            home: self.home.clone(),
            away: self.away.clone(),
            events: self.events.clone(),
            event_id: self.event,
            params: self.params.clone(),
            recentre: self.recentre,
            offsides: !self.no_offsides,
            cells_x: self.cells_x,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Pitch control surface at the moment of an event
    Surface {
        #[command(flatten)]
        input: EventArgs,
    },

    /// Expected threat added by the pass in an event
    ValueAdded {
        #[command(flatten)]
        input: EventArgs,

        /// xT grid CSV (headerless, rows of the pitch)
        #[arg(long)]
        xt: PathBuf,
    },

    /// Best available pass target at the moment of an event
    BestTarget {
        #[command(flatten)]
        input: EventArgs,

        /// xT grid CSV (headerless, rows of the pitch)
        #[arg(long)]
        xt: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Surface { input } => {
            let session = Session::load(&input.session_config())?;
            let surface = generate_pitch_control_for_event(
                &session.event,
                &session.tracking,
                &session.params,
                &session.goalkeepers,
                &session.options,
            )?;
            info!(
                "Surface {}x{}, checksum {:.4}",
                surface.grid.cells_x(),
                surface.grid.cells_y(),
                surface.checksum
            );
            write_json(&SurfaceReport::new(session.event.id, &surface), input.out.as_deref())?;
        }

        Commands::ValueAdded { input, xt } => {
            let session = Session::load(&input.session_config())?;
            let xt = load_xt(&xt)?;
            let context = event_context(&session)?;
            let value = action_value_added(&context, &xt, &session.params, &session.options.pitch)?;
            info!("Value added {:+.4} (xT difference {:+.4})", value.value_added, value.xt_difference);
            write_json(&value, input.out.as_deref())?;
        }

        Commands::BestTarget { input, xt } => {
            let session = Session::load(&input.session_config())?;
            let xt = load_xt(&xt)?;
            let context = event_context(&session)?;
            let best = max_value_added_target(&context, &xt, &session.params, &session.options)?;
            info!(
                "Best target ({:.1}, {:.1}), value added {:+.4}",
                best.location.x, best.location.y, best.value_added
            );
            write_json(&best, input.out.as_deref())?;
        }
    }

    Ok(())
}

fn event_context(session: &Session) -> Result<EventContext> {
    let offsides = session.options.offside_options(&session.params);
    Ok(EventContext::resolve(
        &session.event,
        &session.tracking,
        &session.params,
        &session.goalkeepers,
        offsides.as_ref(),
    )?)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
