//! Roster assembly
//!
//! Turns tracking rows into the attacking/defending [`PlayerState`] lists for
//! one event. Rosters are rebuilt for every (event, frame) and never cached.

use super::offside::{filter_offside, OffsideOptions};
use super::player::PlayerState;
use crate::config::ModelParams;
use crate::error::Result;
use crate::model::{Event, GoalkeeperPair, PlayerId, Point, TeamFrame, TeamSide, Tracking};
use tracing::debug;

/// On-pitch players of one team at one frame, ordered by player id.
///
/// Players with a missing position are off-frame and left out. An empty
/// result is valid and means no players of this team are on the pitch.
pub fn assemble_team(
    frame: &TeamFrame,
    params: &ModelParams,
    goalkeeper: PlayerId,
) -> Vec<PlayerState> {
    frame
        .players
        .iter()
        .filter(|(id, _)| id.side == frame.side)
        .filter_map(|(id, sample)| PlayerState::from_sample(*id, sample, params, *id == goalkeeper))
        .collect()
}

/// Both rosters for an event, after the optional offside filter.
#[derive(Debug, Clone)]
pub struct EventRosters {
    pub possession: TeamSide,
    pub attackers: Vec<PlayerState>,
    pub defenders: Vec<PlayerState>,
    pub ball_start: Point,
}

impl EventRosters {
    pub fn resolve(
        event: &Event,
        tracking: &Tracking,
        params: &ModelParams,
        goalkeepers: &GoalkeeperPair,
        offsides: Option<&OffsideOptions>,
    ) -> Result<Self> {
        let possession = event.possession()?;
        let frame = tracking.frame(event.start_frame)?;

        let mut attackers =
            assemble_team(frame.team(possession), params, goalkeepers.for_side(possession));
        let defenders = assemble_team(
            frame.team(possession.opponent()),
            params,
            goalkeepers.for_side(possession.opponent()),
        );

        if let Some(options) = offsides {
            attackers = filter_offside(attackers, &defenders, &event.start, goalkeepers, options)?;
        }

        debug!(
            "Event {} at frame {}: {} attacking ({}), {} defending",
            event.id,
            event.start_frame,
            attackers.len(),
            possession.label(),
            defenders.len()
        );

        Ok(Self { possession, attackers, defenders, ball_start: event.start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PitchControlError;
    use crate::model::{PlayerSample, TrackingFrame};

    fn home_frame() -> TeamFrame {
        TeamFrame::new(TeamSide::Home)
            .with_player(1, PlayerSample::stationary(-50.0, 0.0))
            .with_player(4, PlayerSample::new(-20.0, 5.0, f64::NAN, f64::NAN))
            .with_player(9, PlayerSample::stationary(f64::NAN, f64::NAN))
    }

    #[test]
    fn test_assemble_skips_off_frame_players() {
        let params = ModelParams::default();
        let roster = assemble_team(&home_frame(), &params, PlayerId::new(TeamSide::Home, 1));

        assert_eq!(roster.len(), 2);
        assert!(roster[0].is_goalkeeper);
        assert_eq!(roster[0].lambda_def, params.lambda_gk);
        assert!(!roster[1].is_goalkeeper);
        assert_eq!(roster[1].velocity, Point::zeros());
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let params = ModelParams::default();
        let keeper = PlayerId::new(TeamSide::Home, 1);
        assert_eq!(
            assemble_team(&home_frame(), &params, keeper),
            assemble_team(&home_frame(), &params, keeper)
        );
    }

    #[test]
    fn test_empty_frame_gives_empty_roster() {
        let frame = TeamFrame::new(TeamSide::Away);
        let roster =
            assemble_team(&frame, &ModelParams::default(), PlayerId::new(TeamSide::Away, 1));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_resolve_rejects_unknown_team() {
        let mut tracking = Tracking::new();
        tracking.insert(TrackingFrame::new(5, 1, 0.2));
        let event = Event {
            id: 1,
            team: "Team_X".to_string(),
            start: Point::zeros(),
            end: Point::new(10.0, 0.0),
            start_frame: 5,
        };
        let gks = GoalkeeperPair::new(
            PlayerId::new(TeamSide::Home, 1),
            PlayerId::new(TeamSide::Away, 1),
        );

        let err = EventRosters::resolve(&event, &tracking, &ModelParams::default(), &gks, None)
            .unwrap_err();
        assert!(matches!(err, PitchControlError::UnknownTeam { .. }));
    }

    #[test]
    fn test_resolve_away_possession() {
        let mut frame = TrackingFrame::new(5, 1, 0.2);
        frame.home = home_frame();
        frame.away = TeamFrame::new(TeamSide::Away)
            .with_player(1, PlayerSample::stationary(50.0, 0.0))
            .with_player(10, PlayerSample::stationary(10.0, 0.0));
        let mut tracking = Tracking::new();
        tracking.insert(frame);

        let event = Event {
            id: 7,
            team: "Team_B".to_string(),
            start: Point::new(10.0, 0.0),
            end: Point::new(-10.0, 0.0),
            start_frame: 5,
        };
        let gks = GoalkeeperPair::new(
            PlayerId::new(TeamSide::Home, 1),
            PlayerId::new(TeamSide::Away, 1),
        );

        let rosters =
            EventRosters::resolve(&event, &tracking, &ModelParams::default(), &gks, None).unwrap();
        assert_eq!(rosters.possession, TeamSide::Away);
        assert!(rosters.attackers.iter().all(|p| p.id.side == TeamSide::Away));
        assert!(rosters.defenders.iter().all(|p| p.id.side == TeamSide::Home));
        assert_eq!(rosters.defenders.len(), 2);
    }
}
