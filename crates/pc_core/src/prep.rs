//! Tracking data preparation
//!
//! Run once after loading, before any model call:
//!
//! 1. [`recentre`] raw `0..L` x `0..W` coordinates onto the centre spot,
//!    and [`recentre_event`] for every event read from the same feed
//! 2. [`compute_velocities`] when the feed carries positions only
//! 3. [`find_goalkeepers`] and [`playing_direction`] from the first frame

use crate::config::PitchDimensions;
use crate::error::{PitchControlError, Result};
use crate::model::{AttackDirection, Event, GoalkeeperPair, PlayerId, Point, TeamSide, Tracking};
use std::collections::BTreeMap;
use tracing::debug;

/// Speeds above this (m/s) are tracking glitches, not sprints.
pub const MAX_PLAUSIBLE_SPEED: f64 = 12.0;

/// Shift every coordinate so the centre spot is the origin.
pub fn recentre(tracking: &mut Tracking, pitch: PitchDimensions) {
    let shift = Point::new(pitch.half_length(), pitch.half_width());

    for frame in tracking.frames.values_mut() {
        if let Some(ball) = frame.ball.as_mut() {
            *ball -= shift;
        }
        for team in [&mut frame.home, &mut frame.away] {
            for sample in team.players.values_mut() {
                sample.x -= shift.x;
                sample.y -= shift.y;
            }
        }
    }
}

/// Shift an event's start and end points onto the centre spot. Must be
/// applied whenever the tracking it refers to was recentred.
pub fn recentre_event(event: &mut Event, pitch: PitchDimensions) {
    let shift = Point::new(pitch.half_length(), pitch.half_width());
    event.start -= shift;
    event.end -= shift;
}

/// Fill player velocities by backward difference between consecutive frames.
///
/// The first frame of each period gets NaN velocities, as does any player
/// missing from either frame. With `max_speed` set, faster estimates are
/// discarded (NaN) as tracking errors.
pub fn compute_velocities(tracking: &mut Tracking, max_speed: Option<f64>) {
    let mut previous: Option<(u8, f64, BTreeMap<PlayerId, Point>)> = None;
    let mut discarded = 0usize;

    for frame in tracking.frames.values_mut() {
        let dt = match &previous {
            Some((period, time_s, _)) if *period == frame.period => frame.time_s - time_s,
            _ => f64::NAN,
        };

        let mut positions = BTreeMap::new();
        for team in [&mut frame.home, &mut frame.away] {
            for (id, sample) in team.players.iter_mut() {
                let last = previous.as_ref().and_then(|(_, _, prev)| prev.get(id));
                let (vx, vy) = match last {
                    Some(last) if dt > 0.0 => ((sample.x - last.x) / dt, (sample.y - last.y) / dt),
                    _ => (f64::NAN, f64::NAN),
                };

                let too_fast = max_speed.map_or(false, |max| vx.hypot(vy) > max);
                if too_fast {
                    discarded += 1;
                }
                sample.vx = if too_fast { f64::NAN } else { vx };
                sample.vy = if too_fast { f64::NAN } else { vy };

                positions.insert(*id, Point::new(sample.x, sample.y));
            }
        }

        previous = Some((frame.period, frame.time_s, positions));
    }

    if discarded > 0 {
        debug!("Discarded {} implausible velocity samples", discarded);
    }
}

/// The player furthest from the halfway line at kick-off.
pub fn find_goalkeeper(tracking: &Tracking, side: TeamSide) -> Option<PlayerId> {
    let frame = tracking.first_frame()?;
    frame
        .team(side)
        .players
        .iter()
        .filter(|(_, sample)| !sample.x.is_nan())
        .max_by(|(_, a), (_, b)| a.x.abs().total_cmp(&b.x.abs()))
        .map(|(id, _)| *id)
}

pub fn find_goalkeepers(tracking: &Tracking) -> Result<GoalkeeperPair> {
    let home = find_goalkeeper(tracking, TeamSide::Home)
        .ok_or(PitchControlError::NoGoalkeeper { side: TeamSide::Home })?;
    let away = find_goalkeeper(tracking, TeamSide::Away)
        .ok_or(PitchControlError::NoGoalkeeper { side: TeamSide::Away })?;

    debug!("Goalkeepers: {} / {}", home, away);
    Ok(GoalkeeperPair::new(home, away))
}

/// Direction `side` attacks in during the first period: away from the half
/// its goalkeeper starts in.
pub fn playing_direction(tracking: &Tracking, side: TeamSide) -> Result<AttackDirection> {
    let keeper = find_goalkeeper(tracking, side).ok_or(PitchControlError::NoGoalkeeper { side })?;
    let keeper_x = tracking
        .first_frame()
        .and_then(|frame| frame.team(side).get(keeper))
        .map_or(f64::NAN, |sample| sample.x);

    if keeper_x < 0.0 {
        Ok(AttackDirection::LeftToRight)
    } else if keeper_x > 0.0 {
        Ok(AttackDirection::RightToLeft)
    } else {
        Err(PitchControlError::AmbiguousDefendingHalf { side, keeper_x })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerSample, TeamFrame, TrackingFrame};

    fn frame(frame_id: u64, period: u8, time_s: f64, home_x: f64) -> TrackingFrame {
        let mut frame = TrackingFrame::new(frame_id, period, time_s);
        frame.home = TeamFrame::new(TeamSide::Home)
            .with_player(1, PlayerSample::new(5.0, 34.0, f64::NAN, f64::NAN))
            .with_player(7, PlayerSample::new(home_x, 30.0, f64::NAN, f64::NAN));
        frame.away = TeamFrame::new(TeamSide::Away)
            .with_player(1, PlayerSample::new(100.0, 34.0, f64::NAN, f64::NAN))
            .with_player(9, PlayerSample::new(60.0, 20.0, f64::NAN, f64::NAN));
        frame
    }

    #[test]
    fn test_recentre() {
        let mut tracking = Tracking::new();
        let mut first = frame(1, 1, 0.0, 52.5);
        first.ball = Some(Point::new(52.5, 34.0));
        tracking.insert(first);

        recentre(&mut tracking, PitchDimensions::default());

        let frame = tracking.frame(1).unwrap();
        assert_eq!(frame.ball, Some(Point::zeros()));
        let winger = frame.home.get(PlayerId::new(TeamSide::Home, 7)).unwrap();
        assert_eq!((winger.x, winger.y), (0.0, -4.0));
    }

    #[test]
    fn test_recentre_event() {
        let mut event = Event {
            id: 3,
            team: "Team_A".to_string(),
            start: Point::new(60.0, 34.0),
            end: Point::new(105.0, 0.0),
            start_frame: 1,
        };
        recentre_event(&mut event, PitchDimensions::default());

        assert_eq!(event.start, Point::new(7.5, 0.0));
        assert_eq!(event.end, Point::new(52.5, -34.0));
    }

    #[test]
    fn test_velocities_by_backward_difference() {
        let mut tracking = Tracking::new();
        tracking.insert(frame(1, 1, 0.00, 40.0));
        tracking.insert(frame(2, 1, 0.04, 40.2));
        tracking.insert(frame(3, 2, 0.08, 40.4));
        compute_velocities(&mut tracking, None);

        let winger = PlayerId::new(TeamSide::Home, 7);
        let first = tracking.frame(1).unwrap().home.get(winger).unwrap();
        assert!(first.vx.is_nan());

        let second = tracking.frame(2).unwrap().home.get(winger).unwrap();
        assert!((second.vx - 5.0).abs() < 1e-9);
        assert_eq!(second.vy, 0.0);

        // New period restarts the difference
        let third = tracking.frame(3).unwrap().home.get(winger).unwrap();
        assert!(third.vx.is_nan());
    }

    #[test]
    fn test_implausible_speed_is_dropped() {
        let mut tracking = Tracking::new();
        tracking.insert(frame(1, 1, 0.00, 40.0));
        tracking.insert(frame(2, 1, 0.04, 41.0));
        compute_velocities(&mut tracking, Some(MAX_PLAUSIBLE_SPEED));

        let winger = tracking.frame(2).unwrap().home.get(PlayerId::new(TeamSide::Home, 7)).unwrap();
        assert!(winger.vx.is_nan() && winger.vy.is_nan());

        let keeper = tracking.frame(2).unwrap().home.get(PlayerId::new(TeamSide::Home, 1)).unwrap();
        assert_eq!(keeper.vx, 0.0);
    }

    #[test]
    fn test_goalkeepers_and_direction() {
        let mut tracking = Tracking::new();
        tracking.insert(frame(1, 1, 0.0, 40.0));
        recentre(&mut tracking, PitchDimensions::default());

        let gks = find_goalkeepers(&tracking).unwrap();
        assert_eq!(gks.home, PlayerId::new(TeamSide::Home, 1));
        assert_eq!(gks.away, PlayerId::new(TeamSide::Away, 1));

        assert_eq!(playing_direction(&tracking, TeamSide::Home).unwrap(), AttackDirection::LeftToRight);
        assert_eq!(playing_direction(&tracking, TeamSide::Away).unwrap(), AttackDirection::RightToLeft);
    }

    #[test]
    fn test_goalkeeper_on_halfway_line() {
        let mut first = TrackingFrame::new(1, 1, 0.0);
        first.home = TeamFrame::new(TeamSide::Home).with_player(1, PlayerSample::stationary(0.0, 0.0));
        let mut tracking = Tracking::new();
        tracking.insert(first);

        let err = playing_direction(&tracking, TeamSide::Home).unwrap_err();
        assert!(matches!(err, PitchControlError::AmbiguousDefendingHalf { .. }));

        let err = find_goalkeepers(&tracking).unwrap_err();
        assert_eq!(err, PitchControlError::NoGoalkeeper { side: TeamSide::Away });
    }

    #[test]
    fn test_empty_tracking_has_no_goalkeeper() {
        assert_eq!(find_goalkeeper(&Tracking::new(), TeamSide::Home), None);
    }
}
