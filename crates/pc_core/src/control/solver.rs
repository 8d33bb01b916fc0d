//! Pitch control at a single target location
//!
//! Solves the coupled ball-control equations (Spearman 2018, eq. 3) by
//! forward integration. Probability mass flows from "uncontrolled" into the
//! attacking or defending bucket and never flows back:
//!
//! ```text
//! dP_i/dT = (1 - P_att(T - dt) - P_def(T - dt)) * f_i(T) * lambda_i
//! ```
//!
//! where `f_i` is player i's arrival probability. Integration starts one step
//! before the ball arrives and stops at `1 - model_converge_tol` or when the
//! horizon runs out.
//!
//! Two shortcuts skip the integral when one team's fastest player arrives so
//! much earlier than the other's that the outcome is beyond doubt.

use super::player::{Contender, PlayerState, Role};
use crate::config::ModelParams;
use crate::error::{PitchControlError, Result};
use crate::model::{PlayerId, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a control probability was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    /// Attack arrives far enough ahead to win outright
    AttackShortcut,
    /// Defence arrives far enough ahead to win outright
    DefenceShortcut,
    /// One roster was empty; the other side controls everything
    Uncontested,
    /// Integration reached tolerance after `steps` steps
    Converged { steps: usize },
    /// Integration horizon ran out `shortfall` short of 1
    Unconverged { shortfall: f64 },
}

/// One player's final share of the control probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerControl {
    pub id: PlayerId,
    pub control: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub attacking: f64,
    pub defending: f64,
    pub resolution: Resolution,
    /// Per-player shares; only filled when the integral was evaluated
    pub players: Vec<PlayerControl>,
}

impl ControlOutcome {
    fn decided(attacking: f64, resolution: Resolution) -> Self {
        Self { attacking, defending: 1.0 - attacking, resolution, players: Vec::new() }
    }

    pub fn total(&self) -> f64 {
        self.attacking + self.defending
    }

    pub fn converged(&self) -> bool {
        !matches!(self.resolution, Resolution::Unconverged { .. })
    }
}

/// Seconds for the ball to travel from `origin` to `target`. A missing or
/// NaN origin means the ball is already there.
pub fn ball_travel_time(target: &Point, origin: Option<&Point>, params: &ModelParams) -> f64 {
    match origin {
        Some(origin) if !origin.x.is_nan() && !origin.y.is_nan() => {
            (target - origin).norm() / params.average_ball_speed
        }
        _ => 0.0,
    }
}

/// Attacking and defending control probability at `target`.
///
/// Both rosters must be non-empty. Use [`resolve_control`] when an empty
/// roster should count as an uncontested result instead.
pub fn control_at_target(
    target: &Point,
    attackers: &[PlayerState],
    defenders: &[PlayerState],
    ball_origin: Option<&Point>,
    params: &ModelParams,
) -> Result<ControlOutcome> {
    if attackers.is_empty() {
        return Err(PitchControlError::EmptyRoster { role: Role::Attacking });
    }
    if defenders.is_empty() {
        return Err(PitchControlError::EmptyRoster { role: Role::Defending });
    }

    let travel_time = ball_travel_time(target, ball_origin, params);

    let mut attack: Vec<Contender> =
        attackers.iter().map(|p| Contender::new(p, target, Role::Attacking)).collect();
    let mut defence: Vec<Contender> =
        defenders.iter().map(|p| Contender::new(p, target, Role::Defending)).collect();

    let tau_min_att = fastest(&attack);
    let tau_min_def = fastest(&defence);

    if tau_min_att - travel_time.max(tau_min_def) >= params.time_to_control_def {
        debug!(
            "Defence wins ({:.2}, {:.2}) outright: tau att {:.2}s, def {:.2}s, ball {:.2}s",
            target.x, target.y, tau_min_att, tau_min_def, travel_time
        );
        return Ok(ControlOutcome::decided(0.0, Resolution::DefenceShortcut));
    }
    if tau_min_def - travel_time.max(tau_min_att) >= params.time_to_control_att {
        debug!(
            "Attack wins ({:.2}, {:.2}) outright: tau att {:.2}s, def {:.2}s, ball {:.2}s",
            target.x, target.y, tau_min_att, tau_min_def, travel_time
        );
        return Ok(ControlOutcome::decided(1.0, Resolution::AttackShortcut));
    }

    // Players hopelessly late contribute nothing measurable
    attack.retain(|c| c.time_to_intercept - tau_min_att < params.time_to_control_att);
    defence.retain(|c| c.time_to_intercept - tau_min_def < params.time_to_control_def);

    let dt = params.int_dt;
    let steps = params.integration_steps();
    let start = travel_time - dt;

    let mut p_att = 0.0;
    let mut p_def = 0.0;
    let mut step = 1;
    while 1.0 - (p_att + p_def) > params.model_converge_tol && step < steps {
        let t = start + step as f64 * dt;
        let uncontrolled = 1.0 - p_att - p_def;

        let att_total = accumulate(&mut attack, uncontrolled, t, dt)?;
        let def_total = accumulate(&mut defence, uncontrolled, t, dt)?;

        p_att = att_total;
        p_def = def_total;
        step += 1;
    }

    let shortfall = 1.0 - (p_att + p_def);
    let resolution = if shortfall > params.model_converge_tol {
        warn!(
            "Integration failed to converge at ({:.2}, {:.2}): total {:.3}",
            target.x,
            target.y,
            p_att + p_def
        );
        Resolution::Unconverged { shortfall }
    } else {
        Resolution::Converged { steps: step - 1 }
    };

    let players = attack
        .iter()
        .chain(defence.iter())
        .map(|c| PlayerControl { id: c.player.id, control: c.control })
        .collect();

    Ok(ControlOutcome { attacking: p_att, defending: p_def, resolution, players })
}

/// Like [`control_at_target`], but an empty roster hands the point to the
/// other team instead of failing.
pub fn resolve_control(
    target: &Point,
    attackers: &[PlayerState],
    defenders: &[PlayerState],
    ball_origin: Option<&Point>,
    params: &ModelParams,
) -> Result<ControlOutcome> {
    if attackers.is_empty() {
        return Ok(ControlOutcome::decided(0.0, Resolution::Uncontested));
    }
    if defenders.is_empty() {
        return Ok(ControlOutcome::decided(1.0, Resolution::Uncontested));
    }
    control_at_target(target, attackers, defenders, ball_origin, params)
}

fn fastest(contenders: &[Contender]) -> f64 {
    contenders
        .iter()
        .map(|c| c.time_to_intercept)
        .filter(|t| !t.is_nan())
        .fold(f64::INFINITY, f64::min)
}

/// Advance every contender by one step; returns the team's running total.
fn accumulate(contenders: &mut [Contender], uncontrolled: f64, t: f64, dt: f64) -> Result<f64> {
    let mut total = 0.0;
    for contender in contenders.iter_mut() {
        let rate = uncontrolled * contender.probability_arrive_by(t) * contender.rate;
        if rate < 0.0 || rate.is_nan() {
            return Err(PitchControlError::NegativeContribution {
                player: contender.player.id,
                value: rate,
                time: t,
            });
        }
        contender.control += rate * dt;
        total += contender.control;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::model::{PlayerSample, TeamSide};
    use proptest::prelude::*;

    fn player(side: TeamSide, number: u32, x: f64, y: f64) -> PlayerState {
        PlayerState::from_sample(
            PlayerId::new(side, number),
            &PlayerSample::stationary(x, y),
            &ModelParams::default(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_defence_shortcut() {
        let params = ModelParams::default();
        let target = Point::zeros();
        let attackers = vec![player(TeamSide::Home, 9, 50.0, 0.0)];
        let defenders = vec![player(TeamSide::Away, 4, 1.0, 0.0)];

        let outcome =
            control_at_target(&target, &attackers, &defenders, Some(&target), &params).unwrap();
        assert_eq!(outcome.attacking, 0.0);
        assert_eq!(outcome.defending, 1.0);
        assert_eq!(outcome.resolution, Resolution::DefenceShortcut);
        assert!(outcome.players.is_empty());
    }

    #[test]
    fn test_attack_shortcut() {
        let params = ModelParams::default();
        let target = Point::new(10.0, 10.0);
        let attackers = vec![player(TeamSide::Home, 9, 11.0, 10.0)];
        let defenders = vec![player(TeamSide::Away, 4, -40.0, -20.0)];

        let outcome = control_at_target(&target, &attackers, &defenders, None, &params).unwrap();
        assert_eq!((outcome.attacking, outcome.defending), (1.0, 0.0));
        assert_eq!(outcome.resolution, Resolution::AttackShortcut);
    }

    #[test]
    fn test_equidistant_players_split_control() {
        let params = ModelParams::default();
        let target = Point::zeros();
        let attackers = vec![player(TeamSide::Home, 9, -5.0, 0.0)];
        let defenders = vec![player(TeamSide::Away, 4, 5.0, 0.0)];

        let outcome =
            control_at_target(&target, &attackers, &defenders, Some(&target), &params).unwrap();
        assert!(matches!(outcome.resolution, Resolution::Converged { .. }));
        assert!((outcome.attacking - outcome.defending).abs() < 1e-12);
        assert!((outcome.attacking - 0.5).abs() < 0.01);
        assert!(outcome.total() >= 1.0 - params.model_converge_tol);
        assert!(outcome.total() <= 1.0 + 1e-9);
    }

    #[test]
    fn test_nearer_team_gets_more_control() {
        let params = ModelParams::default();
        let target = Point::new(20.0, 0.0);
        let attackers = vec![player(TeamSide::Home, 9, 14.0, 0.0)];
        let defenders = vec![player(TeamSide::Away, 4, 27.0, 0.0)];

        let outcome =
            control_at_target(&target, &attackers, &defenders, Some(&Point::zeros()), &params)
                .unwrap();
        assert!(outcome.attacking > outcome.defending);
        assert!(outcome.converged());
    }

    #[test]
    fn test_player_shares_sum_to_team_totals() {
        let params = ModelParams::default();
        let target = Point::zeros();
        let attackers =
            vec![player(TeamSide::Home, 9, -5.0, 0.0), player(TeamSide::Home, 10, -3.0, 4.0)];
        let defenders = vec![player(TeamSide::Away, 4, 5.0, 1.0)];

        let outcome =
            control_at_target(&target, &attackers, &defenders, Some(&target), &params).unwrap();
        let attack_share: f64 = outcome
            .players
            .iter()
            .filter(|p| p.id.side == TeamSide::Home)
            .map(|p| p.control)
            .sum();
        assert!((attack_share - outcome.attacking).abs() < 1e-12);
        assert_eq!(outcome.players.len(), 3);
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let params = ModelParams::default();
        let target = Point::new(3.0, -2.0);
        let attackers = vec![player(TeamSide::Home, 9, -5.0, 0.0)];
        let defenders = vec![player(TeamSide::Away, 4, 6.0, 1.0)];
        let origin = Point::new(-10.0, 0.0);

        let first =
            control_at_target(&target, &attackers, &defenders, Some(&origin), &params).unwrap();
        let second =
            control_at_target(&target, &attackers, &defenders, Some(&origin), &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_horizon_reports_shortfall() {
        let settings = ModelSettings { max_int_time: 0.2, ..ModelSettings::default() };
        let params = ModelParams::from_settings(&settings).unwrap();
        let target = Point::zeros();
        let attackers = vec![player(TeamSide::Home, 9, -5.0, 0.0)];
        let defenders = vec![player(TeamSide::Away, 4, 5.0, 0.0)];

        let outcome =
            control_at_target(&target, &attackers, &defenders, Some(&target), &params).unwrap();
        match outcome.resolution {
            Resolution::Unconverged { shortfall } => {
                assert!(shortfall > params.model_converge_tol);
                assert!((1.0 - outcome.total() - shortfall).abs() < 1e-12);
            }
            other => panic!("expected unconverged, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_rosters() {
        let params = ModelParams::default();
        let target = Point::zeros();
        let defenders = vec![player(TeamSide::Away, 4, 5.0, 0.0)];

        let err = control_at_target(&target, &[], &defenders, None, &params).unwrap_err();
        assert_eq!(err, PitchControlError::EmptyRoster { role: Role::Attacking });

        let outcome = resolve_control(&target, &[], &defenders, None, &params).unwrap();
        assert_eq!((outcome.attacking, outcome.defending), (0.0, 1.0));
        assert_eq!(outcome.resolution, Resolution::Uncontested);
    }

    #[test]
    fn test_negative_rate_is_an_error() {
        let params = ModelParams::default();
        let target = Point::zeros();
        let mut striker = player(TeamSide::Home, 9, -5.0, 0.0);
        striker.lambda_att = -params.lambda_att;
        let defenders = vec![player(TeamSide::Away, 4, 5.0, 0.0)];

        let err = control_at_target(&target, &[striker], &defenders, Some(&target), &params)
            .unwrap_err();
        match &err {
            PitchControlError::NegativeContribution { player, value, .. } => {
                assert_eq!(*player, PlayerId::new(TeamSide::Home, 9));
                assert!(*value < 0.0);
            }
            other => panic!("expected negative contribution, got {:?}", other),
        }
        assert_eq!(err.kind(), crate::error::ErrorKind::NumericInvariant);
    }

    #[test]
    fn test_ball_travel_time() {
        let params = ModelParams::default();
        let target = Point::new(30.0, 0.0);
        assert_eq!(ball_travel_time(&target, None, &params), 0.0);
        assert_eq!(ball_travel_time(&target, Some(&Point::new(f64::NAN, 0.0)), &params), 0.0);
        assert!((ball_travel_time(&target, Some(&Point::zeros()), &params) - 2.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_control_is_bounded(
            ax in -50.0f64..50.0, ay in -30.0f64..30.0,
            dx in -50.0f64..50.0, dy in -30.0f64..30.0,
            tx in -50.0f64..50.0, ty in -30.0f64..30.0,
        ) {
            let params = ModelParams::default();
            let target = Point::new(tx, ty);
            let attackers = vec![player(TeamSide::Home, 9, ax, ay)];
            let defenders = vec![player(TeamSide::Away, 4, dx, dy)];

            let origin = Point::zeros();
            let outcome =
                control_at_target(&target, &attackers, &defenders, Some(&origin), &params).unwrap();
            prop_assert!((0.0..=1.0).contains(&outcome.attacking));
            prop_assert!((0.0..=1.0).contains(&outcome.defending));
            prop_assert!(outcome.total() <= 1.0 + 1e-9);
            if outcome.converged() {
                prop_assert!(outcome.total() >= 1.0 - params.model_converge_tol);
            }
        }
    }
}
