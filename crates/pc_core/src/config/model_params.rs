//! Pitch control model parameters
//!
//! Defaults follow Spearman (2018) with one change: `kappa_def` is 1.0 so
//! home and away players get the same ball-control rate. The
//! [`ModelSettings::paper`] preset restores the published 1.72.

use crate::error::{PitchControlError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::f64::consts::{LN_10, PI};

/// User-facing model settings. Every field has a default, so partial YAML/JSON
/// documents are valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Maximum player acceleration (m/s²). Informational; the interception
    /// model folds it into `reaction_time`.
    pub max_player_accel: f64,
    /// Maximum player speed (m/s)
    pub max_player_speed: f64,
    /// Time before a player changes trajectory (s), roughly vmax/amax
    pub reaction_time: f64,
    /// Spread of the arrival-time sigmoid (s)
    pub tti_sigma: f64,
    /// Defensive advantage multiplier on the ball-control rate
    pub kappa_def: f64,
    /// Ball-control rate for attacking players (1/s)
    pub lambda_att: f64,
    /// Goalkeepers control the ball this many times faster than defenders
    pub gk_lambda_multiplier: f64,
    /// Average ball travel speed (m/s)
    pub average_ball_speed: f64,
    /// Integration time step (s)
    pub int_dt: f64,
    /// Integration horizon after the ball arrives (s)
    pub max_int_time: f64,
    /// Accept a result once attack + defence control reaches 1 - tol
    pub model_converge_tol: f64,
    /// Head start multiplier for the shortcut thresholds
    pub time_to_control_veto: f64,
    /// Safety margin added to the offside line (m)
    pub offside_tolerance: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            max_player_accel: 7.0,
            max_player_speed: 5.0,
            reaction_time: 0.7,
            tti_sigma: 0.45,
            kappa_def: 1.0,
            lambda_att: 4.3,
            gk_lambda_multiplier: 3.0,
            average_ball_speed: 15.0,
            int_dt: 0.04,
            max_int_time: 10.0,
            model_converge_tol: 0.01,
            time_to_control_veto: 3.0,
            offside_tolerance: 0.2,
        }
    }
}

impl ModelSettings {
    /// Equal ball-control rates for both teams (default)
    pub fn standard() -> Self {
        Self::default()
    }

    /// Published defensive advantage (kappa = 1.72)
    pub fn paper() -> Self {
        Self { kappa_def: 1.72, ..Self::default() }
    }

    /// Load from environment variable PITCH_CONTROL_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        match env::var("PITCH_CONTROL_PROFILE").unwrap_or_default().to_lowercase().as_str() {
            "paper" => Self::paper(),
            _ => Self::standard(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Validated, read-only parameters consumed by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParams {
    pub max_player_speed: f64,
    pub reaction_time: f64,
    pub tti_sigma: f64,
    pub lambda_att: f64,
    pub lambda_def: f64,
    pub lambda_gk: f64,
    pub average_ball_speed: f64,
    pub int_dt: f64,
    pub max_int_time: f64,
    pub model_converge_tol: f64,
    /// Attackers with this much of a head start win outright
    pub time_to_control_att: f64,
    /// Defenders with this much of a head start win outright
    pub time_to_control_def: f64,
    pub offside_tolerance: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::derive(&ModelSettings::default())
    }
}

impl ModelParams {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let positive = [
            ("max_player_speed", settings.max_player_speed),
            ("reaction_time", settings.reaction_time),
            ("tti_sigma", settings.tti_sigma),
            ("kappa_def", settings.kappa_def),
            ("lambda_att", settings.lambda_att),
            ("gk_lambda_multiplier", settings.gk_lambda_multiplier),
            ("average_ball_speed", settings.average_ball_speed),
            ("int_dt", settings.int_dt),
            ("max_int_time", settings.max_int_time),
            ("model_converge_tol", settings.model_converge_tol),
            ("time_to_control_veto", settings.time_to_control_veto),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PitchControlError::InvalidParameter { name, value });
            }
        }
        if settings.model_converge_tol >= 1.0 {
            return Err(PitchControlError::InvalidParameter {
                name: "model_converge_tol",
                value: settings.model_converge_tol,
            });
        }
        if !settings.offside_tolerance.is_finite() || settings.offside_tolerance < 0.0 {
            return Err(PitchControlError::InvalidParameter {
                name: "offside_tolerance",
                value: settings.offside_tolerance,
            });
        }

        Ok(Self::derive(settings))
    }

    fn derive(settings: &ModelSettings) -> Self {
        let lambda_att = settings.lambda_att;
        let lambda_def = settings.lambda_att * settings.kappa_def;
        let lambda_gk = lambda_def * settings.gk_lambda_multiplier;
        let threshold = |lambda: f64| {
            settings.time_to_control_veto
                * LN_10
                * (3f64.sqrt() * settings.tti_sigma / PI + 1.0 / lambda)
        };

        Self {
            max_player_speed: settings.max_player_speed,
            reaction_time: settings.reaction_time,
            tti_sigma: settings.tti_sigma,
            lambda_att,
            lambda_def,
            lambda_gk,
            average_ball_speed: settings.average_ball_speed,
            int_dt: settings.int_dt,
            max_int_time: settings.max_int_time,
            model_converge_tol: settings.model_converge_tol,
            time_to_control_att: threshold(lambda_att),
            time_to_control_def: threshold(lambda_def),
            offside_tolerance: settings.offside_tolerance,
        }
    }

    /// Number of integration samples, including the one before ball arrival.
    pub fn integration_steps(&self) -> usize {
        (self.max_int_time / self.int_dt).round() as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ModelParams::default();
        assert!((params.lambda_def - 4.3).abs() < 1e-12);
        assert!((params.lambda_gk - 12.9).abs() < 1e-9);
        // 3 * ln(10) * (sqrt(3) * 0.45 / pi + 1 / 4.3)
        assert!((params.time_to_control_att - 3.3205).abs() < 1e-3);
        assert!((params.time_to_control_att - params.time_to_control_def).abs() < 1e-12);
        assert_eq!(params.integration_steps(), 251);
    }

    #[test]
    fn test_paper_preset_favours_defence() {
        let paper = ModelParams::from_settings(&ModelSettings::paper()).unwrap();
        assert!((paper.lambda_def - 4.3 * 1.72).abs() < 1e-9);
        assert!(paper.time_to_control_def < paper.time_to_control_att);
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        let settings = ModelSettings { lambda_att: 0.0, ..ModelSettings::default() };
        assert_eq!(
            ModelParams::from_settings(&settings).unwrap_err(),
            PitchControlError::InvalidParameter { name: "lambda_att", value: 0.0 }
        );

        let settings = ModelSettings { int_dt: f64::NAN, ..ModelSettings::default() };
        assert!(ModelParams::from_settings(&settings).is_err());

        let settings = ModelSettings { model_converge_tol: 1.5, ..ModelSettings::default() };
        assert!(ModelParams::from_settings(&settings).is_err());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let settings = ModelSettings::from_yaml_str("max_int_time: 20.0\ntti_sigma: 0.3\n").unwrap();
        assert_eq!(settings.max_int_time, 20.0);
        assert_eq!(settings.tti_sigma, 0.3);
        assert_eq!(settings.lambda_att, 4.3);

        let params = ModelParams::from_settings(&settings).unwrap();
        assert_eq!(params.integration_steps(), 501);
    }

    #[test]
    fn test_json_settings() {
        let settings = ModelSettings::from_json_str(r#"{"kappa_def": 2.0}"#).unwrap();
        let params = ModelParams::from_settings(&settings).unwrap();
        assert!((params.lambda_def - 8.6).abs() < 1e-9);

        assert!(ModelSettings::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_default_matches_validated_default() {
        let validated = ModelParams::from_settings(&ModelSettings::default()).unwrap();
        assert_eq!(validated, ModelParams::default());
    }
}
