//! Tracking frames and event records
//!
//! Tracking data arrives as wide rows: one column per (team, player, axis).
//! [`ColumnKey`] turns those headers into typed keys; [`Tracking`] holds the
//! resulting frames keyed by frame id.

use super::{PlayerId, Point, TeamSide};
use crate::error::{PitchControlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type FrameId = u64;

/// Per-player measurement slot within a tracking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleField {
    X,
    Y,
    Vx,
    Vy,
}

/// Typed form of a tracking column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKey {
    Player { id: PlayerId, field: SampleField },
    BallX,
    BallY,
}

impl ColumnKey {
    /// Parse a header such as `Team_A_Player_7_x` or `Ball_y`.
    ///
    /// Returns `Ok(None)` for columns the model does not consume (frame id,
    /// period, clock, raw speeds). A column that claims a team prefix but is
    /// otherwise malformed is an error.
    pub fn parse(column: &str) -> Result<Option<ColumnKey>> {
        let column = column.trim();
        match column {
            "Ball_x" => return Ok(Some(ColumnKey::BallX)),
            "Ball_y" => return Ok(Some(ColumnKey::BallY)),
            _ => {}
        }

        let (side, rest) = if let Some(rest) = column.strip_prefix(TeamSide::HOME_LABEL) {
            (TeamSide::Home, rest)
        } else if let Some(rest) = column.strip_prefix(TeamSide::AWAY_LABEL) {
            (TeamSide::Away, rest)
        } else {
            return Ok(None);
        };

        let invalid = || PitchControlError::InvalidColumn { column: column.to_string() };

        let mut parts = rest.split('_');
        // Leading '_' after the team label leaves an empty first part.
        if parts.next() != Some("") || parts.next() != Some("Player") {
            return Err(invalid());
        }
        let number: u32 = parts.next().and_then(|n| n.parse().ok()).ok_or_else(invalid)?;
        let suffix = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let field = match suffix {
            "x" => SampleField::X,
            "y" => SampleField::Y,
            "vx" => SampleField::Vx,
            "vy" => SampleField::Vy,
            _ => return Ok(None),
        };

        Ok(Some(ColumnKey::Player { id: PlayerId::new(side, number), field }))
    }
}

/// Position and velocity of one player at one frame. NaN marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Default for PlayerSample {
    fn default() -> Self {
        Self { x: f64::NAN, y: f64::NAN, vx: f64::NAN, vy: f64::NAN }
    }
}

impl PlayerSample {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64) -> Self {
        Self { x, y, vx, vy }
    }

    pub fn stationary(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    /// `None` when the player is off-frame.
    pub fn position(&self) -> Option<Point> {
        if self.x.is_nan() || self.y.is_nan() {
            None
        } else {
            Some(Point::new(self.x, self.y))
        }
    }

    /// Velocity, zeroed when unavailable.
    pub fn velocity(&self) -> Point {
        if self.vx.is_nan() || self.vy.is_nan() {
            Point::zeros()
        } else {
            Point::new(self.vx, self.vy)
        }
    }

    pub fn set(&mut self, field: SampleField, value: f64) {
        match field {
            SampleField::X => self.x = value,
            SampleField::Y => self.y = value,
            SampleField::Vx => self.vx = value,
            SampleField::Vy => self.vy = value,
        }
    }
}

/// One team's slice of a tracking row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFrame {
    pub side: TeamSide,
    pub players: BTreeMap<PlayerId, PlayerSample>,
}

impl TeamFrame {
    pub fn new(side: TeamSide) -> Self {
        Self { side, players: BTreeMap::new() }
    }

    /// Builder-style insert, keyed by shirt number on this frame's side.
    pub fn with_player(mut self, number: u32, sample: PlayerSample) -> Self {
        self.players.insert(PlayerId::new(self.side, number), sample);
        self
    }

    pub fn sample_mut(&mut self, id: PlayerId) -> &mut PlayerSample {
        self.players.entry(id).or_default()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerSample> {
        self.players.get(&id)
    }
}

/// Full tracking row: both teams plus the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    pub frame_id: FrameId,
    pub period: u8,
    pub time_s: f64,
    pub ball: Option<Point>,
    pub home: TeamFrame,
    pub away: TeamFrame,
}

impl TrackingFrame {
    pub fn new(frame_id: FrameId, period: u8, time_s: f64) -> Self {
        Self {
            frame_id,
            period,
            time_s,
            ball: None,
            home: TeamFrame::new(TeamSide::Home),
            away: TeamFrame::new(TeamSide::Away),
        }
    }

    pub fn team(&self, side: TeamSide) -> &TeamFrame {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamFrame {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    /// Store one parsed cell of a wide tracking row.
    pub fn apply(&mut self, key: ColumnKey, value: f64) {
        match key {
            ColumnKey::Player { id, field } => {
                self.team_mut(id.side).sample_mut(id).set(field, value);
            }
            ColumnKey::BallX => {
                let y = self.ball.map(|b| b.y).unwrap_or(f64::NAN);
                self.ball = Some(Point::new(value, y));
            }
            ColumnKey::BallY => {
                let x = self.ball.map(|b| b.x).unwrap_or(f64::NAN);
                self.ball = Some(Point::new(x, value));
            }
        }
    }
}

/// Ordered collection of tracking frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub frames: BTreeMap<FrameId, TrackingFrame>,
}

impl Tracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: TrackingFrame) {
        self.frames.insert(frame.frame_id, frame);
    }

    pub fn frame(&self, frame_id: FrameId) -> Result<&TrackingFrame> {
        self.frames.get(&frame_id).ok_or(PitchControlError::MissingFrame { frame_id })
    }

    pub fn first_frame(&self) -> Option<&TrackingFrame> {
        self.frames.values().next()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A pass (or other on-ball action) from the event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    /// Raw possession label; resolved with [`TeamSide::from_label`].
    pub team: String,
    pub start: Point,
    pub end: Point,
    pub start_frame: FrameId,
}

impl Event {
    pub fn possession(&self) -> Result<TeamSide> {
        TeamSide::from_label(&self.team)
    }
}
