use crate::config::PitchDimensions;
use crate::error::{PitchControlError, Result};
use crate::model::{AttackDirection, Point};
use serde::{Deserialize, Serialize};

/// Offset keeping points on the far touchline inside the last cell.
const EDGE_EPSILON: f64 = 1e-4;

/// Expected-threat values over a regular pitch mesh, oriented for a team
/// attacking left to right. Row 0 is the lowest y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatGrid {
    values: Vec<f64>,
    cells_x: usize,
    cells_y: usize,
}

impl ThreatGrid {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cells_y = rows.len();
        let cells_x = rows.first().map_or(0, Vec::len);
        if cells_x == 0 {
            return Err(PitchControlError::InvalidGrid { reason: "xT grid is empty".to_string() });
        }
        if let Some((row, ragged)) = rows.iter().enumerate().find(|(_, r)| r.len() != cells_x) {
            return Err(PitchControlError::InvalidGrid {
                reason: format!("row {} has {} values, expected {}", row, ragged.len(), cells_x),
            });
        }

        Ok(Self { values: rows.into_iter().flatten().collect(), cells_x, cells_y })
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cells_x + col]
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mirror left to right, for a team attacking right to left.
    pub fn flipped(&self) -> Self {
        let values = self
            .values
            .chunks(self.cells_x)
            .flat_map(|row| row.iter().rev().copied())
            .collect();
        Self { values, cells_x: self.cells_x, cells_y: self.cells_y }
    }

    pub fn oriented(&self, direction: AttackDirection) -> Self {
        match direction {
            AttackDirection::LeftToRight => self.clone(),
            AttackDirection::RightToLeft => self.flipped(),
        }
    }

    /// xT at a centred pitch position. Off-pitch positions are worth nothing.
    pub fn value_at(
        &self,
        position: &Point,
        direction: AttackDirection,
        pitch: &PitchDimensions,
    ) -> f64 {
        if !pitch.contains(position.x, position.y) {
            return 0.0;
        }

        let dx = pitch.length / self.cells_x as f64;
        let dy = pitch.width / self.cells_y as f64;
        // Saturating casts clamp the -epsilon at the near touchline to 0
        let ix = (((position.x + pitch.half_length() - EDGE_EPSILON) / dx) as usize).min(self.cells_x - 1);
        let iy = (((position.y + pitch.half_width() - EDGE_EPSILON) / dy) as usize).min(self.cells_y - 1);

        let col = match direction {
            AttackDirection::LeftToRight => ix,
            AttackDirection::RightToLeft => self.cells_x - 1 - ix,
        };
        self.get(iy, col)
    }
}
