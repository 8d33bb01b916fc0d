use crate::error::{PitchControlError, Result};
use serde::{Deserialize, Serialize};

/// Pitch length and width in metres. Model coordinates are centred, so x runs
/// over `[-length/2, length/2]` and y over `[-width/2, width/2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchDimensions {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchDimensions {
    fn default() -> Self {
        Self { length: 105.0, width: 68.0 }
    }
}

impl PitchDimensions {
    pub fn new(length: f64, width: f64) -> Result<Self> {
        let pitch = Self { length, width };
        pitch.validate()?;
        Ok(pitch)
    }

    /// Both sides must be finite and positive. Deserialised dimensions skip
    /// [`Self::new`], so grid and xT entry points call this too.
    pub fn validate(&self) -> Result<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(PitchControlError::InvalidParameter {
                name: "pitch_length",
                value: self.length,
            });
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(PitchControlError::InvalidParameter {
                name: "pitch_width",
                value: self.width,
            });
        }
        Ok(())
    }

    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// True when the centred point lies on the pitch (lines included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.half_length() && y.abs() <= self.half_width()
    }
}
