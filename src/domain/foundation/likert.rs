//! Likert answer value object (1 to 5 ordinal scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Raw survey answer on the 5-point agreement scale.
///
/// 1 = "does not describe me at all", 5 = "describes me completely".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LikertAnswer(u8);

impl LikertAnswer {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Creates an answer, returning error if outside 1..=5.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                "answer",
                Self::MIN as i32,
                Self::MAX as i32,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    /// Creates an answer from a float, accepting only whole numbers in range.
    pub fn try_from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "answer",
                format!("expected a whole number between 1 and 5, got {}", value),
            ));
        }
        Self::try_new(value as u8)
    }

    /// Returns the raw value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the answer on the "higher is healthier" scale.
    ///
    /// Risk-polarity items are inverted (`6 - answer`).
    pub fn normalized(&self, indicates_risk: bool) -> f64 {
        if indicates_risk {
            f64::from(6 - self.0)
        } else {
            f64::from(self.0)
        }
    }

    /// Returns the survey wording for this answer.
    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Does not describe me at all",
            2 => "Describes me slightly",
            3 => "Describes me moderately",
            4 => "Describes me quite well",
            _ => "Describes me completely",
        }
    }
}

impl TryFrom<u8> for LikertAnswer {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<LikertAnswer> for u8 {
    fn from(answer: LikertAnswer) -> Self {
        answer.0
    }
}

impl fmt::Display for LikertAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
