//! Certainty factors.
//!
//! A certainty factor is a belief strength in [0, 1]. Independent pieces of
//! evidence for the same fact are merged with [`combine`], which only ever
//! adds belief: `combine(a, b) = a + b * (1 - a)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Merges an existing certainty `a` with new evidence `b` for the same fact.
///
/// Commutative, monotone in both arguments, with identity 0. The result only
/// reaches 1.0 when one of the inputs is exactly 1.0.
#[must_use]
pub fn combine(a: f64, b: f64) -> f64 {
    // The larger operand leads so the result is bit-identical for (a, b) and (b, a).
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    (hi + lo * (1.0 - hi)).clamp(0.0, 1.0)
}

/// A validated certainty factor in [0.0, 1.0].
///
/// # Examples
///
/// ```
/// use cfchain::Confidence;
///
/// let a = Confidence::new(0.6).unwrap();
/// let b = Confidence::new(0.5).unwrap();
/// assert!((a.combine(b).value() - 0.8).abs() < 1e-12);
/// assert!(Confidence::new(1.2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Known but disconfirmed.
    pub const ZERO: Self = Self(0.0);

    /// Full certainty. Observed symptoms start here.
    pub const ONE: Self = Self(1.0);

    /// Creates a confidence with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if the value is NaN or
    /// not in [0.0, 1.0].
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// CF combination with another independent piece of evidence.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self(combine(self.0, other.0))
    }

    /// Conjunctive combination: the weaker of the two.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Scales the confidence by a factor in [0, 1].
    ///
    /// Used for the partial-match ratio and the rule weight; the product of
    /// values in [0, 1] stays in [0, 1].
    #[must_use]
    pub(crate) fn scale(self, factor: f64) -> Self {
        Self((self.0 * factor).clamp(0.0, 1.0))
    }

    /// Confidence as a percentage, as shown in diagnosis results.
    #[must_use]
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
