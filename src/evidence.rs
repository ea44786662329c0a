//! Initial evidence for an inference run.
//!
//! Evidence is captured once, up front, and handed to the engine as an
//! immutable record. Unchecked symptoms are left out entirely; they are
//! unknown, not disconfirmed.

use std::collections::BTreeMap;

use crate::confidence::Confidence;
use crate::error::ValidationError;
use crate::fact::{FactId, Facts};

/// Immutable set of initially known facts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence(Facts);

impl Evidence {
    /// No observations.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every checked symptom at confidence 1.0.
    #[must_use]
    pub fn from_checked<I, F>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FactId>,
    {
        Self(
            symptoms
                .into_iter()
                .map(|s| (s.into(), Confidence::ONE))
                .collect(),
        )
    }

    /// One flag per symptom, as a checkbox form produces. Only `true` flags
    /// become facts.
    #[must_use]
    pub fn from_flags(flags: &BTreeMap<FactId, bool>) -> Self {
        Self::from_checked(
            flags
                .iter()
                .filter(|(_, checked)| **checked)
                .map(|(id, _)| id.clone()),
        )
    }

    /// Evidence with caller-supplied confidences.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfidence` naming the first fact whose
    /// confidence is NaN or outside [0.0, 1.0].
    pub fn from_raw<I, F>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (F, f64)>,
        F: Into<FactId>,
    {
        let mut facts = Facts::new();
        for (fact, value) in pairs {
            let fact = fact.into();
            let Ok(confidence) = Confidence::new(value) else {
                return Err(ValidationError::InvalidConfidence { fact, value });
            };
            facts.insert(fact, confidence);
        }
        Ok(Self(facts))
    }

    /// The seed facts.
    #[must_use]
    pub fn facts(&self) -> &Facts {
        &self.0
    }

    /// Consumes the evidence, returning the seed facts.
    #[must_use]
    pub fn into_facts(self) -> Facts {
        self.0
    }

    /// Returns true if nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Facts> for Evidence {
    fn from(facts: Facts) -> Self {
        Self(facts)
    }
}
