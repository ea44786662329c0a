//! Weighted if-then rules.
//!
//! A rule names a set of premise facts, one conclusion fact and its own
//! certainty (the weight). It may fire with only some premises known; the
//! derived confidence is then scaled down by the fraction matched.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::error::ValidationError;
use crate::fact::{FactId, Facts};

/// Identifier of a rule within a rule set.
///
/// Rule files may use integers, floats or strings; all normalize to a string,
/// with integral floats written without a fractional part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a rule id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RuleId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            UInt(u64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::UInt(n) => Self(n.to_string()),
            // Integral floats such as `1.0` name the same rule as `1`.
            #[allow(clippy::float_cmp)]
            Raw::Float(n) if n.is_finite() && n.trunc() == n => Self(format!("{n:.0}")),
            Raw::Float(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Rule record as it appears in a rule file.
///
/// ```json
/// {"id": 1, "if": ["akar_busuk", "layu"], "then": "busuk_akar", "cf": 0.8}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Rule identifier.
    pub id: RuleId,

    /// Premise fact ids.
    #[serde(rename = "if", alias = "premises", default)]
    pub premises: Vec<FactId>,

    /// Conclusion fact id.
    #[serde(rename = "then", alias = "conclusion", default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<FactId>,

    /// Rule weight; 1.0 when absent.
    #[serde(rename = "cf", alias = "weight", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A validated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct Rule {
    id: RuleId,
    premises: Vec<FactId>,
    conclusion: FactId,
    weight: Confidence,
}

impl Rule {
    /// Creates a rule with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRule` if the premise list is empty,
    /// contains a blank id, the conclusion is blank, or the weight is not in
    /// [0.0, 1.0]. Repeated premise ids are kept once, in first-seen order.
    pub fn new(
        id: impl Into<RuleId>,
        premises: Vec<FactId>,
        conclusion: impl Into<FactId>,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        Self::try_from(RuleRecord {
            id: id.into(),
            premises,
            conclusion: Some(conclusion.into()),
            weight: Some(weight),
        })
    }

    /// Returns a builder for a rule with the given id.
    #[must_use]
    pub fn builder(id: impl Into<RuleId>) -> RuleBuilder {
        RuleBuilder::new(id)
    }

    /// Rule identifier.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Premise fact ids, in declaration order.
    #[must_use]
    pub fn premises(&self) -> &[FactId] {
        &self.premises
    }

    /// Conclusion fact id.
    #[must_use]
    pub fn conclusion(&self) -> &FactId {
        &self.conclusion
    }

    /// Rule weight.
    #[must_use]
    pub fn weight(&self) -> Confidence {
        self.weight
    }

    /// Returns true if the conclusion is also one of the premises.
    #[must_use]
    pub fn is_self_referential(&self) -> bool {
        self.premises.contains(&self.conclusion)
    }

    /// Matches the rule against the known facts.
    ///
    /// Returns `None` when no premise is known. A premise known at 0.0 still
    /// counts as matched.
    #[must_use]
    pub fn evaluate(&self, known: &Facts) -> Option<RuleMatch> {
        let mut matched = Vec::new();
        let mut premise_cf = Confidence::ONE;
        for premise in &self.premises {
            if let Some(cf) = known.get(premise.as_str()) {
                premise_cf = premise_cf.min(cf);
                matched.push(premise.clone());
            }
        }
        if matched.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let ratio = matched.len() as f64 / self.premises.len() as f64;
        let inferred = premise_cf.scale(ratio).scale(self.weight.value());
        Some(RuleMatch {
            matched,
            ratio,
            premise_cf,
            inferred,
        })
    }
}

impl TryFrom<RuleRecord> for Rule {
    type Error = ValidationError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let RuleRecord {
            id,
            premises,
            conclusion,
            weight,
        } = record;

        if premises.is_empty() {
            return Err(ValidationError::invalid_rule(&id, "premise list is empty"));
        }
        if premises.iter().any(FactId::is_blank) {
            return Err(ValidationError::invalid_rule(&id, "premise id is blank"));
        }
        let listed = premises.len();
        let mut seen = HashSet::with_capacity(listed);
        let premises: Vec<FactId> = premises
            .into_iter()
            .filter(|premise| seen.insert(premise.clone()))
            .collect();
        if premises.len() < listed {
            tracing::warn!(
                rule = %id,
                listed,
                distinct = premises.len(),
                "dropping repeated premise ids"
            );
        }

        let conclusion = match conclusion {
            Some(c) if !c.is_blank() => c,
            _ => return Err(ValidationError::invalid_rule(&id, "conclusion is missing")),
        };

        let weight = match weight {
            None => Confidence::ONE,
            Some(w) => Confidence::new(w).map_err(|_| {
                ValidationError::invalid_rule(&id, format!("weight {w} is outside [0.0, 1.0]"))
            })?,
        };

        Ok(Self {
            id,
            premises,
            conclusion,
            weight,
        })
    }
}

impl From<Rule> for RuleRecord {
    fn from(rule: Rule) -> Self {
        Self {
            id: rule.id,
            premises: rule.premises,
            conclusion: Some(rule.conclusion),
            weight: Some(rule.weight.value()),
        }
    }
}

/// Outcome of matching one rule against the known facts.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Premises present in the known facts.
    pub matched: Vec<FactId>,
    /// `|matched| / |premises|`.
    pub ratio: f64,
    /// Weakest matched premise.
    pub premise_cf: Confidence,
    /// `premise_cf * ratio * weight`.
    pub inferred: Confidence,
}

impl RuleMatch {
    /// Returns true if every premise was known.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        (self.ratio - 1.0).abs() < f64::EPSILON
    }
}

/// Builder for [`Rule`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    id: RuleId,
    premises: Vec<FactId>,
    conclusion: Option<FactId>,
    weight: Option<f64>,
}

impl RuleBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self {
            id: id.into(),
            premises: Vec::new(),
            conclusion: None,
            weight: None,
        }
    }

    /// Add a premise.
    #[must_use]
    pub fn premise(mut self, fact: impl Into<FactId>) -> Self {
        self.premises.push(fact.into());
        self
    }

    /// Set all premises.
    #[must_use]
    pub fn premises<I, F>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FactId>,
    {
        self.premises = facts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the conclusion.
    #[must_use]
    pub fn conclusion(mut self, fact: impl Into<FactId>) -> Self {
        self.conclusion = Some(fact.into());
        self
    }

    /// Set the rule weight (0.0..=1.0). Defaults to 1.0.
    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Build the rule.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRule` on the conditions listed in
    /// [`Rule::new`].
    pub fn build(self) -> Result<Rule, ValidationError> {
        Rule::try_from(RuleRecord {
            id: self.id,
            premises: self.premises,
            conclusion: self.conclusion,
            weight: self.weight,
        })
    }
}
