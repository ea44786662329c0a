//! Validated, immutable rule sets.
//!
//! A [`RuleSet`] is built once (from code or a rule file) and then passed by
//! reference into every inference run. Rule order is preserved but does not
//! affect results.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CfError, LoadError, ValidationError};
use crate::fact::FactId;
use crate::rule::{Rule, RuleRecord};

/// An ordered collection of rules with unique ids.
///
/// The content fingerprint is computed once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fingerprint: String,
}

impl RuleSet {
    /// Construct a validated rule set.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DuplicateRuleId` if two rules share an id.
    pub fn new(rules: Vec<Rule>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(ValidationError::DuplicateRuleId {
                    rule_id: rule.id().clone(),
                });
            }
        }
        let fingerprint = digest(&rules);
        Ok(Self { rules, fingerprint })
    }

    /// Validate raw rule records, then the set as a whole.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidRule` or `DuplicateRuleId` found, in record order.
    pub fn from_records(records: Vec<RuleRecord>) -> Result<Self, ValidationError> {
        let rules = records
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// Parse a rule file's contents: a JSON array of rule records.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Json` for malformed JSON and `CfError::Validation`
    /// for structurally invalid rules.
    pub fn from_json_str(json: &str) -> Result<Self, CfError> {
        let records: Vec<RuleRecord> =
            serde_json::from_str(json).map_err(|source| LoadError::Json {
                origin: "rule set".to_string(),
                source,
            })?;
        Ok(Self::from_records(records)?)
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterates over rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The symptom universe: every fact id used as a premise, sorted.
    ///
    /// Presentation layers use this to list selectable symptoms and to keep
    /// symptoms out of diagnosis results.
    #[must_use]
    pub fn symptoms(&self) -> BTreeSet<FactId> {
        self.rules
            .iter()
            .flat_map(|r| r.premises().iter().cloned())
            .collect()
    }

    /// Every fact id some rule concludes, sorted.
    #[must_use]
    pub fn conclusions(&self) -> BTreeSet<FactId> {
        self.rules.iter().map(|r| r.conclusion().clone()).collect()
    }

    /// Stable blake3 digest of the rules' ids, premises, conclusions and weights,
    /// as lowercase hex.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn digest(rules: &[Rule]) -> String {
    let mut hasher = blake3::Hasher::new();
    for rule in rules {
        hasher.update(rule.id().as_str().as_bytes());
        hasher.update(&[0x1f]);
        for premise in rule.premises() {
            hasher.update(premise.as_str().as_bytes());
            hasher.update(&[0x1e]);
        }
        hasher.update(&[0x1f]);
        hasher.update(rule.conclusion().as_str().as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(&rule.weight().value().to_le_bytes());
        hasher.update(&[0x1d]);
    }
    hasher.finalize().to_hex().to_string()
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fingerprint: digest(&[]),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl Serialize for RuleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.rules.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<RuleRecord>::deserialize(deserializer)?;
        RuleSet::from_records(raw).map_err(serde::de::Error::custom)
    }
}
