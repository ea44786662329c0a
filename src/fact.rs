//! Fact identifiers and the fact-confidence mapping.
//!
//! A fact missing from [`Facts`] is *unknown*. A fact present with 0.0 is
//! *known and disconfirmed*. The engine never produces the latter, but the
//! representation keeps the two apart.

use std::borrow::Borrow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

/// Identifier of a fact: a symptom or a derived conclusion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(String);

impl FactId {
    /// Creates a fact id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Human-readable label: underscores become spaces, each word is
    /// capitalized (`busuk_akar` -> `Busuk Akar`).
    #[must_use]
    pub fn label(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for FactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Mapping from fact to its current certainty factor.
///
/// Ordered by fact id so iteration, serialization and equality are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts(BTreeMap<FactId, Confidence>);

impl Facts {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the confidence of a fact, or `None` if it is unknown.
    #[must_use]
    pub fn get(&self, fact: &str) -> Option<Confidence> {
        self.0.get(fact).copied()
    }

    /// Returns true if the fact is known, whatever its confidence.
    #[must_use]
    pub fn contains(&self, fact: &str) -> bool {
        self.0.contains_key(fact)
    }

    /// Number of known facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no fact is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets a fact's confidence, replacing any previous value.
    pub fn insert(&mut self, fact: impl Into<FactId>, confidence: Confidence) -> Option<Confidence> {
        self.0.insert(fact.into(), confidence)
    }

    /// Adds evidence for a fact: inserts it when unknown, otherwise merges with
    /// the CF combination rule. Returns the resulting confidence.
    pub fn reinforce(&mut self, fact: FactId, evidence: Confidence) -> Confidence {
        match self.0.entry(fact) {
            btree_map::Entry::Occupied(mut slot) => {
                let merged = slot.get().combine(evidence);
                slot.insert(merged);
                merged
            }
            btree_map::Entry::Vacant(slot) => *slot.insert(evidence),
        }
    }

    /// Iterates over facts in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&FactId, Confidence)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    /// Iterates over the known fact ids.
    pub fn ids(&self) -> impl Iterator<Item = &FactId> {
        self.0.keys()
    }

    /// Consumes the mapping, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<FactId, Confidence> {
        self.0
    }
}

impl FromIterator<(FactId, Confidence)> for Facts {
    fn from_iter<I: IntoIterator<Item = (FactId, Confidence)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Facts {
    type Item = (FactId, Confidence);
    type IntoIter = btree_map::IntoIter<FactId, Confidence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cf(v: f64) -> Confidence {
        Confidence::new(v).unwrap()
    }

    #[test]
    fn test_label() {
        assert_eq!(FactId::from("busuk_akar").label(), "Busuk Akar");
        assert_eq!(FactId::from("KERDIL_keriting").label(), "Kerdil Keriting");
        assert_eq!(FactId::from("layu").label(), "Layu");
        assert_eq!(FactId::from("__a__b").label(), "A B");
    }

    #[test]
    fn test_blank() {
        assert!(FactId::from("  ").is_blank());
        assert!(!FactId::from("a").is_blank());
    }

    #[test]
    fn test_absent_is_not_zero() {
        let mut facts = Facts::new();
        facts.insert("seen", Confidence::ZERO);
        assert!(facts.contains("seen"));
        assert_eq!(facts.get("seen"), Some(Confidence::ZERO));
        assert!(!facts.contains("unseen"));
        assert_eq!(facts.get("unseen"), None);
    }

    #[test]
    fn test_reinforce_inserts_then_combines() {
        let mut facts = Facts::new();
        let first = facts.reinforce(FactId::from("x"), cf(0.6));
        assert_eq!(first, cf(0.6));
        let second = facts.reinforce(FactId::from("x"), cf(0.5));
        assert!((second.value() - 0.8).abs() < 1e-12);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_facts_serialize_as_object() {
        let facts: Facts = [(FactId::from("b"), cf(0.5)), (FactId::from("a"), Confidence::ONE)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&facts).unwrap();
        assert_eq!(json, r#"{"a":1.0,"b":0.5}"#);
        let back: Facts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, facts);
    }

    #[test]
    fn test_facts_reject_out_of_range_on_deserialize() {
        assert!(serde_json::from_str::<Facts>(r#"{"a": 2.0}"#).is_err());
    }
}
