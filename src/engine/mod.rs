//! Forward-chaining inference engine.
//!
//! A run repeatedly sweeps the rule set. In each pass every rule that has not
//! fired yet is matched against the facts known at the start of the pass; each
//! rule with at least one known premise fires and contributes
//! `min(matched premise cf) * |matched| / |premises| * weight` to its
//! conclusion. The run stops at the first pass in which nothing fires.
//!
//! Each rule fires at most once per run. This is what keeps cyclic rule graphs
//! from amplifying their own conclusions.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::evidence::Evidence;
use crate::fact::{FactId, Facts};
use crate::rule::{Rule, RuleId, RuleMatch};
use crate::rule_set::RuleSet;
use crate::trace::Firing;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Record a [`Firing`] for every rule that fires.
    pub record_trace: bool,
}

impl EngineConfig {
    /// Configuration with firing records enabled.
    #[must_use]
    pub const fn traced() -> Self {
        Self { record_trace: true }
    }
}

/// Result of one inference run.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutcome {
    /// Every fact reached: the initial facts plus every derived conclusion.
    pub facts: Facts,

    /// Rules that fired, in firing order.
    pub fired: Vec<RuleId>,

    /// Number of passes in which at least one rule fired.
    pub passes: usize,

    /// Firing records; empty unless tracing was enabled.
    pub trace: Vec<Firing>,

    /// Fingerprint of the rule set the run used.
    pub rule_set_fingerprint: String,
}

impl InferenceOutcome {
    /// Returns true if the rule fired during the run.
    #[must_use]
    pub fn has_fired(&self, rule_id: &RuleId) -> bool {
        self.fired.contains(rule_id)
    }
}

/// Forward-chaining CF inference engine.
///
/// The engine holds only configuration. All working state (known facts and
/// the fired set) belongs to a single call to [`InferenceEngine::run`], so one
/// engine can serve concurrent runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngine {
    config: EngineConfig,
}

/// Evidence one rule contributes in a pass.
struct Contribution<'r> {
    rule: &'r Rule,
    found: RuleMatch,
}

impl InferenceEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run inference from the given initial facts to a fixpoint.
    ///
    /// The caller's rules and facts are not modified.
    #[must_use]
    pub fn run(&self, rules: &RuleSet, initial_facts: &Facts) -> InferenceOutcome {
        let mut known = initial_facts.clone();
        let mut fired_set: HashSet<&RuleId> = HashSet::with_capacity(rules.len());
        let mut fired = Vec::new();
        let mut trace = Vec::new();
        let mut passes = 0;

        loop {
            // Matching reads the pass-start snapshot so that rule order within
            // a pass cannot change what any rule sees.
            let mut contributions: Vec<Contribution<'_>> = rules
                .iter()
                .filter(|rule| !fired_set.contains(rule.id()))
                .filter_map(|rule| rule.evaluate(&known).map(|found| Contribution { rule, found }))
                .collect();

            if contributions.is_empty() {
                break;
            }
            passes += 1;

            // Canonical application order keeps the floating-point result
            // independent of rule order.
            contributions.sort_by(|a, b| {
                a.rule
                    .conclusion()
                    .cmp(b.rule.conclusion())
                    .then_with(|| a.found.inferred.value().total_cmp(&b.found.inferred.value()))
                    .then_with(|| a.rule.id().cmp(b.rule.id()))
            });

            tracing::trace!(pass = passes, firing = contributions.len(), "inference pass");

            for Contribution { rule, found } in contributions {
                let resulting = known.reinforce(rule.conclusion().clone(), found.inferred);
                fired_set.insert(rule.id());
                fired.push(rule.id().clone());

                tracing::trace!(
                    pass = passes,
                    rule = %rule.id(),
                    conclusion = %rule.conclusion(),
                    matched = found.matched.len(),
                    premises = rule.premises().len(),
                    inferred = found.inferred.value(),
                    resulting = resulting.value(),
                    "rule fired"
                );

                if self.config.record_trace {
                    trace.push(Firing {
                        pass: passes,
                        rule_id: rule.id().clone(),
                        premise_count: rule.premises().len(),
                        ratio: found.ratio,
                        premise_cf: found.premise_cf,
                        weight: rule.weight(),
                        inferred_cf: found.inferred,
                        conclusion: rule.conclusion().clone(),
                        resulting_cf: resulting,
                        matched: found.matched,
                    });
                }
            }
        }

        tracing::debug!(
            rules = rules.len(),
            fired = fired.len(),
            passes,
            facts = known.len(),
            derived = known.len().saturating_sub(initial_facts.len()),
            "inference reached fixpoint"
        );

        InferenceOutcome {
            facts: known,
            fired,
            passes,
            trace,
            rule_set_fingerprint: rules.fingerprint().to_owned(),
        }
    }

    /// Run inference seeded from captured evidence.
    #[must_use]
    pub fn run_with_evidence(&self, rules: &RuleSet, evidence: &Evidence) -> InferenceOutcome {
        self.run(rules, evidence.facts())
    }
}

/// Derive every reachable fact and its combined confidence.
///
/// # Examples
///
/// ```
/// use cfchain::{infer, Evidence, Rule, RuleSet};
///
/// let rules = RuleSet::new(vec![
///     Rule::builder(1u64).premises(["a", "b"]).conclusion("x").weight(0.8).build().unwrap(),
/// ])
/// .unwrap();
/// let facts = infer(&rules, Evidence::from_checked(["a"]).facts());
/// assert!((facts.get("x").unwrap().value() - 0.4).abs() < 1e-12);
/// ```
#[must_use]
pub fn infer(rules: &RuleSet, initial_facts: &Facts) -> Facts {
    InferenceEngine::default().run(rules, initial_facts).facts
}

/// [`infer`] for raw caller input, validating confidences at run entry.
///
/// # Errors
///
/// Returns `ValidationError::InvalidConfidence` if any initial confidence is
/// NaN or outside [0.0, 1.0]; no inference is performed in that case.
pub fn infer_raw<I, F>(rules: &RuleSet, initial_facts: I) -> Result<Facts, ValidationError>
where
    I: IntoIterator<Item = (F, f64)>,
    F: Into<FactId>,
{
    let evidence = Evidence::from_raw(initial_facts)?;
    Ok(infer(rules, evidence.facts()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::Confidence;

    const EPS: f64 = 1e-12;

    fn rule(id: &str, premises: &[&str], conclusion: &str, weight: f64) -> Rule {
        Rule::builder(id)
            .premises(premises.iter().copied())
            .conclusion(conclusion)
            .weight(weight)
            .build()
            .unwrap()
    }

    fn checked(ids: &[&str]) -> Facts {
        Evidence::from_checked(ids.iter().copied()).into_facts()
    }

    fn value(facts: &Facts, id: &str) -> f64 {
        facts.get(id).map(Confidence::value).unwrap_or(f64::NAN)
    }

    #[test]
    fn full_match_uses_rule_weight() {
        let rules = RuleSet::new(vec![rule("1", &["a", "b"], "x", 0.8)]).unwrap();
        let out = infer(&rules, &checked(&["a", "b"]));
        assert!((value(&out, "x") - 0.8).abs() < EPS);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn partial_match_is_penalized() {
        let rules = RuleSet::new(vec![rule("1", &["a", "b"], "x", 0.8)]).unwrap();
        let out = infer(&rules, &checked(&["a"]));
        assert!((value(&out, "x") - 0.4).abs() < EPS);
    }

    #[test]
    fn independent_rules_combine() {
        let rules = RuleSet::new(vec![
            rule("1", &["a"], "x", 0.6),
            rule("2", &["b"], "x", 0.5),
        ])
        .unwrap();
        let out = infer(&rules, &checked(&["a", "b"]));
        assert!((value(&out, "x") - 0.8).abs() < EPS);
    }

    #[test]
    fn chained_rules_take_one_pass_per_link() {
        let rules = RuleSet::new(vec![
            rule("r1", &["a"], "b", 0.5),
            rule("r2", &["b"], "c", 0.5),
        ])
        .unwrap();
        let outcome = InferenceEngine::default().run(&rules, &checked(&["a"]));
        assert_eq!(outcome.passes, 2);
        assert!((value(&outcome.facts, "b") - 0.5).abs() < EPS);
        assert!((value(&outcome.facts, "c") - 0.25).abs() < EPS);
        assert_eq!(outcome.fired, vec![RuleId::from("r1"), RuleId::from("r2")]);
    }

    #[test]
    fn empty_evidence_derives_nothing() {
        let rules = RuleSet::new(vec![rule("1", &["a"], "x", 1.0)]).unwrap();
        let outcome = InferenceEngine::default().run(&rules, &Facts::new());
        assert!(outcome.facts.is_empty());
        assert_eq!(outcome.passes, 0);
        assert!(outcome.fired.is_empty());
    }

    #[test]
    fn empty_rule_set_returns_initial_facts() {
        let initial = checked(&["a", "b"]);
        let out = infer(&RuleSet::default(), &initial);
        assert_eq!(out, initial);
    }

    #[test]
    fn cyclic_rules_fire_once_each() {
        let rules = RuleSet::new(vec![
            rule("ab", &["a"], "b", 0.9),
            rule("ba", &["b"], "a", 0.9),
            rule("self", &["a", "z"], "a", 0.5),
        ])
        .unwrap();
        let outcome = InferenceEngine::default().run(&rules, &checked(&["a"]));
        assert_eq!(outcome.fired.len(), 3);
        assert!(outcome.passes <= rules.len());
        // pass 1: ab fires (b = 0.9), self fires (a stays 1.0)
        // pass 2: ba fires, a stays saturated at 1.0
        assert_eq!(value(&outcome.facts, "a"), 1.0);
        assert!((value(&outcome.facts, "b") - 0.9).abs() < EPS);
    }

    #[test]
    fn rule_conclusion_receives_exactly_one_contribution() {
        // "loop" could re-derive x every pass; x must reflect a single firing.
        let rules = RuleSet::new(vec![
            rule("seed", &["a"], "x", 0.5),
            rule("loop", &["x"], "x", 0.5),
        ])
        .unwrap();
        let outcome = InferenceEngine::new(EngineConfig::traced()).run(&rules, &checked(&["a"]));
        assert_eq!(outcome.fired.iter().filter(|id| id.as_str() == "loop").count(), 1);
        // pass 1: x = 0.5; pass 2: x = combine(0.5, 0.25) = 0.625
        assert!((value(&outcome.facts, "x") - 0.625).abs() < EPS);
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.trace[1].pass, 2);
    }

    #[test]
    fn rules_match_against_pass_start_snapshot() {
        // "late" lists "b" which only appears after "early" fires; it fires in
        // pass 1 on "a" alone whatever the declaration order.
        let forward = vec![rule("early", &["a"], "b", 1.0), rule("late", &["a", "b"], "c", 1.0)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let initial = checked(&["a"]);
        let out_fwd = infer(&RuleSet::new(forward).unwrap(), &initial);
        let out_rev = infer(&RuleSet::new(reversed).unwrap(), &initial);
        assert_eq!(out_fwd, out_rev);
        assert!((value(&out_fwd, "c") - 0.5).abs() < EPS);
    }

    #[test]
    fn zero_confidence_premise_still_fires() {
        let rules = RuleSet::new(vec![rule("1", &["a"], "x", 0.9)]).unwrap();
        let mut initial = Facts::new();
        initial.insert("a", Confidence::ZERO);
        let outcome = InferenceEngine::default().run(&rules, &initial);
        assert_eq!(outcome.facts.get("x"), Some(Confidence::ZERO));
        assert_eq!(outcome.fired.len(), 1);
    }

    #[test]
    fn inert_rules_are_not_errors() {
        let rules = RuleSet::new(vec![rule("1", &["never"], "x", 1.0)]).unwrap();
        let out = infer(&rules, &checked(&["a"]));
        assert!(!out.contains("x"));
    }

    #[test]
    fn caller_inputs_are_untouched() {
        let rules = RuleSet::new(vec![rule("1", &["a"], "x", 0.7)]).unwrap();
        let initial = checked(&["a"]);
        let snapshot = initial.clone();
        let _ = infer(&rules, &initial);
        assert_eq!(initial, snapshot);
    }

    #[test]
    fn trace_records_each_firing() {
        let rules = RuleSet::new(vec![rule("1", &["a", "b"], "x", 0.8)]).unwrap();
        let outcome = InferenceEngine::new(EngineConfig::traced()).run(&rules, &checked(&["a"]));
        assert_eq!(outcome.trace.len(), 1);
        let firing = &outcome.trace[0];
        assert!(firing.is_partial());
        assert_eq!(firing.premise_count, 2);
        assert!((firing.inferred_cf.value() - 0.4).abs() < EPS);
        assert_eq!(outcome.rule_set_fingerprint, rules.fingerprint());

        let untraced = InferenceEngine::default().run(&rules, &checked(&["a"]));
        assert!(untraced.trace.is_empty());
    }

    #[test]
    fn infer_raw_validates_at_entry() {
        let rules = RuleSet::new(vec![rule("1", &["a"], "x", 0.5)]).unwrap();
        let ok = infer_raw(&rules, [("a", 1.0)]).unwrap();
        assert!((value(&ok, "x") - 0.5).abs() < EPS);

        let err = infer_raw(&rules, [("a", 1.5)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfidence { .. }));
    }
}
