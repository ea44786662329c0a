//! Firing records.
//!
//! When tracing is enabled on the engine, every rule firing is recorded so a
//! diagnosis can be explained step by step.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::fact::FactId;
use crate::rule::RuleId;

/// One rule firing within an inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firing {
    /// Pass in which the rule fired, starting at 1.
    pub pass: usize,

    /// Rule that fired.
    pub rule_id: RuleId,

    /// Premises known when the rule was matched.
    pub matched: Vec<FactId>,

    /// Number of premises the rule declares.
    pub premise_count: usize,

    /// `|matched| / premise_count`.
    pub ratio: f64,

    /// Weakest matched premise.
    pub premise_cf: Confidence,

    /// Rule weight.
    pub weight: Confidence,

    /// Evidence contributed to the conclusion.
    pub inferred_cf: Confidence,

    /// Fact concluded.
    pub conclusion: FactId,

    /// Conclusion's confidence right after this firing was applied.
    pub resulting_cf: Confidence,
}

impl Firing {
    /// Returns true if the rule fired with only some premises known.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.matched.len() < self.premise_count
    }
}

impl fmt::Display for Firing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matched: Vec<&str> = self.matched.iter().map(FactId::as_str).collect();
        write!(
            f,
            "pass {}: rule {} [{}] ({}/{} premises) -> {} += {} x {:.2} x {} = {} (now {})",
            self.pass,
            self.rule_id,
            matched.join(", "),
            self.matched.len(),
            self.premise_count,
            self.conclusion,
            self.premise_cf,
            self.ratio,
            self.weight,
            self.inferred_cf,
            self.resulting_cf,
        )
    }
}
