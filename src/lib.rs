//! # cfchain - Forward-chaining diagnosis with certainty factors
//!
//! cfchain derives diagnostic conclusions from observed symptoms. A knowledge
//! base of weighted if-then rules is fired forward from the observations until
//! no rule can fire any more; evidence for the same conclusion from several
//! rules is merged with the Certainty Factor combination rule.
//!
//! ## Core Concepts
//!
//! - **Confidence**: a certainty factor in [0, 1]
//! - **Rule**: premises, one conclusion and a weight; may fire on a partial match
//! - **RuleSet**: a validated, immutable collection of rules
//! - **Evidence**: the initially observed facts, each at 1.0 when checked
//! - **InferenceEngine**: runs rules to a fixpoint, each rule firing at most once
//!
//! ## Usage
//!
//! ```
//! use cfchain::{infer, Evidence, RuleSet};
//!
//! let rules = RuleSet::from_json_str(r#"[
//!     {"id": 1, "if": ["a"], "then": "x", "cf": 0.6},
//!     {"id": 2, "if": ["b"], "then": "x", "cf": 0.5}
//! ]"#)?;
//! let facts = infer(&rules, Evidence::from_checked(["a", "b"]).facts());
//! assert!((facts.get("x").unwrap().value() - 0.8).abs() < 1e-12);
//! # Ok::<(), cfchain::CfError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod confidence;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fact;
pub mod loader;
pub mod report;
pub mod rule;
pub mod rule_set;
pub mod trace;

// Re-export primary types at crate root for convenience
pub use confidence::{combine, Confidence};
pub use engine::{infer, infer_raw, EngineConfig, InferenceEngine, InferenceOutcome};
pub use error::{CfError, CfResult, LoadError, ValidationError};
pub use evidence::Evidence;
pub use fact::{FactId, Facts};
pub use loader::{load_annotations, load_rules};
pub use report::{Annotations, Diagnosis, DiagnosisReport, ReportOptions};
pub use rule::{Rule, RuleBuilder, RuleId, RuleMatch, RuleRecord};
pub use rule_set::RuleSet;
pub use trace::Firing;
