//! Error types for cfchain.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific failure. Validation happens before a run starts; a run
//! itself never fails.

use std::path::PathBuf;

use thiserror::Error;

use crate::fact::FactId;
use crate::rule::RuleId;

/// Validation errors raised while building rules, rule sets and evidence.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Confidence value {value} is out of range [0.0, 1.0]")]
    ConfidenceOutOfRange {
        value: f64,
    },

    #[error("Invalid rule '{rule_id}': {reason}")]
    InvalidRule {
        rule_id: RuleId,
        reason: String,
    },

    #[error("Initial fact '{fact}' has confidence {value} outside [0.0, 1.0]")]
    InvalidConfidence {
        fact: FactId,
        value: f64,
    },

    #[error("Rule id '{rule_id}' is used by more than one rule")]
    DuplicateRuleId {
        rule_id: RuleId,
    },
}

impl ValidationError {
    pub(crate) fn invalid_rule(rule_id: &RuleId, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule_id: rule_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Errors reading rule or annotation sources.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error type for cfchain.
#[derive(Debug, Error)]
pub enum CfError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

impl CfError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }
}

/// Result type alias for cfchain operations.
pub type CfResult<T> = Result<T, CfError>;
