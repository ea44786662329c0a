//! Diagnosis results.
//!
//! Turns an inference result into the ranked list a front end shows: symptoms
//! are filtered out, the remaining conclusions are sorted by descending
//! confidence and paired with a label and an optional description.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::error::{CfError, LoadError};
use crate::fact::{FactId, Facts};

/// Free-text descriptions keyed by diagnosis id.
///
/// The engine never reads these; they are attached to results for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<FactId, String>);

impl Annotations {
    /// Creates an empty annotation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object mapping diagnosis ids to descriptions.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Json` if the input is not such an object.
    pub fn from_json_str(json: &str) -> Result<Self, CfError> {
        serde_json::from_str(json).map_err(|source| {
            LoadError::Json {
                origin: "annotations".to_string(),
                source,
            }
            .into()
        })
    }

    /// Adds or replaces a description.
    pub fn insert(&mut self, fact: impl Into<FactId>, description: impl Into<String>) {
        self.0.insert(fact.into(), description.into());
    }

    /// Returns the description of a diagnosis, if any.
    #[must_use]
    pub fn get(&self, fact: &str) -> Option<&str> {
        self.0.get(fact).map(String::as_str)
    }

    /// Number of descriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no descriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Filtering applied when building a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    /// Conclusions below this confidence are left out.
    pub min_confidence: Confidence,
    /// Keep at most this many diagnoses.
    pub limit: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::ZERO,
            limit: None,
        }
    }
}

/// One ranked conclusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Concluded fact.
    pub fact: FactId,
    /// Display label.
    pub label: String,
    /// Combined confidence.
    pub confidence: Confidence,
    /// Description from the annotation table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Diagnosis {
    /// Confidence as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.confidence.percent()
    }
}

/// Ranked diagnoses from one inference run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosisReport(Vec<Diagnosis>);

impl DiagnosisReport {
    /// Build a report from an inference result.
    ///
    /// Facts whose id is in `symptoms` are excluded. Ties in confidence are
    /// ordered by fact id.
    #[must_use]
    pub fn build(
        facts: &Facts,
        symptoms: &BTreeSet<FactId>,
        annotations: &Annotations,
        options: &ReportOptions,
    ) -> Self {
        let mut entries: Vec<Diagnosis> = facts
            .iter()
            .filter(|(id, _)| !symptoms.contains(*id))
            .filter(|(_, cf)| *cf >= options.min_confidence)
            .map(|(id, cf)| Diagnosis {
                fact: id.clone(),
                label: id.label(),
                confidence: cf,
                description: annotations.get(id.as_str()).map(str::to_string),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.confidence
                .value()
                .total_cmp(&a.confidence.value())
                .then_with(|| a.fact.cmp(&b.fact))
        });
        if let Some(limit) = options.limit {
            entries.truncate(limit);
        }
        Self(entries)
    }

    /// Diagnoses, most confident first.
    #[must_use]
    pub fn entries(&self) -> &[Diagnosis] {
        &self.0
    }

    /// The most confident diagnosis.
    #[must_use]
    pub fn top(&self) -> Option<&Diagnosis> {
        self.0.first()
    }

    /// Number of diagnoses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing could be diagnosed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DiagnosisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== DIAGNOSIS ===")?;
        writeln!(f)?;
        if self.0.is_empty() {
            return writeln!(f, "No diagnosis can be drawn from the selected symptoms.");
        }
        for d in &self.0 {
            writeln!(f, "{} : {:.1}%", d.label, d.percent())?;
            if let Some(description) = &d.description {
                writeln!(f, "   {description}")?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
