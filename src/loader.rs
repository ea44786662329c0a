//! Reading rule and annotation files.
//!
//! Rule files are JSON arrays of rule records; annotation files are JSON
//! objects mapping diagnosis ids to descriptions. Both are validated in full
//! before anything is returned.

use std::fs;
use std::path::Path;

use crate::error::{CfResult, LoadError};
use crate::report::Annotations;
use crate::rule::RuleRecord;
use crate::rule_set::RuleSet;

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, contents: &str) -> Result<T, LoadError> {
    serde_json::from_str(contents).map_err(|source| LoadError::Json {
        origin: path.display().to_string(),
        source,
    })
}

/// Load and validate a rule file.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, `LoadError::Json` if it
/// is not a JSON array of rule records, and `CfError::Validation` if a rule is
/// invalid or two rules share an id.
pub fn load_rules(path: impl AsRef<Path>) -> CfResult<RuleSet> {
    let path = path.as_ref();
    let records: Vec<RuleRecord> = parse(path, &read(path)?)?;
    let rules = RuleSet::from_records(records)?;
    tracing::debug!(
        path = %path.display(),
        rules = rules.len(),
        symptoms = rules.symptoms().len(),
        "loaded rule set"
    );
    Ok(rules)
}

/// Load an annotation file.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read and `LoadError::Json`
/// if it is not a JSON object of strings.
pub fn load_annotations(path: impl AsRef<Path>) -> CfResult<Annotations> {
    let path = path.as_ref();
    let annotations: Annotations = parse(path, &read(path)?)?;
    tracing::debug!(path = %path.display(), entries = annotations.len(), "loaded annotations");
    Ok(annotations)
}
