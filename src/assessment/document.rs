use anyhow::{bail, Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::status::AssessmentStatus;
use crate::scoring::{
    process_assessment_responses, try_score_to_fuk, AggregatedResult, AssessmentTree, Response,
};

/// Assessment framework variant. All three share the KKA > Aspect >
/// Parameter > Factor shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkKind {
    #[default]
    Gcg,
    Acgs,
    Pugki,
}

impl std::fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FrameworkKind::Gcg => "GCG",
            FrameworkKind::Acgs => "ACGS",
            FrameworkKind::Pugki => "PUGKI",
        };
        f.write_str(name)
    }
}

/// Overall scores persisted back onto the assessment after aggregation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AssessmentSummary {
    pub overall_score: f64,
    pub overall_fuk: f64,
    pub total_factors: usize,
    pub completed_factors: usize,
    pub scored_at: DateTime<Utc>,
}

/// One assessment: its dictionary, the responses collected so far, and
/// the workflow state.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AssessmentDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub framework: FrameworkKind,
    #[serde(default)]
    pub status: AssessmentStatus,
    #[serde(default)]
    pub dictionary: AssessmentTree,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AssessmentDocument {
    pub fn new(id: impl Into<String>, dictionary: AssessmentTree) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            year: None,
            framework: FrameworkKind::default(),
            status: AssessmentStatus::default(),
            dictionary,
            responses: Vec::new(),
            result: None,
            updated_at: None,
        }
    }

    /// Run the aggregator over this document's dictionary and responses
    pub fn score(&self) -> Result<AggregatedResult> {
        process_assessment_responses(&self.responses, &self.dictionary)
            .with_context(|| format!("Failed to score assessment '{}'", self.id))
    }

    /// Store the overall scores from an aggregation run
    pub fn apply_result(&mut self, result: &AggregatedResult, now: DateTime<Utc>) {
        self.result = Some(AssessmentSummary {
            overall_score: result.overall_score,
            overall_fuk: result.overall_fuk,
            total_factors: result.total_factors,
            completed_factors: result.completed_factors,
            scored_at: now,
        });
        self.updated_at = Some(now);
    }

    /// Move the workflow to `target`, rejecting transitions the workflow
    /// does not allow
    pub fn transition(&mut self, target: AssessmentStatus, now: DateTime<Utc>) -> Result<()> {
        self.status = self
            .status
            .transition_to(target)
            .with_context(|| format!("Assessment '{}'", self.id))?;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Record (or replace) the response for one factor.
    ///
    /// Only allowed while the assessment is still editable, and only for
    /// factors in the dictionary.
    pub fn record_response(&mut self, factor_id: &str, score: f64, now: DateTime<Utc>) -> Result<()> {
        if !self.status.is_editable() {
            bail!(
                "Assessment '{}' is {}; responses can no longer be changed",
                self.id,
                self.status
            );
        }
        try_score_to_fuk(score)?;

        let Some(factor) = self.dictionary.factors().find(|f| f.id == factor_id) else {
            bail!("Factor '{}' is not part of assessment '{}'", factor_id, self.id);
        };
        if score < 0.0 || score > factor.max_score {
            bail!(
                "Score {} for factor '{}' is outside 0..{}",
                score,
                factor_id,
                factor.max_score
            );
        }

        self.responses.retain(|r| r.factor_id != factor_id);
        self.responses.push(Response::new(factor_id, score));
        self.updated_at = Some(now);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

fn format_for(path: &Path) -> Result<DocumentFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DocumentFormat::Json),
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Ok(DocumentFormat::Yaml)
        }
        _ => bail!(
            "Unsupported assessment file {}: expected .json, .yaml or .yml",
            path.display()
        ),
    }
}

/// Load an assessment document from a JSON or YAML file.
///
/// Children at every level of the dictionary are put in `sort` order.
pub fn load_document(path: &Path) -> Result<AssessmentDocument> {
    let format = format_for(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read assessment file at {}", path.display()))?;

    let mut document: AssessmentDocument = match format {
        DocumentFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse assessment: invalid JSON in {}", path.display()))?,
        DocumentFormat::Yaml => serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse assessment: invalid YAML in {}", path.display()))?,
    };

    document.dictionary.sort_children();
    debug!(
        id = %document.id,
        factors = document.dictionary.factor_count(),
        responses = document.responses.len(),
        "Loaded assessment from {}",
        path.display()
    );
    Ok(document)
}

/// Save an assessment document atomically, keeping the file's format.
pub fn save_document(path: &Path, document: &AssessmentDocument) -> Result<()> {
    let format = format_for(path)?;
    let content = match format {
        DocumentFormat::Json => {
            serde_json::to_string_pretty(document).context("Failed to serialize assessment")?
        }
        DocumentFormat::Yaml => {
            serde_saphyr::to_string(document).context("Failed to serialize assessment")?
        }
    };

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write assessment to {}", path.display()))?;
    file.commit().context("Failed to save assessment")?;

    debug!(id = %document.id, "Saved assessment to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const SAMPLE_JSON: &str = r#"{
        "id": "2026-gcg",
        "title": "GCG Assessment 2026",
        "year": 2026,
        "status": "in_progress",
        "dictionary": {
            "kkas": [{
                "id": 1,
                "name": "Komitmen",
                "aspects": [{
                    "id": 10,
                    "parameters": [{
                        "id": 100,
                        "factors": [
                            { "id": "f2", "sort": 2 },
                            { "id": "f1", "sort": 1 }
                        ]
                    }]
                }]
            }]
        },
        "responses": [
            { "factor_id": "f1", "score": 1.0 },
            { "factor_id": "f2", "score": 0.5 }
        ]
    }"#;

    fn sample() -> AssessmentDocument {
        serde_json::from_str(SAMPLE_JSON).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let doc: AssessmentDocument = serde_json::from_str(r#"{ "id": "x" }"#).unwrap();
        assert_eq!(doc.framework, FrameworkKind::Gcg);
        assert_eq!(doc.status, AssessmentStatus::Draft);
        assert!(doc.dictionary.kkas.is_empty());
        assert!(doc.result.is_none());
    }

    #[test]
    fn test_parse_framework_kind() {
        let doc: AssessmentDocument =
            serde_json::from_str(r#"{ "id": "x", "framework": "pugki" }"#).unwrap();
        assert_eq!(doc.framework, FrameworkKind::Pugki);
        assert_eq!(doc.framework.to_string(), "PUGKI");
    }

    #[test]
    fn test_score_and_apply_result() {
        let mut doc = sample();
        let result = doc.score().unwrap();
        let now = Utc::now();
        doc.apply_result(&result, now);

        let summary = doc.result.as_ref().unwrap();
        assert_eq!(summary.overall_fuk, 0.5);
        assert_eq!(summary.total_factors, 2);
        assert_eq!(summary.completed_factors, 2);
        assert_eq!(doc.updated_at, Some(now));
    }

    #[test]
    fn test_transition_updates_status() {
        let mut doc = sample();
        doc.transition(AssessmentStatus::Submitted, Utc::now()).unwrap();
        assert_eq!(doc.status, AssessmentStatus::Submitted);
        assert!(doc.transition(AssessmentStatus::Completed, Utc::now()).is_err());
        assert_eq!(doc.status, AssessmentStatus::Submitted);
    }

    #[test]
    fn test_record_response_replaces_existing() {
        let mut doc = sample();
        doc.record_response("f2", 0.9, Utc::now()).unwrap();
        let f2: Vec<_> = doc.responses.iter().filter(|r| r.factor_id == "f2").collect();
        assert_eq!(f2.len(), 1);
        assert_eq!(f2[0].score, 0.9);
    }

    #[test]
    fn test_record_response_rejects_bad_input() {
        let mut doc = sample();
        assert!(doc.record_response("missing", 0.5, Utc::now()).is_err());
        assert!(doc.record_response("f1", 1.5, Utc::now()).is_err());
        assert!(doc.record_response("f1", -0.1, Utc::now()).is_err());
        assert!(doc.record_response("f1", f64::NAN, Utc::now()).is_err());
    }

    #[test]
    fn test_record_response_locked_after_submit() {
        let mut doc = sample();
        doc.status = AssessmentStatus::Submitted;
        let err = doc.record_response("f1", 0.5, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("submitted"));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = env::temp_dir().join("gcg_score_test.txt");
        assert!(load_document(&path).is_err());
        assert!(save_document(&path, &sample()).is_err());
    }

    #[test]
    fn test_load_sorts_dictionary() {
        let path = env::temp_dir().join("gcg_score_test_sorted.json");
        std::fs::write(&path, SAMPLE_JSON).unwrap();

        let doc = load_document(&path).unwrap();
        let ids: Vec<_> = doc.dictionary.factors().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_roundtrip_json() {
        let path = env::temp_dir().join("gcg_score_test_roundtrip.json");
        let _ = std::fs::remove_file(&path);

        let mut doc = sample();
        doc.dictionary.sort_children();
        let result = doc.score().unwrap();
        doc.apply_result(&result, Utc::now());
        save_document(&path, &doc).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, doc);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_yaml() {
        let path = env::temp_dir().join("gcg_score_test_roundtrip.yaml");
        let _ = std::fs::remove_file(&path);

        let mut doc = sample();
        doc.dictionary.sort_children();
        save_document(&path, &doc).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.id, doc.id);
        assert_eq!(loaded.status, AssessmentStatus::InProgress);
        assert_eq!(loaded.dictionary.factor_count(), 2);
        assert_eq!(loaded.responses.len(), 2);

        let _ = std::fs::remove_file(&path);
    }
}
