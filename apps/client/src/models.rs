//! Domain types owned by the client.
//!
//! Identifiers are opaque backend-assigned strings, never minted locally.
//! Display names are always recomputed from the filename, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::types::{ResumeRecord, TailorResponse, TailoredRecord};

/// ATS score substituted when the backend omits `ats_score_estimate`.
pub const DEFAULT_ATS_SCORE: u8 = 75;

/// The display contract only ever shows this many matched skills.
pub const MAX_MATCHED_SKILLS: usize = 8;

/// Extracted resume text as a two-phase value.
///
/// An optimistic upload inserts `Pending` until the next `load()` refreshes
/// it. An empty `Populated` string means the backend genuinely extracted
/// nothing; the two must not be conflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    Pending,
    Populated(String),
}

impl ExtractedText {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// One uploaded resume in the local cache.
#[derive(Debug, Clone)]
pub struct Resume {
    pub id: String,
    pub file_name: String,
    pub text: ExtractedText,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<ResumeRecord> for Resume {
    fn from(record: ResumeRecord) -> Self {
        Resume {
            id: record.id,
            file_name: record.original_file_path,
            text: ExtractedText::Populated(record.extracted_text),
            created_at: record.created_at,
            last_used_at: record.last_used_at,
        }
    }
}

/// Backend status of a tailored resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailoredStatus {
    Pending,
    Completed,
    Failed,
}

/// A job-specific derivative of a resume. Immutable once created; the job
/// description is a snapshot copied at tailoring time.
#[derive(Debug, Clone)]
pub struct TailoredResume {
    pub id: String,
    pub job_description: String,
    pub status: TailoredStatus,
    pub pdf_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<TailoredRecord> for TailoredResume {
    fn from(record: TailoredRecord) -> Self {
        TailoredResume {
            id: record.id,
            job_description: record.job_description,
            status: record.status,
            pdf_path: record.pdf_path,
            created_at: record.created_at,
        }
    }
}

/// Display-only projection of a tailoring response. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// ATS compatibility score, 0 to 100.
    pub ats_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    /// Projects a tailoring response into display data, substituting safe
    /// defaults for any absent field: a mid-range score and empty lists.
    pub fn from_response(response: &TailorResponse) -> Self {
        let structured = response.structured_data.clone().unwrap_or_default();
        AnalysisResult {
            ats_score: response.ats_score_estimate.unwrap_or(DEFAULT_ATS_SCORE),
            matched_skills: structured
                .key_skills
                .into_iter()
                .take(MAX_MATCHED_SKILLS)
                .collect(),
            missing_skills: structured.missing_keywords,
            suggestions: structured.optimization_suggestions,
        }
    }
}

/// A generated cover letter and its downloadable artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverLetter {
    pub text: String,
    pub pdf_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_response() -> TailorResponse {
        serde_json::from_str(r#"{"tailored_resume_id": "t-1", "pdf_path": "/static/t-1.pdf"}"#)
            .unwrap()
    }

    #[test]
    fn test_analysis_defaults_when_structured_data_missing() {
        let analysis = AnalysisResult::from_response(&bare_response());
        assert_eq!(analysis.ats_score, DEFAULT_ATS_SCORE);
        assert!(analysis.matched_skills.is_empty());
        assert!(analysis.missing_skills.is_empty());
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn test_analysis_caps_matched_skills() {
        let json = serde_json::json!({
            "tailored_resume_id": "t-1",
            "pdf_path": "/static/t-1.pdf",
            "ats_score_estimate": 91,
            "structured_data": {
                "key_skills": ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
                "missing_keywords": ["kafka"],
                "optimization_suggestions": ["quantify achievements"]
            }
        });
        let response: TailorResponse = serde_json::from_value(json).unwrap();
        let analysis = AnalysisResult::from_response(&response);
        assert_eq!(analysis.ats_score, 91);
        assert_eq!(analysis.matched_skills.len(), MAX_MATCHED_SKILLS);
        assert_eq!(analysis.missing_skills, vec!["kafka".to_string()]);
        assert_eq!(analysis.suggestions.len(), 1);
    }

    #[test]
    fn test_pending_text_is_not_empty_text() {
        assert!(ExtractedText::Pending.is_pending());
        assert!(!ExtractedText::Populated(String::new()).is_pending());
        assert_ne!(ExtractedText::Pending, ExtractedText::Populated(String::new()));
    }
}
