//! Wire types for the ApplyMate backend API.
//!
//! Deserialization is deliberately tolerant: the backend may omit arrays or
//! the whole `structured_data` block, and every consumer substitutes safe
//! defaults rather than failing (see `AnalysisResult` in `models`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TailoredStatus;

/// One stored resume as returned by `GET /api/resumes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    /// Original filename (the backend may return a full storage path).
    pub original_file_path: String,
    #[serde(default)]
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One tailored derivative as returned by `GET /api/resumes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoredRecord {
    pub id: String,
    pub job_description: String,
    pub status: TailoredStatus,
    pub pdf_path: String,
    pub created_at: DateTime<Utc>,
}

/// Response body of `GET /api/resumes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeListing {
    #[serde(default)]
    pub resumes: Vec<ResumeRecord>,
    #[serde(default)]
    pub tailored: Vec<TailoredRecord>,
}

/// Response body of `POST /api/resume/upload`. Only `resume_id` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub resume_id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// The analysis block nested in a tailoring response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredData {
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub optimization_suggestions: Vec<String>,
}

/// Response body of `POST /api/resume/tailor`.
#[derive(Debug, Clone, Deserialize)]
pub struct TailorResponse {
    pub tailored_resume_id: String,
    pub pdf_path: String,
    #[serde(default)]
    pub ats_score_estimate: Option<u8>,
    #[serde(default)]
    pub structured_data: Option<StructuredData>,
}

/// Response body of `POST /api/resume/cover-letter`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterResponse {
    pub cover_letter_text: String,
    pub pdf_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_tolerates_missing_arrays() {
        let listing: ResumeListing = serde_json::from_str("{}").unwrap();
        assert!(listing.resumes.is_empty());
        assert!(listing.tailored.is_empty());
    }

    #[test]
    fn test_resume_record_tolerates_missing_text() {
        let json = r#"{
            "id": "r-1",
            "original_file_path": "john-smith-resume.pdf",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let record: ResumeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "r-1");
        assert!(record.extracted_text.is_empty());
        assert!(record.last_used_at.is_none());
    }

    #[test]
    fn test_tailor_response_without_structured_data() {
        let json = r#"{"tailored_resume_id": "t-1", "pdf_path": "/static/t-1.pdf"}"#;
        let response: TailorResponse = serde_json::from_str(json).unwrap();
        assert!(response.ats_score_estimate.is_none());
        assert!(response.structured_data.is_none());
    }

    #[test]
    fn test_tailored_record_status_parses_lowercase() {
        let json = r#"{
            "id": "t-1",
            "job_description": "Senior Engineer role",
            "status": "completed",
            "pdf_path": "/static/t-1.pdf",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let record: TailoredRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, TailoredStatus::Completed);
    }
}
