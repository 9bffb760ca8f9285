//! Backend API client: the single point of entry for all ApplyMate backend
//! calls in this crate.
//!
//! ARCHITECTURAL RULE: no other module may issue HTTP requests directly.
//! The repository and the orchestrator hold an `Arc<dyn BackendApi>`, so
//! tests swap in a mock without touching any caller code.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ClientError;

pub mod types;

use types::{CoverLetterResponse, ResumeListing, TailorResponse, UploadReceipt};

/// Template identifier sent with tailoring and auto-apply requests.
pub const DEFAULT_TEMPLATE: &str = "default";

/// The backend contract consumed by the workflow core.
///
/// Every method maps to exactly one HTTP call. Implementations convert all
/// failures into [`ClientError`] values; no panics, no raw reqwest errors.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /api/resumes`: the full resume and tailored-resume listing.
    async fn list_resumes(&self) -> Result<ResumeListing, ClientError>;

    /// `POST /api/resume/upload`: multipart upload of one document.
    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError>;

    /// `DELETE /api/resumes/{id}`. A 404 is mapped to success: deleting
    /// something already gone is not an error.
    async fn delete_resume(&self, resume_id: &str) -> Result<(), ClientError>;

    /// `POST /api/resume/tailor`: multipart `resume_id` + `job_description`
    /// + `template`.
    async fn tailor_resume(
        &self,
        resume_id: &str,
        job_description: &str,
        template: &str,
    ) -> Result<TailorResponse, ClientError>;

    /// `POST /api/resume/cover-letter`: multipart; empty strings are sent
    /// for unspecified company / hiring manager.
    async fn generate_cover_letter(
        &self,
        resume_id: &str,
        job_description: &str,
        company_name: &str,
        hiring_manager: &str,
    ) -> Result<CoverLetterResponse, ClientError>;

    /// `POST /api/jobs/apply`: JSON auto-apply submission. A 2xx response
    /// means accepted; the body is not consumed.
    async fn submit_job_application(
        &self,
        job_url: &str,
        template: &str,
    ) -> Result<(), ClientError>;

    /// Absolute URL for a backend artifact path (`pdf_path`). The artifact
    /// is opened in an external viewer, never parsed by this client.
    fn artifact_url(&self, pdf_path: &str) -> String {
        pdf_path.to_string()
    }
}

/// Reqwest-backed implementation of [`BackendApi`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Self {
        HttpBackend {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Drains a non-2xx response into a [`ClientError::Api`].
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!("backend returned {status}: {message}");
        ClientError::Api { status, message }
    }
}

/// Extracts the FastAPI `detail` field from an error body, falling back to
/// the raw body (or a placeholder when empty).
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: String,
    }

    if let Ok(parsed) = serde_json::from_str::<Detail>(body) {
        return parsed.detail;
    }
    if body.trim().is_empty() {
        "no error detail provided".to_string()
    } else {
        body.to_string()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn list_resumes(&self) -> Result<ResumeListing, ClientError> {
        let response = self.client.get(self.url("/api/resumes")).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let listing: ResumeListing = response.json().await?;
        debug!(
            "listed {} resumes, {} tailored",
            listing.resumes.len(),
            listing.tailored.len()
        );
        Ok(listing)
    }

    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/resume/upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete_resume(&self, resume_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/resumes/{resume_id}")))
            .send()
            .await?;
        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Self::api_error(response).await)
    }

    async fn tailor_resume(
        &self,
        resume_id: &str,
        job_description: &str,
        template: &str,
    ) -> Result<TailorResponse, ClientError> {
        let form = Form::new()
            .text("resume_id", resume_id.to_string())
            .text("job_description", job_description.to_string())
            .text("template", template.to_string());

        let response = self
            .client
            .post(self.url("/api/resume/tailor"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn generate_cover_letter(
        &self,
        resume_id: &str,
        job_description: &str,
        company_name: &str,
        hiring_manager: &str,
    ) -> Result<CoverLetterResponse, ClientError> {
        let form = Form::new()
            .text("resume_id", resume_id.to_string())
            .text("job_description", job_description.to_string())
            .text("company_name", company_name.to_string())
            .text("hiring_manager", hiring_manager.to_string());

        let response = self
            .client
            .post(self.url("/api/resume/cover-letter"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn submit_job_application(
        &self,
        job_url: &str,
        template: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/api/jobs/apply"))
            .json(&serde_json::json!({ "job_url": job_url, "template": template }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    fn artifact_url(&self, pdf_path: &str) -> String {
        self.url(pdf_path)
    }
}
