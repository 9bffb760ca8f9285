//! Shared test double for [`BackendApi`]. Scripts responses per endpoint,
//! counts calls, and can gate the tailoring endpoint behind a `Notify` to
//! hold a request in flight while a test pokes at the workflow.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use crate::api::types::{
    CoverLetterResponse, ResumeListing, ResumeRecord, TailorResponse, UploadReceipt,
};
use crate::api::BackendApi;
use crate::errors::ClientError;

#[derive(Default)]
pub(crate) struct MockBackend {
    listing: Mutex<ResumeListing>,
    upload_receipt: Mutex<Option<String>>,
    tailor_queue: Mutex<VecDeque<Result<TailorResponse, ClientError>>>,
    cover_letter_queue: Mutex<VecDeque<Result<CoverLetterResponse, ClientError>>>,
    delete_queue: Mutex<VecDeque<Result<(), ClientError>>>,
    tailor_gate: Mutex<Option<Arc<Notify>>>,
    last_cover_letter_fields: Mutex<Option<(String, String)>>,
    upload_count: AtomicUsize,
    tailor_count: AtomicUsize,
    cover_letter_count: AtomicUsize,
    delete_count: AtomicUsize,
    apply_count: AtomicUsize,
}

impl MockBackend {
    pub fn set_resumes(&self, ids: &[&str]) {
        let records = ids
            .iter()
            .map(|id| ResumeRecord {
                id: id.to_string(),
                original_file_path: format!("{id}.pdf"),
                extracted_text: "Experienced engineer.".to_string(),
                created_at: Utc::now(),
                last_used_at: None,
            })
            .collect();
        self.listing.lock().unwrap().resumes = records;
    }

    pub fn set_upload_receipt(&self, resume_id: &str) {
        *self.upload_receipt.lock().unwrap() = Some(resume_id.to_string());
    }

    pub fn push_tailor_response(&self, json: serde_json::Value) {
        let response: TailorResponse = serde_json::from_value(json).unwrap();
        self.tailor_queue.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail_next_tailor(&self, status: u16, message: &str) {
        self.tailor_queue.lock().unwrap().push_back(Err(ClientError::Api {
            status,
            message: message.to_string(),
        }));
    }

    pub fn push_cover_letter(&self, text: &str, pdf_path: &str) {
        self.cover_letter_queue
            .lock()
            .unwrap()
            .push_back(Ok(CoverLetterResponse {
                cover_letter_text: text.to_string(),
                pdf_path: pdf_path.to_string(),
            }));
    }

    pub fn fail_next_cover_letter(&self, status: u16, message: &str) {
        self.cover_letter_queue
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Api {
                status,
                message: message.to_string(),
            }));
    }

    pub fn fail_next_delete(&self, status: u16, message: &str) {
        self.delete_queue.lock().unwrap().push_back(Err(ClientError::Api {
            status,
            message: message.to_string(),
        }));
    }

    /// Holds every subsequent tailor call until `open_tailor_gate`.
    pub fn gate_tailor(&self) {
        *self.tailor_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn open_tailor_gate(&self) {
        if let Some(gate) = self.tailor_gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    pub fn last_cover_letter_fields(&self) -> Option<(String, String)> {
        self.last_cover_letter_fields.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_count.load(Ordering::SeqCst)
    }

    pub fn tailor_calls(&self) -> usize {
        self.tailor_count.load(Ordering::SeqCst)
    }

    pub fn cover_letter_calls(&self) -> usize {
        self.cover_letter_count.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_count.load(Ordering::SeqCst)
    }

    fn unscripted(endpoint: &str) -> ClientError {
        ClientError::Api {
            status: 500,
            message: format!("no scripted {endpoint} response"),
        }
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn list_resumes(&self) -> Result<ResumeListing, ClientError> {
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn upload_resume(
        &self,
        _file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        match self.upload_receipt.lock().unwrap().clone() {
            Some(resume_id) => Ok(UploadReceipt {
                resume_id,
                filename: None,
            }),
            None => Err(Self::unscripted("upload")),
        }
    }

    async fn delete_resume(&self, _resume_id: &str) -> Result<(), ClientError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        // Unscripted deletes succeed: the real client maps 404 to Ok too.
        self.delete_queue.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn tailor_resume(
        &self,
        _resume_id: &str,
        _job_description: &str,
        _template: &str,
    ) -> Result<TailorResponse, ClientError> {
        self.tailor_count.fetch_add(1, Ordering::SeqCst);
        let gate = self.tailor_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.tailor_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("tailor")))
    }

    async fn generate_cover_letter(
        &self,
        _resume_id: &str,
        _job_description: &str,
        company_name: &str,
        hiring_manager: &str,
    ) -> Result<CoverLetterResponse, ClientError> {
        self.cover_letter_count.fetch_add(1, Ordering::SeqCst);
        *self.last_cover_letter_fields.lock().unwrap() =
            Some((company_name.to_string(), hiring_manager.to_string()));
        self.cover_letter_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("cover letter")))
    }

    async fn submit_job_application(
        &self,
        _job_url: &str,
        _template: &str,
    ) -> Result<(), ClientError> {
        self.apply_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
