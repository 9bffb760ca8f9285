//! Resume repository: the client-side cache and synchronization layer over
//! the backend's resume storage.
//!
//! Single source of truth for the resume set, the tailored derivatives, and
//! the last-used resume. `load()` replaces the cache wholesale (the
//! collection is small and per-user); removals are tombstoned so a stale
//! `load()` racing a `remove()` can never resurrect a deleted resume.
//!
//! Every network failure is logged here and returned as a result value. No
//! error propagates into the orchestrator as anything but a `ClientError`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::BackendApi;
use crate::errors::ClientError;
use crate::models::{ExtractedText, Resume, TailoredResume};

/// Upload allow-list. Checked locally before any network call.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

#[derive(Default)]
struct RepoCache {
    resumes: Vec<Resume>,
    tailored: Vec<TailoredResume>,
    last_used: Option<String>,
    /// Identifiers removed locally. A `load()` result is filtered against
    /// this set, so remove always wins over a slower concurrent load.
    tombstones: HashSet<String>,
}

pub struct ResumeRepository {
    api: Arc<dyn BackendApi>,
    cache: Mutex<RepoCache>,
}

impl ResumeRepository {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        ResumeRepository {
            api,
            cache: Mutex::new(RepoCache::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RepoCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the full resume and tailored listing and replaces the local
    /// cache. Tombstoned removals are re-applied to the result rather than
    /// trusting the fetched data to be newest.
    ///
    /// When no resume has been used yet, the first element of the backend's
    /// array becomes the last-used resume. The backend does not guarantee
    /// that order is chronological; this is a documented policy choice, not
    /// a recency fact.
    pub async fn load(&self) -> Result<(), ClientError> {
        let listing = match self.api.list_resumes().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("failed to load resumes: {e}");
                return Err(e);
            }
        };

        let mut cache = self.lock();
        let resumes: Vec<Resume> = listing
            .resumes
            .into_iter()
            .filter(|r| !cache.tombstones.contains(&r.id))
            .map(Resume::from)
            .collect();
        cache.resumes = resumes;
        cache.tailored = listing.tailored.into_iter().map(TailoredResume::from).collect();

        let last_used_still_present = cache
            .last_used
            .as_ref()
            .is_some_and(|id| cache.resumes.iter().any(|r| &r.id == id));
        if !last_used_still_present {
            cache.last_used = cache.resumes.first().map(|r| r.id.clone());
        }

        debug!(
            "resume cache refreshed: {} resumes, {} tailored",
            cache.resumes.len(),
            cache.tailored.len()
        );
        Ok(())
    }

    /// Uploads a resume document and optimistically prepends it to the
    /// cache. Disallowed file types are rejected locally with a validation
    /// error before any network I/O.
    ///
    /// The new entry carries `ExtractedText::Pending` until the next
    /// `load()` refreshes it; the backend extracts text asynchronously and
    /// the upload response does not include it.
    pub async fn upload(&self, path: &Path) -> Result<String, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation("invalid file name".to_string()))?
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ClientError::Validation(format!(
                "unsupported file type '{file_name}': only PDF or DOCX resumes are accepted"
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read {file_name}: {e}")))?;

        let receipt = match self.api.upload_resume(&file_name, bytes).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("upload of {file_name} failed: {e}");
                return Err(e);
            }
        };

        info!("uploaded {file_name} as resume {}", receipt.resume_id);
        let mut cache = self.lock();
        cache.resumes.insert(
            0,
            Resume {
                id: receipt.resume_id.clone(),
                file_name,
                text: ExtractedText::Pending,
                created_at: Utc::now(),
                last_used_at: None,
            },
        );
        Ok(receipt.resume_id)
    }

    /// Deletes a resume. Idempotent: the backend's "not found" is already
    /// mapped to success by the API client, so deleting something twice
    /// converges to the same local state.
    ///
    /// When the removed entry was the last-used resume, the next remaining
    /// resume takes its place (or none remain).
    pub async fn remove(&self, resume_id: &str) -> Result<(), ClientError> {
        if let Err(e) = self.api.delete_resume(resume_id).await {
            warn!("failed to delete resume {resume_id}: {e}");
            return Err(e);
        }

        let mut cache = self.lock();
        cache.tombstones.insert(resume_id.to_string());
        cache.resumes.retain(|r| r.id != resume_id);
        if cache.last_used.as_deref() == Some(resume_id) {
            cache.last_used = cache.resumes.first().map(|r| r.id.clone());
        }
        info!("removed resume {resume_id}");
        Ok(())
    }

    /// True when the id exists in the currently known resume set.
    pub fn contains(&self, resume_id: &str) -> bool {
        self.lock().resumes.iter().any(|r| r.id == resume_id)
    }

    /// Marks a resume as last-used. Returns false (and changes nothing)
    /// when the id is not in the cache.
    pub fn mark_last_used(&self, resume_id: &str) -> bool {
        let mut cache = self.lock();
        let Some(resume) = cache.resumes.iter_mut().find(|r| r.id == resume_id) else {
            return false;
        };
        resume.last_used_at = Some(Utc::now());
        cache.last_used = Some(resume_id.to_string());
        true
    }

    pub fn last_used_resume_id(&self) -> Option<String> {
        self.lock().last_used.clone()
    }

    pub fn resumes(&self) -> Vec<Resume> {
        self.lock().resumes.clone()
    }

    pub fn tailored(&self) -> Vec<TailoredResume> {
        self.lock().tailored.clone()
    }

    /// Optimistically records a tailored resume created by the workflow, so
    /// the library reflects it before the next `load()`.
    pub fn insert_tailored(&self, tailored: TailoredResume) {
        self.lock().tailored.insert(0, tailored);
    }
}

/// Computes a stable human-readable display name from an uploaded filename.
///
/// Pure and deterministic: used at upload time and at render time, so both
/// call sites always agree. Strips a known document extension, splits on
/// hyphens and underscores, title-cases each segment, and rejoins with
/// spaces. A stem with no delimiter is title-cased whole.
pub fn extract_display_name(filename: &str) -> String {
    // The backend sometimes returns a full storage path.
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let stem = ALLOWED_EXTENSIONS
        .iter()
        .find_map(|ext| {
            let suffix = format!(".{ext}");
            if base.to_ascii_lowercase().ends_with(&suffix) {
                Some(&base[..base.len() - suffix.len()])
            } else {
                None
            }
        })
        .unwrap_or(base);

    let name = stem
        .split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        base.to_string()
    } else {
        name
    }
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
