//! Tailoring workflow orchestrator: the client-side state machine that
//! drives paste-a-job through tailoring, analysis, and the optional cover
//! letter.
//!
//! One `is_busy` flag enforces at-most-one-in-flight: any mutating call
//! while an operation is pending is rejected as a no-op, never queued. A
//! monotonic run epoch invalidates in-flight work on `reset()`, so a late
//! completion for an abandoned run is discarded wholesale instead of being
//! applied to state that no longer expects it.
//!
//! Failures land in an explicit `Failed` stage that names the step which
//! failed and where to recover to. The prior state is never partially
//! written: a failed tailoring attempt keeps the selected resume and the
//! typed job description so the user can retry immediately.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{BackendApi, DEFAULT_TEMPLATE};
use crate::errors::ClientError;
use crate::models::{AnalysisResult, CoverLetter, TailoredResume, TailoredStatus};
use crate::repository::ResumeRepository;

/// The step an in-flight operation failed at. Determines the recovery
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePoint {
    Tailoring,
    CoverLetter,
}

/// Workflow stage. `Tailoring` and `CoverLetterGeneration` cover both the
/// interactive step and its in-flight window; `is_busy` distinguishes the
/// two. `Failed` is never a dead end; see [`Stage::recovery_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    ResumeSelection,
    Tailoring,
    AnalysisReady,
    CoverLetterGeneration,
    CoverLetterReady,
    Failed(FailurePoint),
}

impl Stage {
    /// The interactive stage a failure exits back to.
    pub fn recovery_target(&self) -> Stage {
        match self {
            Stage::Failed(FailurePoint::Tailoring) => Stage::ResumeSelection,
            Stage::Failed(FailurePoint::CoverLetter) => Stage::AnalysisReady,
            other => *other,
        }
    }
}

/// Outcome of a guarded operation that is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The operation ran and its result was applied.
    Completed,
    /// Rejected by a local guard (busy, or wrong stage). Nothing changed.
    Skipped,
    /// The response arrived for a superseded run and was discarded.
    Stale,
}

/// Immutable view of the workflow for presentation. Rendering needs nothing
/// but this snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub stage: Stage,
    pub selected_resume_id: Option<String>,
    pub last_used_resume_id: Option<String>,
    pub job_description: String,
    pub tailored_resume_id: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub cover_letter: Option<CoverLetter>,
    pub is_busy: bool,
    pub last_error: Option<String>,
}

struct FlowState {
    stage: Stage,
    selected_resume_id: Option<String>,
    job_description: String,
    tailored_resume_id: Option<String>,
    analysis: Option<AnalysisResult>,
    cover_letter: Option<CoverLetter>,
    is_busy: bool,
    /// Bumped by `reset()`. A completion handler whose captured epoch no
    /// longer matches discards its result without touching anything,
    /// `is_busy` included (a newer operation may already own the flag).
    epoch: u64,
    last_error: Option<String>,
}

impl FlowState {
    fn new() -> Self {
        FlowState {
            stage: Stage::Idle,
            selected_resume_id: None,
            job_description: String::new(),
            tailored_resume_id: None,
            analysis: None,
            cover_letter: None,
            is_busy: false,
            epoch: 0,
            last_error: None,
        }
    }
}

pub struct Orchestrator {
    api: Arc<dyn BackendApi>,
    repository: Arc<ResumeRepository>,
    state: Mutex<FlowState>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn BackendApi>, repository: Arc<ResumeRepository>) -> Self {
        Orchestrator {
            api,
            repository,
            state: Mutex::new(FlowState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn repository(&self) -> &ResumeRepository {
        &self.repository
    }

    /// Current workflow state for rendering.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.lock();
        WorkflowSnapshot {
            stage: state.stage,
            selected_resume_id: state.selected_resume_id.clone(),
            last_used_resume_id: self.repository.last_used_resume_id(),
            job_description: state.job_description.clone(),
            tailored_resume_id: state.tailored_resume_id.clone(),
            analysis: state.analysis.clone(),
            cover_letter: state.cover_letter.clone(),
            is_busy: state.is_busy,
            last_error: state.last_error.clone(),
        }
    }

    /// Selects the resume to tailor. Silent no-op while an operation is in
    /// flight or when the id is unknown to the repository (a local
    /// consistency guard, not network validation). Returns whether the
    /// selection was applied.
    pub fn select_resume(&self, resume_id: &str) -> bool {
        {
            let state = self.lock();
            if state.is_busy {
                debug!("select_resume ignored: operation in flight");
                return false;
            }
        }
        if !self.repository.mark_last_used(resume_id) {
            debug!("select_resume ignored: unknown resume {resume_id}");
            return false;
        }

        let mut state = self.lock();
        state.selected_resume_id = Some(resume_id.to_string());
        if state.stage == Stage::Idle {
            state.stage = Stage::ResumeSelection;
        }
        true
    }

    /// Stores the job description verbatim and enters the tailoring step.
    /// The text must be non-empty after trimming; callers normalize via
    /// `intake::normalize_job_input`.
    pub fn submit_job_description(&self, text: &str) -> Result<StepResult, ClientError> {
        let mut state = self.lock();
        if state.is_busy {
            return Ok(StepResult::Skipped);
        }
        match state.stage {
            Stage::Idle
            | Stage::ResumeSelection
            | Stage::Tailoring
            | Stage::Failed(FailurePoint::Tailoring) => {}
            _ => {
                debug!("submit_job_description ignored in stage {:?}", state.stage);
                return Ok(StepResult::Skipped);
            }
        }
        if text.trim().is_empty() {
            return Err(ClientError::Validation(
                "job description cannot be empty".to_string(),
            ));
        }

        state.job_description = text.to_string();
        state.stage = Stage::Tailoring;
        state.last_error = None;
        Ok(StepResult::Completed)
    }

    /// Requests tailoring of the selected resume against the stored job
    /// description.
    ///
    /// Preconditions: a resume is selected, the job description is
    /// non-empty, and nothing is in flight. On success the analysis is
    /// populated (with default substitution for absent fields) and the
    /// stage becomes `AnalysisReady`. On failure the stage becomes
    /// `Failed(Tailoring)` and all prior state is left untouched. The busy
    /// flag is cleared on every path that completes this run.
    pub async fn request_tailoring(&self) -> Result<StepResult, ClientError> {
        let (resume_id, job_description, epoch) = {
            let mut state = self.lock();
            if state.is_busy {
                debug!("request_tailoring ignored: operation in flight");
                return Ok(StepResult::Skipped);
            }
            let Some(resume_id) = state.selected_resume_id.clone() else {
                return Err(ClientError::Validation("no resume selected".to_string()));
            };
            if state.job_description.trim().is_empty() {
                return Err(ClientError::Validation(
                    "job description cannot be empty".to_string(),
                ));
            }
            state.is_busy = true;
            state.stage = Stage::Tailoring;
            state.last_error = None;
            (resume_id, state.job_description.clone(), state.epoch)
        };

        let result = self
            .api
            .tailor_resume(&resume_id, &job_description, DEFAULT_TEMPLATE)
            .await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("discarding stale tailoring response (run superseded)");
            return Ok(StepResult::Stale);
        }
        state.is_busy = false;

        match result {
            Ok(response) => {
                state.analysis = Some(AnalysisResult::from_response(&response));
                state.tailored_resume_id = Some(response.tailored_resume_id.clone());
                state.stage = Stage::AnalysisReady;
                drop(state);

                // Reflect the new derivative in the library before the next
                // full refresh, as the backend has already stored it.
                self.repository.insert_tailored(TailoredResume {
                    id: response.tailored_resume_id,
                    job_description,
                    status: TailoredStatus::Completed,
                    pdf_path: response.pdf_path,
                    created_at: Utc::now(),
                });
                Ok(StepResult::Completed)
            }
            Err(e) => {
                warn!("tailoring failed: {e}");
                state.stage = Stage::Failed(FailurePoint::Tailoring);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Requests a generated cover letter for the tailored resume/job pair.
    /// Valid from `AnalysisReady` (or as a retry after a cover-letter
    /// failure). Optional fields default to empty strings. A failure keeps
    /// the previously computed analysis.
    pub async fn request_cover_letter(
        &self,
        company_name: Option<&str>,
        hiring_manager: Option<&str>,
    ) -> Result<StepResult, ClientError> {
        let (resume_id, job_description, epoch) = {
            let mut state = self.lock();
            if state.is_busy {
                debug!("request_cover_letter ignored: operation in flight");
                return Ok(StepResult::Skipped);
            }
            match state.stage {
                Stage::AnalysisReady | Stage::Failed(FailurePoint::CoverLetter) => {}
                _ => {
                    debug!("request_cover_letter ignored in stage {:?}", state.stage);
                    return Ok(StepResult::Skipped);
                }
            }
            let Some(resume_id) = state.selected_resume_id.clone() else {
                return Err(ClientError::Validation("no resume selected".to_string()));
            };
            state.is_busy = true;
            state.stage = Stage::CoverLetterGeneration;
            state.last_error = None;
            (resume_id, state.job_description.clone(), state.epoch)
        };

        let result = self
            .api
            .generate_cover_letter(
                &resume_id,
                &job_description,
                company_name.unwrap_or(""),
                hiring_manager.unwrap_or(""),
            )
            .await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("discarding stale cover letter response (run superseded)");
            return Ok(StepResult::Stale);
        }
        state.is_busy = false;

        match result {
            Ok(response) => {
                state.cover_letter = Some(CoverLetter {
                    text: response.cover_letter_text,
                    pdf_path: response.pdf_path,
                });
                state.stage = Stage::CoverLetterReady;
                Ok(StepResult::Completed)
            }
            Err(e) => {
                warn!("cover letter generation failed: {e}");
                state.stage = Stage::Failed(FailurePoint::CoverLetter);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Clears per-job state and returns to resume selection. The resume
    /// library and last-used resume persist across workflow runs.
    ///
    /// Allowed while an operation is in flight: this is the cancellation
    /// path. The epoch bump makes the superseded completion discard itself.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.is_busy = false;
        state.stage = Stage::ResumeSelection;
        state.job_description.clear();
        state.tailored_resume_id = None;
        state.analysis = None;
        state.cover_letter = None;
        state.last_error = None;
    }

    /// Exits a `Failed` stage to its recovery target. No-op otherwise.
    pub fn dismiss_error(&self) {
        let mut state = self.lock();
        if let Stage::Failed(_) = state.stage {
            state.stage = state.stage.recovery_target();
            state.last_error = None;
        }
    }

    /// Deletes a resume through the repository and reconciles the local
    /// selection: when the deleted resume was selected, selection follows
    /// the repository's reassigned last-used resume.
    pub async fn remove_resume(&self, resume_id: &str) -> Result<StepResult, ClientError> {
        {
            let state = self.lock();
            if state.is_busy {
                debug!("remove_resume ignored: operation in flight");
                return Ok(StepResult::Skipped);
            }
        }
        self.repository.remove(resume_id).await?;

        let mut state = self.lock();
        if state.selected_resume_id.as_deref() == Some(resume_id) {
            state.selected_resume_id = self.repository.last_used_resume_id();
        }
        Ok(StepResult::Completed)
    }

    /// Submits a job URL for backend auto-apply. Independent of the
    /// tailoring run, but still busy-guarded so it cannot race a mutating
    /// operation.
    pub async fn submit_auto_apply(&self, job_url: &str) -> Result<StepResult, ClientError> {
        {
            let state = self.lock();
            if state.is_busy {
                return Ok(StepResult::Skipped);
            }
        }
        let normalized = crate::intake::normalize_job_input(job_url)?;
        self.api
            .submit_job_application(&normalized, DEFAULT_TEMPLATE)
            .await?;
        Ok(StepResult::Completed)
    }
}
