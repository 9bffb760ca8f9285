//! ApplyMate headless client: the workflow core of the job-application
//! frontend, usable from any Rust UI or script.
//!
//! Three layers:
//! - [`api`]: the backend HTTP contract (`BackendApi` trait + reqwest impl)
//! - [`repository`]: the cached, reconciling view of the resume library
//! - [`workflow`]: the tailoring/analysis/cover-letter state machine
//!
//! Presentation renders exclusively from [`workflow::WorkflowSnapshot`];
//! all cross-layer communication is by result value, never by exception.

pub mod api;
pub mod config;
pub mod errors;
pub mod intake;
pub mod models;
pub mod repository;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{BackendApi, HttpBackend, DEFAULT_TEMPLATE};
pub use config::Config;
pub use errors::ClientError;
pub use models::{AnalysisResult, CoverLetter, ExtractedText, Resume, TailoredResume};
pub use repository::{extract_display_name, ResumeRepository};
pub use workflow::{FailurePoint, Orchestrator, Stage, StepResult, WorkflowSnapshot};
