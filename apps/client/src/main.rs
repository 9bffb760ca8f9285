use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use applymate_client::repository::ResumeRepository;
use applymate_client::workflow::Orchestrator;
use applymate_client::{extract_display_name, Config, HttpBackend};

/// Smoke CLI: connects to a running ApplyMate backend, loads the resume
/// library, and prints it. Optionally submits a job URL for auto-apply when
/// `JOB_URL` is set.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("applymate_client={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("ApplyMate client v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.api_url);

    let api = Arc::new(HttpBackend::new(&config));
    let repository = Arc::new(ResumeRepository::new(api.clone()));
    let flow = Orchestrator::new(api, repository);

    flow.repository().load().await?;

    let resumes = flow.repository().resumes();
    info!("{} resume(s) on file", resumes.len());
    for resume in &resumes {
        info!(
            "  {} - {} [{}]",
            resume.id,
            extract_display_name(&resume.file_name),
            if resume.text.is_pending() { "text pending" } else { "text extracted" }
        );
    }
    for tailored in flow.repository().tailored() {
        info!(
            "  tailored {} ({:?}) for: {:.40}",
            tailored.id, tailored.status, tailored.job_description
        );
    }

    if let Ok(job_url) = std::env::var("JOB_URL") {
        info!("Submitting auto-apply for {job_url}");
        flow.submit_auto_apply(&job_url).await?;
        info!("Accepted");
    }

    Ok(())
}
