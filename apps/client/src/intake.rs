//! Job intake: normalizes a pasted job URL or free-text description into a
//! single payload for the tailoring workflow.
//!
//! No URL fetching or scraping happens here; the backend resolves URLs into
//! description text server-side. The only local validation is non-emptiness.

use crate::errors::ClientError;

/// Trims the raw input and rejects empty submissions. The surviving text is
/// forwarded verbatim: URL or prose, the backend decides.
pub fn normalize_job_input(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "job input cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// True when the input is URL-shaped. Used only to pick the input mode in a
/// frontend; the payload is forwarded unchanged either way.
pub fn looks_like_url(input: &str) -> bool {
    let input = input.trim();
    input.starts_with("http://") || input.starts_with("https://")
}
