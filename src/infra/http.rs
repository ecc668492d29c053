//! HTTP infrastructure — implements `HttpClient` with blocking `ureq`
//! calls inside `spawn_blocking`.

use std::time::Duration;

use crate::application::ports::{HttpClient, HttpResponse};
use crate::domain::error::ProbeError;

/// Production `HttpClient`. Requests are issued from the runner, not the
/// target — the URL decides what gets probed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqHttpClient;

impl HttpClient for UreqHttpClient {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ProbeError> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || fetch(&url, timeout))
            .await
            .map_err(|e| ProbeError::Unreachable(format!("http task failed: {e}")))?
    }
}

fn fetch(url: &str, timeout: Duration) -> Result<HttpResponse, ProbeError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    match agent.get(url).call() {
        Ok(response) => read_response(response),
        // Non-2xx statuses are observed state, not probe failures.
        Err(ureq::Error::Status(_, response)) => read_response(response),
        Err(ureq::Error::Transport(transport)) => {
            let message = transport.to_string();
            if message.contains("timed out") {
                Err(ProbeError::Timeout(timeout))
            } else {
                Err(ProbeError::Unreachable(message))
            }
        }
    }
}

fn read_response(response: ureq::Response) -> Result<HttpResponse, ProbeError> {
    let status = i64::from(response.status());
    let body = response
        .into_string()
        .map_err(|e| ProbeError::InvalidOutput(format!("cannot read response body: {e}")))?;
    Ok(HttpResponse { status, body })
}

// ── Unit tests ────────────────────────────────────────────────────────────────
