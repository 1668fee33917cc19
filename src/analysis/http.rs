use super::{AnalysisClient, AnalysisOutcome, AnalysisResult, DebugRequest, TransportFailure};
use crate::config::Config;
use crate::task::TaskHandle;
use anyhow::{Context, Result};
use std::thread;
use tracing::{debug, info, warn};

/// Posts snippets to `{api_url}/debug`, one worker thread per submission.
pub struct HttpAnalysisClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpAnalysisClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .context("failed to build the HTTP client")?;

        Ok(Self {
            endpoint: config.debug_endpoint(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn submit(&self, request: DebugRequest) -> TaskHandle<AnalysisOutcome> {
        let (tx, handle) = TaskHandle::channel();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        let spawned = thread::Builder::new()
            .name("analysis-request".into())
            .spawn(move || {
                let outcome = post_debug(&client, &endpoint, &request);
                // The session may have been dropped while we were waiting.
                let _ = tx.send(outcome);
            });

        if let Err(err) = spawned {
            // Dropping the sender with the closure closes the handle, which
            // the session reports as a failed submission.
            warn!(error = %err, "could not spawn analysis worker");
        }

        handle
    }
}

fn post_debug(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    request: &DebugRequest,
) -> AnalysisOutcome {
    info!(
        endpoint,
        code_len = request.code.len(),
        translate = request.translate,
        "sending code for analysis"
    );

    let response = client
        .post(endpoint)
        .json(request)
        .send()
        .map_err(|e| TransportFailure::Request(describe_send_error(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportFailure::Status {
            status: status.as_u16(),
        });
    }

    let result = response
        .json::<AnalysisResult>()
        .map_err(|e| TransportFailure::Decode(e.to_string()))?;
    debug!(has_errors = result.has_errors, "analysis response decoded");
    Ok(result)
}

/// reqwest's `Display` stops at "error sending request"; the actual cause
/// lives further down the source chain.
fn describe_send_error(err: reqwest::Error) -> String {
    let timed_out = err.is_timeout();
    let message = format!("{:#}", anyhow::Error::from(err));
    if timed_out {
        format!("timeout: {message}")
    } else {
        message
    }
}
