//! HTTP client for the remote moderation classifier.
//!
//! The classifier is an external collaborator consumed through a single
//! request/response contract: `POST {endpoint}` with
//! `{ "message": ..., "user_id": "browser_user" }`, answered by a JSON
//! verdict (see [`civil_types::Decision`]).
//!
//! # Error Handling
//!
//! Every failure mode is recoverable and fails closed: a transport error, a
//! non-success status, or a body that does not decode to a known verdict all
//! come back as [`ClassifyError`]. Nothing here retries — the only retry in
//! the system is organic, the user typing again — and no overall request
//! timeout is imposed, so a hung classifier call simply never resolves.

use std::sync::OnceLock;
use std::time::Duration;

use civil_types::{AnalyzeRequest, Decision};
use url::Url;

/// Default endpoint of a locally run classifier service.
pub const DEFAULT_ANALYZE_URL: &str = "http://127.0.0.1:10000/analyze";

/// Constant caller identity; there is no per-user session management.
pub const CALLER_ID: &str = "browser_user";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build tuned HTTP client: {e}. Using defaults.");
                reqwest::Client::new()
            })
    })
}

/// Why a classification attempt produced no verdict.
///
/// An ambiguous verdict must never be read as "safe", so a malformed body is
/// an error exactly like an unreachable service: no advisory is shown and no
/// text is mutated for that keystroke burst.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("classifier endpoint is not a valid URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("classifier response did not match the verdict shape: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Client bound to one classifier endpoint.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    endpoint: Url,
}

impl ClassifierClient {
    pub fn new(endpoint: &str) -> Result<Self, ClassifyError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit one message for classification and decode the verdict.
    pub async fn analyze(&self, message: &str) -> Result<Decision, ClassifyError> {
        let body = AnalyzeRequest {
            message,
            user_id: CALLER_ID,
        };

        let response = http_client()
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(ClassifyError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let decision =
            serde_json::from_slice::<Decision>(&bytes).map_err(ClassifyError::Malformed)?;

        tracing::debug!(
            action = decision.action.as_str(),
            severity = decision.analysis.severity,
            "verdict received"
        );
        Ok(decision)
    }
}

async fn read_capped_error_body(response: reqwest::Response) -> String {
    match response.bytes().await {
        Ok(bytes) => {
            let capped = &bytes[..bytes.len().min(MAX_ERROR_BODY_BYTES)];
            let text = String::from_utf8_lossy(capped);
            if bytes.len() > MAX_ERROR_BODY_BYTES {
                format!("{text}...(truncated)")
            } else {
                text.into_owned()
            }
        }
        Err(_) => String::new(),
    }
}
