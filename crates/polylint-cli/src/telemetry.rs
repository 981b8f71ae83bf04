//! HTTP delivery of failure records.

use polylint_core::{FailureRecord, TelemetryTransport, TransportError};
use std::time::Duration;
use ureq::Agent;

/// Per-request time limit.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Posts each record as JSON to a collector URL.
pub struct HttpTransport {
    agent: Agent,
    endpoint: String,
}

impl HttpTransport {
    /// Creates a transport for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            agent: Agent::new_with_config(config),
            endpoint: endpoint.into(),
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TelemetryTransport for HttpTransport {
    fn send(&self, record: &FailureRecord) -> Result<(), TransportError> {
        let body = serde_json::to_vec(record)?;
        match self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(&body[..])
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(code)) => Err(TransportError::Rejected(code)),
            Err(e) => Err(TransportError::Unreachable(e.to_string())),
        }
    }
}
