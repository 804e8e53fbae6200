//! Blocking HTTP classification oracle.

use std::time::Duration;

use serde_json::Value;

use super::ScriptLookup;
use crate::types::{IndexError, IndexResult};

/// Queries `GET {base_url}/scripts/{hash}` and reads the `type` field of the
/// JSON body. A 404 means the hash is unknown.
///
/// One agent (and its connection pool) is shared by every lookup of a run and
/// released when the `HttpLookup` is dropped.
pub struct HttpLookup {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLookup {
    /// Create a lookup against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url_for(&self, hash: &str) -> String {
        format!("{}/scripts/{}", self.base_url, hash)
    }
}

impl ScriptLookup for HttpLookup {
    fn lookup(&self, hash: &str) -> IndexResult<Option<String>> {
        let url = self.url_for(hash);
        let mut request = self.agent.get(&url);
        if let Some(key) = &self.api_key {
            request = request.set("project_id", key);
        }
        match request.call() {
            Ok(resp) => {
                let raw = resp
                    .into_string()
                    .map_err(|e| IndexError::Lookup(format!("failed reading response: {e}")))?;
                let body: Value = serde_json::from_str(&raw)
                    .map_err(|e| IndexError::Lookup(format!("failed parsing response JSON: {e}")))?;
                Ok(body.get("type").and_then(Value::as_str).map(str::to_string))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                Err(IndexError::Lookup(format!("HTTP {code}: {detail}")))
            }
            Err(ureq::Error::Transport(e)) => Err(IndexError::Lookup(e.to_string())),
        }
    }

    fn describe(&self) -> String {
        format!("http lookup {}", self.base_url)
    }
}
