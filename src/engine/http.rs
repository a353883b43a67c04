//! HTTP client for a remote crew engine
//!
//! Posts the kickoff request as JSON to `{base_url}/kickoff` and expects
//! `{"raw": "<text>"}` back. A kickoff starts a crew run on the engine, so it
//! is sent exactly once; every failure surfaces as an [`EngineError`].

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{AgentEngine, EngineError, KickoffRequest};
use crate::config::EngineConfig;
use crate::models::EngineOutput;

/// Longest error body kept in an [`EngineError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Crew runs slower than this are logged as warnings
const SLOW_KICKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct KickoffReply {
    raw: String,
}

/// Crew engine reached over HTTP
pub struct HttpAgentEngine {
    client: reqwest::Client,
    kickoff_url: String,
    api_key: Option<String>,
}

impl HttpAgentEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("travel-planner/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    /// Engine over an already configured client
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &EngineConfig) -> Self {
        Self {
            client,
            kickoff_url: kickoff_url(&config.base_url),
            api_key: config.api_key.clone(),
        }
    }

    #[must_use]
    pub fn kickoff_url(&self) -> &str {
        &self.kickoff_url
    }
}

#[async_trait]
impl AgentEngine for HttpAgentEngine {
    #[instrument(skip(self, request), fields(crew = %request.crew, url = %self.kickoff_url))]
    async fn kickoff(&self, request: KickoffRequest) -> Result<EngineOutput, EngineError> {
        let start_time = Instant::now();
        debug!("Sending kickoff with {} inputs", request.inputs.len());

        let mut builder = self.client.post(&self.kickoff_url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Kickoff request failed: {}", e);
            EngineError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Engine rejected kickoff with HTTP {}", status);
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        let reply: KickoffReply = response.json().await.map_err(|e| {
            error!("Failed to parse kickoff reply: {}", e);
            EngineError::InvalidResponse(e.to_string())
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Kickoff finished in {:.3}s ({} bytes)",
            total_duration.as_secs_f64(),
            reply.raw.len()
        );
        if total_duration > SLOW_KICKOFF {
            warn!("Slow crew run: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(EngineOutput::new(reply.raw))
    }
}

fn kickoff_url(base_url: &str) -> String {
    format!("{}/kickoff", base_url.trim_end_matches('/'))
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
