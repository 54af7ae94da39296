use jugglegraph_state::{GraphDocument, JugglingState, MAX_SUPPORTED_HEIGHT};
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, error_from_response};
use crate::types::{ServerConfig, TableResponse, ThrowsResponse};

const GRAPH_PATH: &str = "/api/v1/state-notation/graph";
const THROWS_PATH: &str = "/api/v1/state-notation/throws";
const TABLE_PATH: &str = "/api/v1/state-notation/table";
const CONFIG_PATH: &str = "/api/v1/config";

#[derive(Debug, Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    config: EngineConfig,
}

impl EngineClient {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EngineError::Network)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full state graph for `num_props` props thrown no higher than
    /// `max_height`.
    pub async fn graph(
        &self,
        num_props: u32,
        max_height: u32,
    ) -> Result<GraphDocument, EngineError> {
        validate_pattern_size(num_props, max_height)?;
        self.get_json(
            GRAPH_PATH,
            &[
                ("num_props", num_props.to_string()),
                ("max_height", max_height.to_string()),
                ("compact", "true".to_string()),
            ],
        )
        .await
    }

    /// Throws available from `state`.
    pub async fn throws(
        &self,
        state: JugglingState,
        max_height: u32,
    ) -> Result<ThrowsResponse, EngineError> {
        validate_max_height(max_height)?;
        let state = JugglingState::new(state.bits(), max_height)?;
        self.get_json(
            THROWS_PATH,
            &[
                ("state", state.bits().to_string()),
                ("max_height", max_height.to_string()),
                ("compact", "true".to_string()),
            ],
        )
        .await
    }

    pub async fn table(
        &self,
        num_props: u32,
        max_height: u32,
    ) -> Result<TableResponse, EngineError> {
        validate_pattern_size(num_props, max_height)?;
        self.get_json(
            TABLE_PATH,
            &[
                ("num_props", num_props.to_string()),
                ("max_height", max_height.to_string()),
                ("compact", "true".to_string()),
            ],
        )
        .await
    }

    /// Limits the engine is configured with.
    pub async fn server_config(&self) -> Result<ServerConfig, EngineError> {
        self.get_json(CONFIG_PATH, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, EngineError> {
        let policy = &self.config.retry;
        let mut retry = 0;
        loop {
            match self.get_once(path, query).await {
                Err(err) if err.is_retryable() && retry < policy.max_retries => {
                    retry += 1;
                    let delay = policy.delay_before(retry);
                    warn!(path, retry, ?delay, error = %err, "engine request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, EngineError> {
        let url = self.config.url(path);
        debug!(%url, ?query, "engine request");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(EngineError::Network)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(EngineError::Network)?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), retry_after.as_deref(), &body));
        }
        serde_json::from_str(&body).map_err(EngineError::Decode)
    }
}

fn validate_max_height(max_height: u32) -> Result<(), EngineError> {
    if max_height == 0 || max_height > MAX_SUPPORTED_HEIGHT {
        return Err(EngineError::InvalidRequest(format!(
            "max_height must be between 1 and {MAX_SUPPORTED_HEIGHT}, got {max_height}"
        )));
    }
    Ok(())
}

fn validate_pattern_size(num_props: u32, max_height: u32) -> Result<(), EngineError> {
    validate_max_height(max_height)?;
    if num_props == 0 {
        return Err(EngineError::InvalidRequest("num_props must be at least 1".to_string()));
    }
    if num_props > max_height {
        return Err(EngineError::InvalidRequest(format!(
            "num_props ({num_props}) cannot exceed max_height ({max_height})"
        )));
    }
    Ok(())
}
