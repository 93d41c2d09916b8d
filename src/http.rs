//! HTTP client for the remote workout planner.
//!
//! Two calls, both against a configurable base URL:
//! - `POST {base}/workout/generate` with `{"prompt": ...}`, answered by
//!   `{"exercises": [...], "notes": "..."}`
//! - `GET {base}/health`, healthy on any 2xx
//!
//! One pooled `reqwest::Client` with a per-request timeout. Nothing is
//! retried; every failure comes back as `TrackerError::RemoteService`.

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::types::Exercise;

const GENERATE_PATH: &str = "workout/generate";
const HEALTH_PATH: &str = "health";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Exercise plan returned by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub struct GenerationClient {
    client: Client,
    base_url: String,
}

impl GenerationClient {
    /// Create a client for the planner at `endpoint`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::remote(format!("Failed to create HTTP client: {}", e), None))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(&config.api_endpoint, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Ask the planner for an exercise plan.
    pub async fn generate_workout(&self, prompt: &str) -> Result<GeneratedPlan> {
        let url = self.url(GENERATE_PATH);
        let start = Instant::now();
        debug!("[GenerationClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| {
                warn!("[GenerationClient] Request to {} failed: {}", url, e);
                TrackerError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("[GenerationClient] {} returned HTTP {}", url, status);
            return Err(TrackerError::remote(
                format!("HTTP {}", status),
                Some(status.as_u16()),
            ));
        }

        let plan = response.json::<GeneratedPlan>().await.map_err(|e| {
            warn!("[GenerationClient] Undecodable plan from {}: {}", url, e);
            TrackerError::remote(format!("Parse error: {}", e), Some(status.as_u16()))
        })?;

        info!(
            "[GenerationClient] Received {} exercises in {:.2}s",
            plan.exercises.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(plan)
    }

    /// `true` when the planner answers its health probe with a 2xx.
    pub async fn health_check(&self) -> bool {
        let url = self.url(HEALTH_PATH);
        match self.client.get(&url).send().await {
            Ok(resp) => {
                let healthy = resp.status().is_success();
                debug!("[GenerationClient] Health {} -> {}", url, resp.status());
                healthy
            }
            Err(e) => {
                debug!("[GenerationClient] Health {} failed: {}", url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BodyPart;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = GenerationClient::new("http://localhost:8000/api/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url(GENERATE_PATH),
            "http://localhost:8000/api/workout/generate"
        );
    }

    #[test]
    fn test_plan_decoding() {
        let body = r#"{
            "exercises": [
                {"id": "e1", "name": "Push-up", "bodyPart": "chest", "sets": 3, "reps": 15},
                {"name": "Row", "bodyPart": "back"}
            ],
            "notes": "Rest 90s between sets"
        }"#;
        let plan: GeneratedPlan = serde_json::from_str(body).unwrap();
        assert_eq!(plan.exercises.len(), 2);
        assert_eq!(plan.exercises[1].body_part, BodyPart::Back);
        assert_eq!(plan.notes.as_deref(), Some("Rest 90s between sets"));

        let bare: GeneratedPlan = serde_json::from_str(r#"{"exercises": []}"#).unwrap();
        assert!(bare.notes.is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest { prompt: "leg day" }).unwrap();
        assert_eq!(body, serde_json::json!({"prompt": "leg day"}));
    }
}
