//! Google Gemini model over the `generateContent` REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::CounsellorConfig;
use super::context::CounsellorContext;
use super::error::{CounsellorError, CounsellorResult};
use super::model::CounsellorModel;
use super::models::Plan;

#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(config: &CounsellorConfig, api_key: String) -> CounsellorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Parse a plan from model text, tolerating a surrounding markdown fence.
pub(crate) fn parse_plan(text: &str) -> CounsellorResult<Plan> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim()).map_err(|e| CounsellorError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl CounsellorModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn plan(&self, context: &CounsellorContext) -> CounsellorResult<Plan> {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": context.prompt()}]}],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json",
            },
        });

        debug!(model = %self.model, "Requesting counsellor plan");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini request failed");
            return Err(CounsellorError::Upstream {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CounsellorError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CounsellorError::InvalidResponse(
                "empty candidate".to_string(),
            ));
        }

        parse_plan(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counsellor::Intent;

    #[test]
    fn test_endpoint() {
        let config = CounsellorConfig {
            base_url: "https://example.test/".into(),
            model: "models/gemini-2.0-flash".into(),
            ..Default::default()
        };
        let model = GeminiModel::new(&config, "key".into()).unwrap();
        assert_eq!(
            model.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_plan_with_fence() {
        let plan = parse_plan("```json\n{\"intent\": \"create_tasks\"}\n```").unwrap();
        assert_eq!(plan.intent, Intent::CreateTasks);
    }

    #[test]
    fn test_parse_plan_rejects_prose() {
        assert!(matches!(
            parse_plan("Sure! Here are some universities."),
            Err(CounsellorError::InvalidResponse(_))
        ));
    }
}
