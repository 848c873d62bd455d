//! Report summarization via an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Turns a deduplicated row set into a short prose summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, rows: &[Value]) -> Result<String>;
}

pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, rows: &[Value]) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": build_prompt(rows)}],
            "temperature": 0.7,
            "max_tokens": 150,
        });

        debug!(model = %self.model, rows = rows.len(), "requesting report summary");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Summarize(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "summarizer API error");
            return Err(PipelineError::Summarize(format!(
                "summarizer returned {status}: {text}"
            )));
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::Summarize(format!("malformed summarizer body: {e}")))?;

        let summary = api_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if summary.is_empty() {
            return Err(PipelineError::Summarize(
                "no summary was generated".to_string(),
            ));
        }
        Ok(summary)
    }
}

fn build_prompt(rows: &[Value]) -> String {
    let data = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Please provide a brief, one-paragraph summary of the following ad campaign data.\n\
         Do not start with \"This report shows\" or \"Here is a summary\". Just provide the summary directly.\n\
         Highlight the best and worst performing metrics.\n\n\
         Data:\n{data}"
    )
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
