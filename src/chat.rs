//! Chat-completion client for the task assistant.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (DeepSeek by
//! default). The only domain logic here is rendering the user's tasks into
//! the newline-delimited context block fed to the system prompt.

use std::time::Duration;

use serde::Deserialize;

use crate::core::TaskWithCategory;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct CompletionResponse {
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

#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Single-shot completion: one user message plus the rendered task
    /// context, one reply. No retries.
    pub async fn complete(&self, user_message: &str, task_context: &str) -> Result<String, String> {
        let system_prompt = format!(
            "You are a helpful to-do list assistant.\n\
             The user's current tasks are provided below in a simplified format.\n\
             Use this information to answer the user's questions.\n\
             Be friendly and concise.\n\n\
             Here are the user's tasks:\n{task_context}"
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("API request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::warn!("chat completion returned {status}");
            return Err(format!("API error {status}: {text}"));
        }

        let completion: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse API response: {e}"))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| "Sorry, I couldn't generate a response.".to_string()))
    }
}

/// Render the task list as the context block for the system prompt, one
/// task per line in display order.
pub fn task_context(tasks: &[TaskWithCategory]) -> String {
    if tasks.is_empty() {
        return "The user has no tasks.".to_string();
    }
    tasks
        .iter()
        .map(|t| {
            let due = t
                .task
                .due_date
                .map(|d| format!("Due: {}", d.format("%b %-d, %Y")))
                .unwrap_or_default();
            format!(
                "- Title: {}, Completed: {}, Category: {}, {}",
                t.task.title,
                t.task.completed,
                t.category_name(),
                due
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
