use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use rankscope_core::{KeywordSource, KeywordSuggestions};

/// Settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub words: usize,
    pub phrases: usize,
}

impl SuggestConfig {
    /// Reads RANKSCOPE_LLM_URL, RANKSCOPE_LLM_MODEL and RANKSCOPE_LLM_API_KEY.
    /// `None` when no endpoint is configured.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("RANKSCOPE_LLM_URL").ok().filter(|s| !s.trim().is_empty())?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: std::env::var("RANKSCOPE_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            api_key: std::env::var("RANKSCOPE_LLM_API_KEY").ok(),
            timeout_secs: 30,
            words: 10,
            phrases: 10,
        })
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Keyword ideas from a language model. Every failure degrades to `None`.
pub struct LlmKeywordSource {
    config: SuggestConfig,
    client: Client,
}

impl LlmKeywordSource {
    pub fn new(config: SuggestConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn prompt(&self, app_name: &str, app_description: &str) -> String {
        let description: String = app_description.chars().take(2000).collect();
        format!(
            "Suggest App Store search keywords for the app below.\n\
             Reply with JSON only: {{\"single_words\": [...], \"phrases\": [...]}} \
             with exactly {} single words and {} two-to-three word phrases.\n\n\
             Name: {}\nDescription: {}",
            self.config.words, self.config.phrases, app_name, description
        )
    }

    async fn request(&self, app_name: &str, app_description: &str) -> anyhow::Result<KeywordSuggestions> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: self.prompt(app_name, app_description) }],
            temperature: 0.2,
        };
        let mut req = self.client.post(format!("{}/chat/completions", self.config.base_url)).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let resp: ChatResponse = req.send().await?.error_for_status()?.json().await?;
        let content = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("empty completion"))?;
        parse_suggestions(&content)
    }
}

/// Extract the JSON object from a model reply, tolerating code fences and chatter.
pub fn parse_suggestions(content: &str) -> anyhow::Result<KeywordSuggestions> {
    let start = content.find('{').ok_or_else(|| anyhow::anyhow!("no JSON object in reply"))?;
    let end = content.rfind('}').ok_or_else(|| anyhow::anyhow!("no JSON object in reply"))?;
    if end < start {
        anyhow::bail!("malformed JSON object in reply");
    }
    Ok(serde_json::from_str(&content[start..=end])?)
}

#[async_trait]
impl KeywordSource for LlmKeywordSource {
    async fn suggest(&self, app_name: &str, app_description: &str) -> Option<KeywordSuggestions> {
        match self.request(app_name, app_description).await {
            Ok(s) => {
                tracing::debug!(words = s.single_words.len(), phrases = s.phrases.len(), "keyword suggestions received");
                Some(s)
            }
            Err(e) => {
                tracing::warn!(error = %e, "keyword suggestions unavailable");
                None
            }
        }
    }
}
