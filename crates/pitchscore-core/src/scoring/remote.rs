//! Remote language-model scorer over an OpenAI-compatible chat completion API.
//!
//! One attempt per call, bounded by the configured timeout. The reply must be
//! a JSON object `{scores: {...}, suggestions: [...]}`; scores are coerced to
//! integers and clamped to `0..=100`, and absent categories count as 0.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::recommend::recommend;
use crate::error::RemoteScoreError;
use crate::models::{AnalysisResult, Breakdown, Category, RemoteConfig};

/// Result type for remote scoring.
pub type Result<T> = std::result::Result<T, RemoteScoreError>;

/// Most suggestions kept from a model reply.
pub const MAX_SUGGESTIONS: usize = 8;

const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

const SYSTEM_PROMPT: &str = "You are a strict pitch-deck evaluator for high-school startup competitions. \
Score each category from 0 to 100 based only on evidence in the text. \
Never guess or infer missing information; if information is missing, give a low score. \
Output compact JSON only.";

/// A scorer backed by an external model.
#[async_trait]
pub trait ModelScorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Score extracted deck text.
    async fn score(&self, text: &str) -> Result<AnalysisResult>;
}

/// Chat-completion scorer.
pub struct ChatModelScorer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_input_chars: usize,
    name: String,
}

impl ChatModelScorer {
    /// Build a scorer from configuration. Fails without an API key.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let api_key = config
            .credentials()
            .ok_or(RemoteScoreError::MissingCredentials)?
            .to_string();

        let http = reqwest::Client::builder()
            .user_agent(concat!("pitchscore/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteScoreError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_input_chars: config.max_input_chars,
            name: format!("chat-completion:{}", config.model),
        })
    }

    /// Request body for a piece of deck text.
    pub fn build_request(&self, text: &str) -> ChatCompletionRequest {
        let text = truncate_chars(text, self.max_input_chars);
        ChatCompletionRequest {
            model: self.model.clone(),
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt(text),
                },
            ],
        }
    }
}

#[async_trait]
impl ModelScorer for ChatModelScorer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn score(&self, text: &str) -> Result<AnalysisResult> {
        let request = self.build_request(text);
        debug!(model = %self.model, chars = text.chars().count(), "requesting remote score");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_limited_text(resp).await;
            return Err(RemoteScoreError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_slice(&resp.bytes().await?)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(RemoteScoreError::EmptyCompletion)?;

        parse_model_reply(&content)
    }
}

fn user_prompt(text: &str) -> String {
    format!(
        "Return a JSON object with keys: scores, suggestions.\n\
         scores = {{team:int, market:int, product:int, finance:int, design:int}}.\n\
         suggestions = array of 3-8 short actionable strings.\n\n\
         <deck>\n{}\n</deck>",
        text
    )
}

/// Keep at most `max` characters from the start of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parse and normalize the model's JSON reply.
pub fn parse_model_reply(content: &str) -> Result<AnalysisResult> {
    let parsed: Value = serde_json::from_str(content)?;

    let scores = parsed
        .get("scores")
        .and_then(Value::as_object)
        .ok_or(RemoteScoreError::MissingScores)?;

    let mut breakdown = Breakdown::default();
    for category in Category::ALL {
        let score = match scores.get(category.as_str()) {
            Some(value) => normalize_score(category, value)?,
            None => 0,
        };
        breakdown.set(category, score);
    }

    let mut suggestions = normalize_suggestions(parsed.get("suggestions"));
    if suggestions.is_empty() {
        debug!("model returned no usable suggestions, using category tips");
        suggestions = recommend(&breakdown);
    }

    Ok(AnalysisResult::new(breakdown, suggestions))
}

/// Coerce a reported score to an integer in `0..=100`.
fn normalize_score(category: Category, value: &Value) -> Result<u32> {
    let invalid = || RemoteScoreError::InvalidScore {
        category,
        value: value.to_string(),
    };

    let raw: i64 = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => n.as_f64().ok_or_else(invalid)?.trunc() as i64,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => s.parse::<f64>().map_err(|_| invalid())?.trunc() as i64,
            }
        }
        _ => return Err(invalid()),
    };

    Ok(raw.clamp(0, 100) as u32)
}

fn normalize_suggestions(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_SUGGESTIONS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn read_limited_text(resp: reqwest::Response) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > MAX_ERROR_BODY_BYTES {
                b.truncate(MAX_ERROR_BODY_BYTES);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            debug!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub response_format: ResponseFormat,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}
