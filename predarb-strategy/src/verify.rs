//! External match verification.
//!
//! The [`MarketMatcher`](crate::matcher::MarketMatcher) can hand its
//! top-ranked candidate pairs to a [`MatchVerifier`] for a second opinion.
//! [`LlmVerifier`] is the provided implementation, backed by any
//! OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Errors that can occur while verifying a candidate pair.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse verifier response: {0}")]
    Parse(String),

    #[error("Verifier misconfigured: {0}")]
    Config(String),
}

/// Verdict on whether two titles describe the same event and outcome.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Verification {
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl Verification {
    pub fn new(is_match: bool, confidence: f64) -> Self {
        Self {
            is_match,
            confidence: clamp_confidence(confidence),
            reasoning: None,
        }
    }
}

/// Decides whether a Polymarket title and a Kalshi title refer to the same event.
#[async_trait]
pub trait MatchVerifier: Send + Sync {
    async fn verify(&self, polymarket_title: &str, kalshi_title: &str)
    -> Result<Verification, VerifyError>;
}

/// [`MatchVerifier`] backed by an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct LlmVerifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl LlmVerifier {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, VerifyError> {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: Url::parse(&base_url).map_err(|e| VerifyError::Config(e.to_string()))?,
        })
    }

    /// Build from `LLM_API_KEY` (or `OPENAI_API_KEY`), `LLM_MODEL` and `LLM_BASE_URL`.
    pub fn from_env() -> Result<Self, VerifyError> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| VerifyError::Config("LLM_API_KEY is not set".to_string()))?;
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, model, &base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You compare prediction market listings from two platforms. \
Decide whether both listings resolve on the same real-world event and outcome. \
Answer with JSON only: {\"match\": true|false, \"confidence\": 0.0-1.0, \"reasoning\": \"short reason\"}";

fn user_prompt(polymarket_title: &str, kalshi_title: &str) -> String {
    format!("Polymarket: {polymarket_title}\nKalshi: {kalshi_title}\nSame event and outcome?")
}

#[async_trait]
impl MatchVerifier for LlmVerifier {
    async fn verify(
        &self,
        polymarket_title: &str,
        kalshi_title: &str,
    ) -> Result<Verification, VerifyError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| VerifyError::Config(e.to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(polymarket_title, kalshi_title),
                },
            ],
        };

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Verifier request failed");
            return Err(VerifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| VerifyError::Parse(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VerifyError::Parse("empty completion".to_string()))?;

        let verification = parse_verification(&content)?;
        debug!(
            polymarket_title,
            kalshi_title,
            is_match = verification.is_match,
            confidence = verification.confidence,
            "Verified candidate pair"
        );
        Ok(verification)
    }
}

/// Parse a verdict from model output, tolerating fenced code blocks and
/// surrounding prose.
pub fn parse_verification(text: &str) -> Result<Verification, VerifyError> {
    let json = extract_json(text)?;
    let mut verification: Verification =
        serde_json::from_str(json).map_err(|e| VerifyError::Parse(e.to_string()))?;
    verification.confidence = clamp_confidence(verification.confidence);
    Ok(verification)
}

fn extract_json(text: &str) -> Result<&str, VerifyError> {
    let start = text
        .find('{')
        .ok_or_else(|| VerifyError::Parse("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| VerifyError::Parse("unterminated JSON object".to_string()))?;
    Ok(&text[start..=end])
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let v = parse_verification(r#"{"match": true, "confidence": 0.92, "reasoning": "same"}"#)
            .unwrap();
        assert!(v.is_match);
        assert_eq!(v.confidence, 0.92);
        assert_eq!(v.reasoning.as_deref(), Some("same"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "Here you go:\n```json\n{\"match\": false, \"confidence\": 0.3}\n```";
        let v = parse_verification(text).unwrap();
        assert!(!v.is_match);
        assert_eq!(v.confidence, 0.3);
        assert!(v.reasoning.is_none());
    }

    #[test]
    fn test_confidence_clamped() {
        let v = parse_verification(r#"{"match": true, "confidence": 1.7}"#).unwrap();
        assert_eq!(v.confidence, 1.0);

        let v = parse_verification(r#"{"match": true, "confidence": -2}"#).unwrap();
        assert_eq!(v.confidence, 0.0);

        assert_eq!(Verification::new(true, 4.0).confidence, 1.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_verification("yes"), Err(VerifyError::Parse(_))));
        assert!(matches!(parse_verification("} {"), Err(VerifyError::Parse(_))));
        assert!(matches!(
            parse_verification(r#"{"confidence": 0.9}"#),
            Err(VerifyError::Parse(_))
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: user_prompt("A", "B"),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json["messages"][0]["content"].as_str().unwrap().contains("Kalshi: B"));
    }

    #[test]
    fn test_base_url_normalised() {
        let verifier = LlmVerifier::new("key", "model", "http://localhost:8080/v1").unwrap();
        assert_eq!(
            verifier.base_url.join("chat/completions").unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert!(matches!(
            LlmVerifier::new("key", "model", "not a url"),
            Err(VerifyError::Config(_))
        ));
    }
}
