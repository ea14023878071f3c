use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ClassificationRequest, ClassificationResult, Label};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const SYSTEM_PROMPT: &str = "You are a cyber security expert. Respond only in valid JSON.";

const RATE_LIMIT_MARKERS: [&str; 2] = ["429", "rate_limit_exceeded"];

/// Case-insensitive search for the provider's rate-limit wording.
fn mentions_rate_limit(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Failure of a single remote classification attempt.
///
/// Only [`ProviderError::RateLimited`] is recoverable by switching keys.
/// Messages never carry the credential that was used.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request to provider failed: {0}")]
    Transport(String),
    #[error("malformed provider reply: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }

    /// Maps a non-success HTTP exchange onto the two failure families.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || mentions_rate_limit(&body) {
            ProviderError::RateLimited(body)
        } else {
            ProviderError::Http { status, body }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let rate_limited = err.status().map(|s| s.as_u16()) == Some(429);
        let message = err.without_url().to_string();
        if rate_limited || mentions_rate_limit(&message) {
            return ProviderError::RateLimited(message);
        }
        ProviderError::Transport(message)
    }
}

pub fn render_prompt(request: &ClassificationRequest) -> String {
    format!(
        r#"
Act as a Senior Cyber Security Analyst specializing in Phishing Detection.
Analyze the following email metadata and content for malicious intent.

SENDER: {sender}
CONTENT: {content}

CHECKLIST FOR ANALYSIS:
1. SENDER REPUTATION: Does the sender address look spoofed or use a look-alike domain?
2. URGENCY & THREATS: Does it use "fear-ware" tactics (e.g., "Account locked", "Legal action")?
3. CALL TO ACTION: Is there a suspicious link or a request for sensitive info (PII)?
4. GRAMMAR/STYLE: Are there unusual errors or generic salutations like "Dear Customer"?

Return your final assessment in JSON format ONLY.
JSON FORMAT:
{{
  "label": "phishing", "suspicious", or "safe",
  "reason": "Provide a concise explanation based on the checklist above.",
  "confidence": 0.0 to 1.0
}}
"#,
        sender = request.sender,
        content = request.text,
    )
}

pub fn build_request(model: &str, request: &ClassificationRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: render_prompt(request),
            },
        ],
        temperature: 0.2,
        response_format: ResponseFormat {
            r#type: "json_object".into(),
        },
    }
}

/// Extracts the verdict from a chat completion body.
pub fn parse_completion(body: &str) -> Result<ClassificationResult, ProviderError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::Malformed(format!("completion body: {err}")))?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|msg| msg.content)
        .ok_or_else(|| ProviderError::Malformed("response missing message content".into()))?;

    parse_verdict(&content)
}

/// Parses the model's JSON verdict. Out-of-vocabulary labels are rejected so
/// the caller falls back to the keyword scan; confidence is clamped to [0, 1].
pub fn parse_verdict(content: &str) -> Result<ClassificationResult, ProviderError> {
    let raw: RawVerdict = serde_json::from_str(content)
        .map_err(|err| ProviderError::Malformed(format!("verdict: {err}")))?;

    let label = raw
        .label
        .parse::<Label>()
        .map_err(|err| ProviderError::Malformed(err.to_string()))?;
    if !raw.confidence.is_finite() {
        return Err(ProviderError::Malformed("confidence is not a number".into()));
    }

    Ok(ClassificationResult {
        label,
        reason: raw.reason.unwrap_or_default(),
        confidence: raw.confidence.clamp(0.0, 1.0),
    })
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    label: String,
    reason: Option<String>,
    confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub r#type: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn prompt_embeds_sender_and_content() {
        let request = ClassificationRequest::new(
            Some("billing@paypa1.com".into()),
            Some("Your account is locked".into()),
        );
        let prompt = render_prompt(&request);
        assert!(prompt.contains("SENDER: billing@paypa1.com"));
        assert!(prompt.contains("CONTENT: Your account is locked"));
        assert!(prompt.contains("\"label\": \"phishing\", \"suspicious\", or \"safe\""));
    }

    #[test]
    fn request_asks_for_json_object() {
        let request = ClassificationRequest::new(None, Some("hi".into()));
        let body = serde_json::to_value(build_request(DEFAULT_MODEL, &request)).unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn parses_valid_completion() {
        let body = completion(
            r#"{"label": "Phishing", "reason": "Look-alike domain.", "confidence": 0.93}"#,
        );
        let result = parse_completion(&body).unwrap();
        assert_eq!(result.label, Label::Phishing);
        assert_eq!(result.reason, "Look-alike domain.");
        assert_eq!(result.confidence, 0.93);
    }

    #[test]
    fn clamps_confidence_and_tolerates_missing_reason() {
        let result = parse_verdict(r#"{"label": "safe", "confidence": 7}"#).unwrap();
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn rejects_out_of_vocabulary_label() {
        let err = parse_verdict(r#"{"label": "spam", "reason": "x", "confidence": 0.9}"#)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn rejects_completion_without_content() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
        let err = parse_completion(&completion("not json")).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn classifies_rate_limit_signals() {
        assert!(ProviderError::from_status(429, String::new()).is_rate_limited());
        assert!(ProviderError::from_status(
            400,
            r#"{"error":{"code":"rate_limit_exceeded"}}"#.into()
        )
        .is_rate_limited());
        assert!(ProviderError::from_status(503, "Error code: 429 - Too Many Requests".into())
            .is_rate_limited());
        assert!(ProviderError::from_status(
            400,
            r#"{"error":{"code":"RATE_LIMIT_EXCEEDED"}}"#.into()
        )
        .is_rate_limited());
        assert!(!ProviderError::from_status(401, "invalid_api_key".into()).is_rate_limited());
        assert!(!ProviderError::from_status(500, "upstream overloaded".into()).is_rate_limited());
        assert!(!ProviderError::Transport("connection refused".into()).is_rate_limited());
    }
}
