//! Gemini API integration for StudyBell.
//!
//! Provides LLM-powered features such as:
//! - Praise-text generation for a recorded study session
//! - Free-form prompt passthrough for the `/gemini` command

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sb_core::format_duration;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Gemini API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Generates praise text for a recorded study session.
    pub async fn praise(&self, input: &PraiseRequest) -> Result<String, LlmError> {
        self.generate(&build_praise_prompt(input)).await
    }

    /// Sends a free-form prompt and returns the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        extract_text(payload)
    }
}

/// Input for praise generation.
#[derive(Debug, Clone)]
pub struct PraiseRequest {
    /// Recorded study time in milliseconds.
    pub duration_ms: i64,
    /// Display name to address in the praise.
    pub user_name: String,
    /// Optional note from the user about the session.
    pub comment: Option<String>,
}

/// The canned reply used when praise generation fails.
///
/// Callers on the notification path swap this in rather than surfacing the
/// error to the channel.
#[must_use]
pub fn fallback_praise() -> String {
    "Sorry, I couldn't think of the right words... but great work today!".to_string()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn extract_text(payload: GenerateContentResponse) -> Result<String, LlmError> {
    let mut pieces = Vec::new();
    for candidate in payload.candidates {
        for part in candidate.content.parts {
            if !part.text.is_empty() {
                pieces.push(part.text);
            }
        }
    }
    if pieces.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}

fn build_praise_prompt(input: &PraiseRequest) -> String {
    let duration = format_duration(input.duration_ms);
    let mut lines = Vec::new();
    lines.push(
        "You are a cheerful cat assistant for a study-room chat server. You \
         encourage members and hand out positive feedback."
            .to_string(),
    );
    lines.push("Persona:".to_string());
    lines.push("- You are a lazy male cat who mostly wants snacks and playtime.".to_string());
    lines.push("- You speak casually, with a drawn-out, easygoing tone.".to_string());
    lines.push(String::new());
    lines.push(
        "Write a short praise message (at most 5 lines, chat-friendly) for the \
         member below. Address them by name. If they studied 2 hours or more, \
         throw in an enthusiastic meow."
            .to_string(),
    );
    lines.push(String::new());
    lines.push(format!("member_name: {}", input.user_name));
    lines.push(format!("study_time: {duration}"));
    if let Some(comment) = &input.comment {
        lines.push(format!("member_note: {comment}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new(""),
            Err(LlmError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("   "),
            Err(LlmError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_accepts_valid_api_key() {
        assert!(Client::new("AIza-valid-key").is_ok());
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn praise_prompt_includes_name_and_duration() {
        let input = PraiseRequest {
            duration_ms: 90 * 60 * 1_000,
            user_name: "Alice".to_string(),
            comment: Some("finished the algebra chapter".to_string()),
        };
        let prompt = build_praise_prompt(&input);
        assert!(prompt.contains("member_name: Alice"));
        assert!(prompt.contains("study_time: 1 hour 30 minutes"));
        assert!(prompt.contains("member_note: finished the algebra chapter"));
    }

    #[test]
    fn praise_prompt_omits_missing_comment() {
        let input = PraiseRequest {
            duration_ms: 60_000,
            user_name: "Bob".to_string(),
            comment: None,
        };
        assert!(!build_praise_prompt(&input).contains("member_note"));
    }

    #[test]
    fn extract_text_joins_candidate_parts() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Nice"},{"text":"work!"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(payload).unwrap(), "Nice\nwork!");
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let payload: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            extract_text(payload),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_api_error_reads_message() {
        let err = parse_api_error(r#"{"error":{"message":"API key not valid"}}"#).unwrap();
        assert!(matches!(err, LlmError::Api { message } if message == "API key not valid"));
    }

    #[test]
    fn parse_api_error_ignores_unknown_shape() {
        assert!(parse_api_error("not-json").is_none());
    }

    #[test]
    fn fallback_praise_is_stable() {
        assert_snapshot!(
            fallback_praise(),
            @"Sorry, I couldn't think of the right words... but great work today!"
        );
    }
}
