//! Blocking HTTP client for the Gemini `generateContent` API.
//!
//! Calls are synchronous with an explicit request timeout; the store wraps
//! them so a slow or dead endpoint surfaces as a [`GeneratorError`] instead
//! of hanging a save. The API key travels in the `x-goog-api-key` header.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config;

use super::{
    parse_outline, parse_refinement, outline_prompt, refine_prompt, ContentGenerator,
    DocOutline, GeneratorError, OutlineRequest, RefineAction,
};

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ─── Client ─────────────────────────────────────────────────────────────────

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeneratorError> {
        Self::with_base_url(config::GEMINI_BASE_URL, api_key)
    }

    /// Point the client at a different endpoint, e.g. a local stub in tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GeneratorError> {
        let timeout_secs = config::GENERATOR_TIMEOUT_SECS;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GeneratorError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config::GEMINI_MODEL.to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// One `generateContent` round-trip; returns the first candidate's text.
    fn generate(&self, prompt: &str, want_json: bool) -> Result<String, GeneratorError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: want_json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "calling generation service");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    GeneratorError::Connection(self.base_url.clone())
                } else {
                    GeneratorError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeneratorError::MalformedResponse(
                "response contained no candidate text".into(),
            ));
        }
        Ok(text)
    }
}

impl ContentGenerator for GeminiClient {
    fn generate_outline(&self, request: &OutlineRequest) -> Result<DocOutline, GeneratorError> {
        let prompt = outline_prompt(request);
        let raw = self.generate(&prompt, true)?;
        let outline = parse_outline(&raw)?;
        info!(
            sections = outline.sections.len(),
            level = request.level.as_str(),
            "generated document outline"
        );
        Ok(outline)
    }

    fn refine(&self, content: &str, action: RefineAction) -> Result<String, GeneratorError> {
        if content.trim().is_empty() {
            return Err(GeneratorError::NothingToRefine);
        }
        let prompt = refine_prompt(content, action);
        let raw = self.generate(&prompt, false)?;
        parse_refinement(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client =
            GeminiClient::with_base_url("http://localhost:9999/", "test-key").unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn refining_empty_content_fails_without_a_request() {
        // Unroutable endpoint: the guard must fire before any network use.
        let client = GeminiClient::with_base_url("http://localhost:1", "k").unwrap();
        assert!(matches!(
            client.refine("   ", RefineAction::Polish),
            Err(GeneratorError::NothingToRefine)
        ));
    }

    #[test]
    fn request_body_matches_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""contents":[{"parts":[{"text":"hello"}]}]"#));
        assert!(json.contains(r#""generationConfig":{"responseMimeType":"application/json"}"#));
    }

    #[test]
    fn response_text_is_extracted_from_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"part one "},{"text":"part two"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "part one part two");
    }
}
