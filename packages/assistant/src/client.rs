use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::decode::dedup_citations;
use crate::error::{AssistantError, Result};
use crate::request::{Content, ContentRole, Part, RequestDescriptor, Tool};
use crate::schema::Schema;

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("civicai-assistant/", env!("CARGO_PKG_VERSION"));

/// Text returned by the model plus the web sources it cited, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    /// Unique, in first-seen order.
    pub citations: Vec<String>,
}

/// Trait for model clients, enabling mocking in tests.
///
/// One call is one round trip: implementations must not retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &RequestDescriptor) -> Result<ModelResponse>;
}

/// Client for the hosted `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base_url, self.config.model
        )
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &RequestDescriptor) -> Result<ModelResponse> {
        // Resolved per call so a missing key fails before anything is sent.
        let api_key = self.config.credential.resolve()?;

        let url = self.endpoint();
        let body = GenerateContentRequest::from_descriptor(request);

        debug!(
            model = %self.config.model,
            use_case = %request.use_case,
            turns = request.contents.len(),
            json = request.expects_json(),
            web_search = request.uses_web_search(),
            "sending model request"
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(use_case = %request.use_case, error = %e, "model request failed");
                AssistantError::Request(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body_text)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body_text);
            warn!(
                use_case = %request.use_case,
                status = status.as_u16(),
                message = %message,
                "model API error"
            );
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| AssistantError::ResponseParse(e.to_string()))?;

        let response = api_response.into_model_response();
        debug!(
            use_case = %request.use_case,
            text_len = response.text.len(),
            citations = response.citations.len(),
            "received model response"
        );

        Ok(response)
    }
}

// Wire types for the generateContent request.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_descriptor(request: &'a RequestDescriptor) -> Self {
        let system_instruction = request.system_instruction.as_deref().map(|text| WireContent {
            role: None,
            parts: vec![WirePart::Text { text }],
        });

        let tools = request
            .tools
            .iter()
            .map(|tool| match tool {
                Tool::WebSearch => WireTool {
                    google_search: EmptyObject {},
                },
            })
            .collect();

        let generation_config = (request.temperature.is_some() || request.response_schema.is_some())
            .then(|| GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.response_schema.as_ref().map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
            });

        Self {
            contents: request.contents.iter().map(WireContent::from).collect(),
            system_instruction,
            tools,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart<'a>>,
}

impl<'a> From<&'a Content> for WireContent<'a> {
    fn from(content: &'a Content) -> Self {
        let role = match content.role {
            ContentRole::User => "user",
            ContentRole::Model => "model",
        };
        let parts = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::Text { text },
                Part::Image(image) => WirePart::InlineData {
                    inline_data: WireBlob {
                        mime_type: image.mime_type(),
                        data: image.data(),
                    },
                },
            })
            .collect();

        Self {
            role: Some(role),
            parts,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: EmptyObject,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Schema>,
}

// Wire types for the response.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    /// Only the first candidate counts. Thought parts are not answer text.
    fn into_model_response(self) -> ModelResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelResponse::default();
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let uris = candidate
            .grounding_metadata
            .map(|g| g.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.and_then(|w| w.uri));

        ModelResponse {
            text,
            citations: dedup_citations(uris),
        }
    }
}

/// Test utilities for the model client.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Mock model client. Returns pre-configured responses in order and
    /// records every request it receives.
    pub struct MockModelClient {
        responses: Mutex<Vec<Result<ModelResponse>>>,
        requests: Mutex<Vec<RequestDescriptor>>,
    }

    impl MockModelClient {
        pub fn new(responses: Vec<Result<ModelResponse>>) -> Self {
            // Reverse so we can pop from the end
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_text(text: &str) -> Self {
            Self::with_grounded_text(text, &[])
        }

        pub fn with_grounded_text(text: &str, citations: &[&str]) -> Self {
            Self::new(vec![Ok(ModelResponse {
                text: text.to_string(),
                citations: citations.iter().map(|c| c.to_string()).collect(),
            })])
        }

        pub fn failing(error: AssistantError) -> Self {
            Self::new(vec![Err(error)])
        }

        /// Requests received so far, oldest first.
        pub fn requests(&self) -> Vec<RequestDescriptor> {
            self.requests
                .lock()
                .map(|r| r.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ModelClient for MockModelClient {
        async fn generate(&self, request: &RequestDescriptor) -> Result<ModelResponse> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            let mut responses = self.responses.lock().map_err(|e| {
                AssistantError::ResponseParse(format!("mock lock poisoned: {e}"))
            })?;
            responses.pop().unwrap_or_else(|| {
                Err(AssistantError::Api {
                    status: 500,
                    message: "no mock response queued".into(),
                })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::request::{build_request, InlineImage, Query};
    use civicai_shared::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_body_for_grounded_chat() {
        let history = vec![Message::assistant("Hello! How can I help?")];
        let request = build_request(
            &Query::ServiceGuide {
                query: "Passport renewal",
                history: &history,
            },
            Language::English,
        );

        let body = serde_json::to_value(GenerateContentRequest::from_descriptor(&request))
            .expect("serialize");

        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["role"], "user");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "Passport renewal");
        assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["temperature"], json!(0.1f32));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_request_body_for_schema_call() {
        let request = build_request(
            &Query::QueryClassification {
                query: "large pothole blocking traffic",
            },
            Language::English,
        );
        let body = serde_json::to_value(GenerateContentRequest::from_descriptor(&request))
            .expect("serialize");

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body["generationConfig"].get("temperature").is_none());
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_request_body_for_image() {
        let image = InlineImage::from_bytes("image/jpeg", b"jpeg-bytes");
        let request = build_request(&Query::Transcription { image: &image }, Language::English);
        let body = serde_json::to_value(GenerateContentRequest::from_descriptor(&request))
            .expect("serialize");

        assert_eq!(
            body["contents"][0]["parts"][0],
            json!({ "inlineData": { "mimeType": "image/jpeg", "data": "anBlZy1ieXRlcw==" } })
        );
        assert_eq!(
            body["contents"][0]["parts"][1]["text"],
            "Transcribe form image text."
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_and_citations() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Apply at " },
                        { "text": "the passport portal." }
                    ]
                },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://x.gov.in", "title": "x" } },
                        { "web": { "uri": "https://y.nic.in" } },
                        { "retrievedContext": { "uri": "ignored" } },
                        { "web": { "uri": "https://x.gov.in" } }
                    ]
                }
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).expect("parse");
        let response = parsed.into_model_response();

        assert_eq!(response.text, "Apply at the passport portal.");
        assert_eq!(response.citations, vec!["https://x.gov.in", "https://y.nic.in"]);
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({})).expect("parse");
        assert_eq!(parsed.into_model_response(), ModelResponse::default());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_sending() {
        let config = AssistantConfig::builder()
            // Port 9 (discard); never reached because the key check fails first.
            .api_base_url("http://127.0.0.1:9")
            .api_key_env("CIVICAI_CLIENT_TEST_KEY_NEVER_SET")
            .build();
        let client = GeminiClient::new(&config).expect("client creation");
        let request = build_request(&Query::QueryClassification { query: "q" }, Language::English);

        let err = client.generate(&request).await.expect_err("should fail");
        assert!(err.is_config(), "expected config error, got {err}");
    }

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = test_support::MockModelClient::new(vec![
            Ok(ModelResponse {
                text: "first".into(),
                citations: vec![],
            }),
            Ok(ModelResponse {
                text: "second".into(),
                citations: vec![],
            }),
        ]);
        let request = build_request(&Query::QueryClassification { query: "q" }, Language::English);

        assert_eq!(mock.generate(&request).await.expect("first").text, "first");
        assert_eq!(mock.generate(&request).await.expect("second").text, "second");
        assert!(mock.generate(&request).await.is_err());
        assert_eq!(mock.requests().len(), 3);
    }
}
