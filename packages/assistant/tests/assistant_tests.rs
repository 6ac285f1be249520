use civicai_assistant::{
    AssistantConfig, AssistantError, ChatMode, CitizenAssistant, GeminiClient, Language,
};
use civicai_shared::{Priority, UserProfile};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

fn test_config(server: &MockServer) -> AssistantConfig {
    AssistantConfig::builder()
        .model("test-model")
        .api_base_url(server.uri())
        .api_key("test-key")
        .build()
}

fn model_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }],
        "modelVersion": "test-model"
    })
}

fn grounded_response(text: &str, uris: &[&str]) -> serde_json::Value {
    let chunks: Vec<_> = uris
        .iter()
        .map(|uri| json!({ "web": { "uri": uri, "title": "source" } }))
        .collect();
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "groundingMetadata": { "groundingChunks": chunks }
        }]
    })
}

#[tokio::test]
async fn test_classify_query_e2e() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response(
            r#"{"category":"Infrastructure","priority":"High","department":"Public Works","urgencyReason":"Safety hazard"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let result = CitizenAssistant::new(&client)
        .classify_query("large pothole blocking traffic", Language::English)
        .await
        .expect("classification");

    assert_eq!(result.category, "Infrastructure");
    assert_eq!(result.priority, Some(Priority::High));
    assert_eq!(result.department, "Public Works");
    assert_eq!(result.urgency_reason, "Safety hazard");
}

#[tokio::test]
async fn test_prose_reply_decodes_to_empty_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(model_response("Sure, here's the info you wanted!")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let info = CitizenAssistant::new(&client)
        .fetch_service_info("Passport", Language::English)
        .await
        .expect("soft failure, not an error");

    assert!(info.summary.is_empty());
    assert!(info.steps.is_empty());
}

#[tokio::test]
async fn test_out_of_set_enum_rejects_whole_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response(
            r#"{"category":"Water","priority":"Critical","department":"Jal Board","urgencyReason":"No supply"}"#,
        )))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let result = CitizenAssistant::new(&client)
        .classify_query("no water for three days", Language::Hindi)
        .await
        .expect("soft failure, not an error");

    assert_eq!(result, Default::default());
}

#[tokio::test]
async fn test_api_error_message_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let err = CitizenAssistant::new(&client)
        .analyze_form("Form 16", Language::English)
        .await
        .expect_err("should fail");

    match err {
        AssistantError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credential_fails_before_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let config = AssistantConfig::builder()
        .model("test-model")
        .api_base_url(server.uri())
        .api_key_env("CIVICAI_TEST_KEY_THAT_IS_NEVER_SET")
        .build();
    let client = GeminiClient::new(&config).expect("client creation");

    let err = CitizenAssistant::new(&client)
        .classify_query("pothole", Language::English)
        .await
        .expect_err("should fail");

    assert!(err.is_config());
    assert!(err.to_string().contains("CIVICAI_TEST_KEY_THAT_IS_NEVER_SET"));
}

#[tokio::test]
async fn test_grounded_answer_lists_sources_once_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({ "tools": [{ "googleSearch": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(grounded_response(
            "Renew on the Passport Seva portal.",
            &["https://x.gov.in", "https://y.nic.in", "https://x.gov.in"],
        )))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let answer = CitizenAssistant::new(&client)
        .ask_assistant("passport renewal", &[], Language::English)
        .await
        .expect("answer");

    assert_eq!(
        answer,
        "Renew on the Passport Seva portal.\n\n**Official Sources:**\n\
         - [https://x.gov.in](https://x.gov.in)\n\
         - [https://y.nic.in](https://y.nic.in)"
    );
}

#[tokio::test]
async fn test_scheme_search_decodes_fenced_array() {
    let server = MockServer::start().await;

    let text = r#"```json
[
  {
    "id": "pm-kisan",
    "name": "PM-KISAN",
    "description": "Income support for farmers",
    "eligibility": ["Small and marginal farmers"],
    "benefits": "Rs 6000 per year",
    "officialLink": "https://pmkisan.gov.in"
  }
]
```"#;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response(text)))
        .mount(&server)
        .await;

    let profile = UserProfile {
        state: Some("Maharashtra".into()),
        ..Default::default()
    };
    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let schemes = CitizenAssistant::new(&client)
        .find_eligible_schemes("farming support", &profile, Language::Marathi)
        .await
        .expect("schemes");

    assert_eq!(schemes.len(), 1);
    assert_eq!(schemes[0].name, "PM-KISAN");
    assert_eq!(schemes[0].official_link, "https://pmkisan.gov.in");
}

#[tokio::test]
async fn test_profile_conversation_round_trips_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(model_response("Please upload your Aadhaar.")),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "What do I need?" }] },
                { "role": "model", "parts": [{ "text": "Please upload your Aadhaar." }] },
                { "role": "user", "parts": [{ "text": "Done" }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response("")))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&test_config(&server)).expect("client creation");
    let assistant = CitizenAssistant::new(&client);

    let history = assistant
        .converse(ChatMode::Profile, Vec::new(), "What do I need?", Language::English)
        .await
        .expect("first turn");
    let history = assistant
        .converse(ChatMode::Profile, history, "Done", Language::English)
        .await
        .expect("second turn");

    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["What do I need?", "Please upload your Aadhaar.", "Done", "..."]
    );
}
