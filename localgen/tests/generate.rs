use genapi::{
    ContentGenerator, ContentInput, FinishReason, GenerateError, GenerateOptions,
    GenerateRequest, Part, Role,
};
use httpmock::Method::POST;
use httpmock::MockServer;
use localgen::{LocalConfig, LocalGenerator};
use serde_json::json;

fn generator_for(server: &MockServer) -> LocalGenerator {
    LocalGenerator::new(LocalConfig::new(server.base_url(), "gemma3:27b"))
}

#[tokio::test]
async fn buffered_reply_maps_to_one_model_candidate() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"hi there","done":true,"prompt_eval_count":3,"eval_count":2}"#);
    });

    let generator = generator_for(&server);
    let response = generator
        .generate(GenerateRequest::text("hello"))
        .await
        .unwrap();
    mock.assert();

    assert_eq!(response.candidates.len(), 1);
    let candidate = &response.candidates[0];
    assert_eq!(candidate.content.role, Role::Model);
    assert_eq!(candidate.finish_reason, Some(FinishReason::Stop));
    assert_eq!(candidate.index, 0);
    assert_eq!(response.text(), Some("hi there"));

    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 3);
    assert_eq!(usage.candidate_tokens, 2);
    assert_eq!(usage.total_tokens, 5);
}

#[tokio::test]
async fn sends_flattened_prompt_and_default_options() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate").json_body(json!({
            "model": "gemma3:27b",
            "prompt": "Hello\nworld",
            "stream": false,
            "options": {"temperature": 0.7, "top_p": 0.9, "top_k": 40},
        }));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"ok","done":true}"#);
    });

    let generator = generator_for(&server);
    let request = GenerateRequest {
        contents: ContentInput::Parts(vec![Part::text("Hello"), Part::text("world")]),
        options: None,
    };
    generator.generate(request).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn caller_options_reach_the_server() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate").json_body(json!({
            "model": "gemma3:27b",
            "prompt": "hi",
            "stream": false,
            "options": {"temperature": 0.2, "top_p": 0.9, "top_k": 10},
        }));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"ok","done":true}"#);
    });

    let generator = generator_for(&server);
    let request = GenerateRequest::text("hi").with_options(GenerateOptions {
        temperature: Some(0.2),
        top_k: Some(10),
        ..Default::default()
    });
    generator.generate(request).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn content_without_text_sends_empty_prompt() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate").json_body(json!({
            "model": "gemma3:27b",
            "prompt": "",
            "stream": false,
            "options": {"temperature": 0.7, "top_p": 0.9, "top_k": 40},
        }));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"","done":true}"#);
    });

    let generator = generator_for(&server);
    let request = GenerateRequest {
        contents: ContentInput::Entries(vec![]),
        options: None,
    };
    let response = generator.generate(request).await.unwrap();
    mock.assert();
    assert_eq!(response.text(), Some(""));
}

#[tokio::test]
async fn missing_reply_fields_map_to_defaults() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"done":true}"#);
    });

    let generator = generator_for(&server);
    let response = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap();
    assert_eq!(response.text(), Some(""));
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 0);
    assert_eq!(usage.candidate_tokens, 0);
    assert_eq!(usage.total_tokens, 0);
}

#[tokio::test]
async fn oversized_usage_counters_saturate_the_total() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"hi","done":true,"prompt_eval_count":4294967295,"eval_count":1}"#);
    });

    let generator = generator_for(&server);
    let response = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap();
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, u32::MAX);
    assert_eq!(usage.candidate_tokens, 1);
    assert_eq!(usage.total_tokens, u32::MAX);
}

#[tokio::test]
async fn unfinished_reply_has_no_finish_reason() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"response":"partial","done":false}"#);
    });

    let generator = generator_for(&server);
    let response = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap();
    assert_eq!(response.candidates[0].finish_reason, None);
    assert_eq!(response.text(), Some("partial"));
}

#[tokio::test]
async fn error_status_surfaces_status_and_body() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(404).body("model 'nope' not found");
    });

    let generator = generator_for(&server);
    let err = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap_err();
    match err {
        GenerateError::Upstream {
            endpoint,
            status,
            reason,
        } => {
            assert_eq!(status, 404);
            assert!(reason.contains("not found"), "reason was {reason:?}");
            assert!(endpoint.contains("127.0.0.1"), "endpoint was {endpoint:?}");
        }
        other => panic!("expected upstream error, got {other}"),
    }
}

#[tokio::test]
async fn empty_error_body_falls_back_to_canonical_reason() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(503);
    });

    let generator = generator_for(&server);
    let err = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap_err();
    match err {
        GenerateError::Upstream { status, reason, .. } => {
            assert_eq!(status, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("expected upstream error, got {other}"),
    }
}

#[tokio::test]
async fn undecodable_reply_is_a_request_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body("this is not json");
    });

    let generator = generator_for(&server);
    let err = generator
        .generate(GenerateRequest::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Request { .. }), "got {err}");
}
