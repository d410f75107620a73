//! `TgiClient` against a mock HTTP server: request body shape, response
//! mapping, SSE stream decoding, and error propagation.

use futures::StreamExt;
use mockito::Matcher;
use serde_json::json;
use tgi_gateway::backend::{BackendError, FinishReason, TextGeneration, TgiClient};

#[tokio::test]
async fn generate_sends_tgi_parameters_and_maps_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/generate")
        .match_body(Matcher::Json(json!({
            "inputs": "<s>hi [/INST] </s><s>[INST] [/INST]",
            "parameters": {"max_new_tokens": 16, "details": true}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "generated_text": "hello back",
                "details": {"finish_reason": "length", "generated_tokens": 3}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = TgiClient::new(server.url()).unwrap();
    let result = client
        .generate("<s>hi [/INST] </s><s>[INST] [/INST]", 16)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.generated_text, "hello back");
    assert_eq!(result.details.finish_reason, FinishReason::Length);
    assert_eq!(result.details.generated_tokens, 3);
}

#[tokio::test]
async fn generate_stream_decodes_token_events() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/generate_stream")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(
            "data: {\"token\":{\"text\":\"a\"}}\n\n\
             data: {\"token\":{\"text\":\"b\"},\"details\":{\"finish_reason\":\"stop_sequence\",\"generated_tokens\":2}}\n\n",
        )
        .create_async()
        .await;

    let client = TgiClient::new(server.url()).unwrap();
    let stream = client.generate_stream("prompt", 8).await.unwrap();
    let events: Vec<_> = stream.map(|e| e.unwrap()).collect::<Vec<_>>().await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].token.text, "a");
    assert!(events[0].details.is_none());
    assert_eq!(events[1].token.text, "b");
    assert_eq!(
        events[1].details.as_ref().unwrap().finish_reason,
        FinishReason::StopSequence
    );
}

#[tokio::test]
async fn non_success_status_becomes_backend_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/generate")
        .with_status(422)
        .with_body("Input validation error: inputs too long")
        .create_async()
        .await;

    let client = TgiClient::new(server.url()).unwrap();
    let err = client.generate("prompt", 8).await.unwrap_err();

    match err {
        BackendError::Status { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("too long"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
