mod common;

use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xeno::{ChatCompletionOptions, ChatMessage, Role, XenoError};

fn chunk(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": "gpt-4o",
        "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }]
    })
    .to_string()
}

#[tokio::test]
async fn test_create_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test_api_key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Hello!" }],
            "temperature": 0.25
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Hi there!" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 3, "total_tokens": 6 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let completion = client
        .chat()
        .create(
            ChatCompletionOptions::new(vec![ChatMessage::user("Hello!")]).with_temperature(0.25),
        )
        .await
        .unwrap();

    assert_eq!(completion.choices[0].message.role, Role::Assistant);
    assert_eq!(completion.choices[0].message.content.as_deref(), Some("Hi there!"));
    assert_eq!(completion.usage.unwrap().total_tokens, 6);
    assert_eq!(completion.created.unwrap().timestamp(), 1700000000);
    server.verify().await;
}

#[tokio::test]
async fn test_stream_completion() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {}\n\ndata: not-json\n\n: keep-alive\n\ndata: {}\n\ndata: [DONE]\n\ndata: {}\n\n",
        chunk("Hel"),
        chunk("lo"),
        chunk("never sent")
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let mut stream = client
        .chat()
        .create_stream(ChatCompletionOptions::new(vec![ChatMessage::user("Hi")]))
        .await
        .unwrap();

    let mut text = String::new();
    let mut chunks = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        text.push_str(chunk.content().unwrap_or_default());
        chunks += 1;
    }

    assert_eq!(chunks, 2);
    assert_eq!(text, "Hello");
    server.verify().await;
}

#[tokio::test]
async fn test_stream_error_is_classified_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "message": "Invalid API key" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_with(&server, 3, std::time::Duration::from_secs(5));
    let result = client
        .chat()
        .create_stream(ChatCompletionOptions::new(vec![ChatMessage::user("Hi")]))
        .await;

    match result {
        Err(XenoError::Authentication { message, status }) => {
            assert_eq!(message, "Invalid API key");
            assert_eq!(status, Some(401));
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("expected an error"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_stream_open_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_with(&server, 3, std::time::Duration::from_secs(5));
    let result = client
        .chat()
        .create_stream(ChatCompletionOptions::new(vec![ChatMessage::user("Hi")]))
        .await;

    assert!(matches!(result, Err(XenoError::Json(_))));
    server.verify().await;
}

#[tokio::test]
async fn test_stream_split_tool_call() {
    let server = MockServer::start().await;
    let events = [
        json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "delta": {
                    "role": "assistant",
                    "tool_calls": [{
                        "index": 0,
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "" }
                    }]
                }
            }]
        }),
        json!({
            "id": "chatcmpl-2",
            "choices": [{
                "index": 0,
                "delta": { "tool_calls": [{ "index": 0, "function": { "arguments": "{\"city\":" } }] }
            }]
        }),
        json!({
            "id": "chatcmpl-2",
            "choices": [{
                "index": 0,
                "delta": { "tool_calls": [{ "index": 0, "function": { "arguments": "\"Paris\"}" } }] },
                "finish_reason": "tool_calls"
            }]
        }),
        json!({
            "id": "chatcmpl-2",
            "choices": [],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        }),
    ];
    let mut body: String = events.iter().map(|e| format!("data: {}\n\n", e)).collect();
    body.push_str("data: [DONE]\n\n");
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let chunks: Vec<_> = client
        .chat()
        .create_stream(ChatCompletionOptions::new(vec![ChatMessage::user("Weather?")]))
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(chunks.len(), 4);

    let mut name = None;
    let mut arguments = String::new();
    for chunk in &chunks {
        let chunk = chunk.as_ref().unwrap();
        let Some(choice) = chunk.choices.first() else {
            continue;
        };
        for call in choice.delta.tool_calls.iter().flatten() {
            assert_eq!(call.index, 0);
            if let Some(function) = &call.function {
                if function.name.is_some() {
                    name = function.name.clone();
                }
                arguments.push_str(function.arguments.as_deref().unwrap_or_default());
            }
        }
    }

    assert_eq!(name.as_deref(), Some("get_weather"));
    assert_eq!(arguments, "{\"city\":\"Paris\"}");
    assert_eq!(chunks[3].as_ref().unwrap().usage.unwrap().total_tokens, 18);
    server.verify().await;
}
