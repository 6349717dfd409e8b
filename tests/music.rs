mod common;

use std::time::Duration;

use common::StatusSequence;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xeno::{JobStatus, MusicGenerateOptions, XenoError};

#[tokio::test]
async fn test_generate_already_completed_skips_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/music/generations"))
        .and(body_partial_json(json!({
            "model": "suno-v4",
            "prompt": "an upbeat synthwave track",
            "duration": 120,
            "instrumental": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "mus_1",
            "status": "completed",
            "created": 1752091365,
            "model": "suno-v4",
            "data": [{ "url": "https://cdn.example.com/mus_1.mp3", "title": "Neon", "tags": ["synthwave"] }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/music/generations/mus_1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let track = client
        .music()
        .generate(MusicGenerateOptions::new("an upbeat synthwave track").with_instrumental(true))
        .await
        .unwrap();

    assert_eq!(track.status, JobStatus::Completed);
    let data = track.data.unwrap();
    assert_eq!(data[0].title.as_deref(), Some("Neon"));
    assert_eq!(data[0].tags, vec!["synthwave".to_string()]);
    server.verify().await;
}

#[tokio::test]
async fn test_wait_polls_until_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/music/generations/mus_2"))
        .respond_with(StatusSequence::new(
            "mus_2",
            vec!["pending", "pending", "completed"],
            json!([{ "url": "https://cdn.example.com/mus_2.mp3" }]),
        ))
        .expect(3)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let track = client
        .music()
        .wait("mus_2", Duration::from_millis(10))
        .await
        .unwrap();

    assert_eq!(track.status, JobStatus::Completed);
    server.verify().await;
}

#[tokio::test]
async fn test_get_is_retried_on_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/music/generations/mus_3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(3)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.music().get("mus_3").await.unwrap_err();

    assert!(matches!(err, XenoError::RetriesExhausted { .. }));
    server.verify().await;
}

#[tokio::test]
async fn test_generate_insufficient_credits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/music/generations"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(json!({ "error": { "message": "Not enough credits" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client
        .music()
        .generate(MusicGenerateOptions::new("lullaby"))
        .await
        .unwrap_err();

    assert!(matches!(err, XenoError::InsufficientCredits { .. }));
    server.verify().await;
}
