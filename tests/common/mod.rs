#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};
use xeno::XenoClient;

pub const API_KEY: &str = "test_api_key";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A client pointed at the mock server with default retry settings.
pub fn client(server: &MockServer) -> XenoClient {
    client_with(server, 2, Duration::from_secs(5))
}

pub fn client_with(server: &MockServer, max_retries: u32, timeout: Duration) -> XenoClient {
    init_tracing();
    XenoClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .max_retries(max_retries)
        .timeout(timeout)
        .build()
        .unwrap()
}

pub fn generation_body(id: &str, status: &str, data: Option<Value>) -> Value {
    let mut body = json!({
        "id": id,
        "status": status,
        "created": 1752091365,
    });
    if let Some(data) = data {
        body["data"] = data;
    }
    body
}

/// Replies with each status in turn, repeating the last one once exhausted.
pub struct StatusSequence {
    id: &'static str,
    statuses: Vec<&'static str>,
    data: Value,
    calls: AtomicUsize,
}

impl StatusSequence {
    pub fn new(id: &'static str, statuses: Vec<&'static str>, data: Value) -> Self {
        Self {
            id,
            statuses,
            data,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses[call.min(self.statuses.len() - 1)];
        let data = (status == "completed").then(|| self.data.clone());
        ResponseTemplate::new(200).set_body_json(generation_body(self.id, status, data))
    }
}
