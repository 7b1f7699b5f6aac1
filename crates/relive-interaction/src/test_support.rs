//! Scripted transport and token helpers shared by the unit tests.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use relive_core::http::{HttpRequest, HttpResponse, HttpTransport};
use relive_core::{ReliveError, Result};
use std::sync::Mutex;
use std::time::Duration;

/// Builds an unsigned JWT expiring `seconds` from now; `tag` keeps tokens distinct.
pub fn jwt_expiring_in(seconds: i64, tag: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + seconds;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp, "jti": tag }).to_string());
    format!("{}.{}.sig", header, payload)
}

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// A transport answering every request with a handler and recording what it saw.
pub struct ScriptedTransport {
    handler: Handler,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Makes every exchange take `delay`, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.spec.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

pub fn ok(body: serde_json::Value) -> Result<HttpResponse> {
    Ok(HttpResponse::new(200, body.to_string()))
}

pub fn status(code: u16) -> Result<HttpResponse> {
    Ok(HttpResponse::new(code, format!("{{\"detail\":\"status {}\"}}", code)))
}

pub fn connection_refused() -> Result<HttpResponse> {
    Err(ReliveError::transport("connection refused"))
}
