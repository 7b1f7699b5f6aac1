//! Shared fixtures: an in-process fake backend, session helpers, and a silent microphone.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use relive_core::capture::{AudioInput, AudioStream, CaptureError};
use relive_core::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use relive_core::media::{AssetKind, AssetOrigin, MediaAsset};
use relive_core::memory::{MemoryId, MemoryRecord};
use relive_core::session::{AuthTokens, InMemorySessionStore};
use relive_core::Result;
use relive_interaction::{ReliveApi, TokenLifecycleManager};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "correct-horse";

pub fn jwt_expiring_in(seconds: i64, tag: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + seconds;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp, "jti": tag }).to_string());
    format!("{}.{}.sig", header, payload)
}

#[derive(Default)]
struct BackendState {
    next_memory_id: u64,
    refresh_calls: usize,
    /// Bearer tokens answered with 401
    rejected_tokens: HashSet<String>,
    /// Status forced for every request to a path
    failing_paths: HashMap<String, u16>,
    /// Uploaded file names answered with 500
    failing_files: HashSet<String>,
    /// Unused connect codes and the patient each one links to
    connect_codes: HashMap<String, (u64, String)>,
    linked_patients: Vec<(u64, String)>,
}

/// A fake ReLive server living in the test process.
pub struct FakeBackend {
    state: Mutex<BackendState>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BackendState {
                next_memory_id: 100,
                ..BackendState::default()
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn reject_token(&self, token: &str) {
        self.state.lock().unwrap().rejected_tokens.insert(token.to_string());
    }

    pub fn fail_path(&self, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failing_paths
            .insert(path.to_string(), status);
    }

    pub fn heal_path(&self, path: &str) {
        self.state.lock().unwrap().failing_paths.remove(path);
    }

    pub fn fail_file(&self, file_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_files
            .insert(file_name.to_string());
    }

    pub fn heal_file(&self, file_name: &str) {
        self.state.lock().unwrap().failing_files.remove(file_name);
    }

    /// Makes `code` link the caller to the given patient, once.
    pub fn issue_code(&self, code: &str, patient_id: u64, username: &str) {
        self.state
            .lock()
            .unwrap()
            .connect_codes
            .insert(code.to_string(), (patient_id, username.to_string()));
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().unwrap().refresh_calls
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `METHOD path` of every request, in order.
    pub fn log(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.spec.method, r.spec.path))
            .collect()
    }

    fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock().unwrap();
        let spec = &request.spec;
        let path = spec.path.as_str();

        if let Some(status) = state.failing_paths.get(path) {
            return HttpResponse::new(*status, r#"{"detail":"forced failure"}"#);
        }

        match (spec.method, path) {
            (HttpMethod::Post, "/auth/login/") | (HttpMethod::Post, "/auth/register/") => {
                let RequestBody::Json(body) = &spec.body else {
                    return HttpResponse::new(400, "{}");
                };
                if body["password"] != PASSWORD {
                    return HttpResponse::new(400, r#"{"error":"Invalid credentials"}"#);
                }
                return json(
                    200,
                    serde_json::json!({
                        "access": jwt_expiring_in(3600, "login"),
                        "refresh": "refresh-1"
                    }),
                );
            }
            (HttpMethod::Post, "/token/refresh/") => {
                state.refresh_calls += 1;
                let tag = format!("refreshed-{}", state.refresh_calls);
                return json(200, serde_json::json!({ "access": jwt_expiring_in(3600, &tag) }));
            }
            _ => {}
        }

        match &request.bearer {
            Some(token) if !state.rejected_tokens.contains(token) => {}
            _ => return HttpResponse::new(401, r#"{"detail":"Given token not valid"}"#),
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (spec.method, segments.as_slice()) {
            (HttpMethod::Get, ["auth", "me"]) => json(
                200,
                serde_json::json!({ "role": "patient", "username": "mika" }),
            ),
            (HttpMethod::Get, ["memories"]) => json(200, serde_json::json!([])),
            (HttpMethod::Get, ["family-links", "my-patients"]) => {
                let patients: Vec<_> = state
                    .linked_patients
                    .iter()
                    .map(|(id, username)| {
                        serde_json::json!({
                            "id": id, "username": username, "name": username,
                            "avatar": null, "relation": ""
                        })
                    })
                    .collect();
                json(200, serde_json::json!(patients))
            }
            (HttpMethod::Post, ["family-links", "connect"]) => {
                let code = match &spec.body {
                    RequestBody::Json(body) => body["code"].as_str().unwrap_or_default(),
                    _ => "",
                };
                match state.connect_codes.remove(code) {
                    Some((id, username)) => {
                        state.linked_patients.push((id, username.clone()));
                        json(
                            201,
                            serde_json::json!({
                                "message": "Connected successfully",
                                "patient": { "id": id, "username": username },
                                "bidirectional": true
                            }),
                        )
                    }
                    None => HttpResponse::new(400, r#"{"detail":"Invalid or expired code."}"#),
                }
            }
            (HttpMethod::Post, ["memories"]) => {
                state.next_memory_id += 1;
                let id = state.next_memory_id;
                json(201, memory_json(id, &spec.body))
            }
            (HttpMethod::Put, ["memories", id]) => match id.parse::<u64>() {
                Ok(id) => json(200, memory_json(id, &spec.body)),
                Err(_) => HttpResponse::new(404, "{}"),
            },
            (HttpMethod::Post, ["memories", _, "images" | "videos" | "recordings"]) => {
                let RequestBody::Multipart(form) = &spec.body else {
                    return HttpResponse::new(400, "{}");
                };
                let failing = form
                    .files
                    .iter()
                    .any(|f| state.failing_files.contains(&f.file_name));
                if failing {
                    HttpResponse::new(500, r#"{"detail":"storage unavailable"}"#)
                } else {
                    json(201, serde_json::json!({ "id": 1 }))
                }
            }
            (HttpMethod::Post, ["memories", _, "like"]) => {
                json(201, serde_json::json!({ "message": "Memory liked", "liked": true }))
            }
            (HttpMethod::Delete, ["memories", _, "like"]) => {
                json(200, serde_json::json!({ "message": "Memory unliked", "liked": false }))
            }
            (HttpMethod::Delete, ["memories", _]) => HttpResponse::new(204, ""),
            (
                HttpMethod::Delete,
                ["memory-images" | "memory-videos" | "memory-recordings", _],
            ) => HttpResponse::new(204, ""),
            _ => HttpResponse::new(404, r#"{"detail":"Not found."}"#),
        }
    }
}

fn json(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

fn memory_json(id: u64, body: &RequestBody) -> serde_json::Value {
    let field = |name: &str| match body {
        RequestBody::Multipart(form) => form.field(name).unwrap_or_default().to_string(),
        _ => String::new(),
    };
    serde_json::json!({
        "id": id,
        "title": field("title"),
        "description": field("description"),
        "date": field("date"),
        "location": field("location"),
        "tag": field("tag"),
        "likes_count": 0,
        "is_liked": false
    })
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.respond(&request))
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub store: Arc<InMemorySessionStore>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub api: ReliveApi,
}

/// Wires the client stack against a fresh fake backend.
pub fn harness(tokens: Option<AuthTokens>) -> Harness {
    let backend = FakeBackend::new();
    let store = Arc::new(match tokens {
        Some(tokens) => InMemorySessionStore::with_tokens(tokens),
        None => InMemorySessionStore::new(),
    });
    let tokens = Arc::new(TokenLifecycleManager::new(
        backend.clone(),
        store.clone(),
        chrono::Duration::seconds(300),
    ));
    let api = ReliveApi::new(backend.clone(), tokens.clone());
    Harness {
        backend,
        store,
        tokens,
        api,
    }
}

/// A harness with a session that stays valid for an hour.
pub fn logged_in() -> Harness {
    harness(Some(AuthTokens::new(
        jwt_expiring_in(3600, "session"),
        "refresh-1",
    )))
}

pub fn asset(kind: AssetKind, file_name: &str) -> MediaAsset {
    let (origin, mime) = match kind {
        AssetKind::Image => (AssetOrigin::FileSelection, "image/jpeg"),
        AssetKind::Video => (AssetOrigin::FileSelection, "video/mp4"),
        AssetKind::Audio => (AssetOrigin::Recording, "audio/webm"),
    };
    MediaAsset::local(
        kind,
        origin,
        file_name,
        mime,
        Bytes::from(file_name.as_bytes().to_vec()),
    )
}

pub fn record(id: u64, is_liked: bool, likes_count: u32) -> MemoryRecord {
    MemoryRecord {
        id: MemoryId(id),
        title: format!("Memory {}", id),
        description: None,
        date: "2024-07-01".into(),
        location: None,
        tag: None,
        username: None,
        resolved_image_url: None,
        likes_count,
        is_liked,
        created_at: None,
    }
}

/// A microphone that grants access but never produces audio.
pub struct SilentMicrophone {
    open: Arc<AtomicBool>,
}

impl SilentMicrophone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            open: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

struct SilentStream {
    open: Arc<AtomicBool>,
    stopping: bool,
}

#[async_trait]
impl AudioStream for SilentStream {
    async fn next_chunk(&mut self) -> std::result::Result<Option<Bytes>, CaptureError> {
        if self.stopping {
            return Ok(None);
        }
        std::future::pending().await
    }

    fn request_stop(&mut self) {
        self.stopping = true;
    }

    fn release(&mut self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioInput for SilentMicrophone {
    async fn open(&self) -> std::result::Result<Box<dyn AudioStream>, CaptureError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(Box::new(SilentStream {
            open: self.open.clone(),
            stopping: false,
        }))
    }
}
