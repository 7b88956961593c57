//! Scripted upstream doubles shared by unit tests.

use crate::config::OpenAISettings;
use crate::embedding::Embedder;
use crate::error::{ProfRagError, Result};
use crate::generation::{ChatModel, TextStream};
use crate::rag::ChatMessage;
use crate::vector_index::{IndexMatch, IndexRecord, IndexStats, Metadata, VectorIndex};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered log of upstream calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct MockEmbedder {
    pub log: CallLog,
    pub vector: Vec<f32>,
    pub fail: bool,
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.log.lock().unwrap().push(format!("embed:{}", text));
        if self.fail {
            return Err(ProfRagError::OpenAI("invalid api key".to_string()));
        }
        Ok(self.vector.clone())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.log.lock().unwrap().push(format!("embed_batch:{}", texts.len()));
        if self.fail {
            return Err(ProfRagError::OpenAI("invalid api key".to_string()));
        }
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

pub struct MockIndex {
    pub log: CallLog,
    pub matches: Vec<IndexMatch>,
    pub fail: bool,
    pub upserted: Mutex<Vec<IndexRecord>>,
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>> {
        self.log.lock().unwrap().push(format!(
            "query:dims={}:top_k={}:metadata={}",
            vector.len(),
            top_k,
            include_metadata
        ));
        if self.fail {
            return Err(ProfRagError::Pinecone {
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize> {
        self.log.lock().unwrap().push(format!("upsert:{}", records.len()));
        self.upserted.lock().unwrap().extend(records.iter().cloned());
        Ok(records.len())
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        self.log.lock().unwrap().push("stats".to_string());
        Ok(IndexStats {
            total_vector_count: self.upserted.lock().unwrap().len() as u64,
            ..IndexStats::default()
        })
    }
}

/// Scripted chunk for [`MockChatModel`]. `Empty` mimics a chunk without a delta.
pub enum Chunk {
    Text(&'static str),
    Empty,
    Fail,
}

pub struct MockChatModel {
    pub log: CallLog,
    pub chunks: Vec<Chunk>,
    pub fail_on_start: bool,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TextStream> {
        self.log
            .lock()
            .unwrap()
            .push(format!("generate:{}", messages.len()));
        self.seen.lock().unwrap().push(messages.to_vec());
        if self.fail_on_start {
            return Err(ProfRagError::OpenAI("model not found".to_string()));
        }

        let items: Vec<Option<Result<String>>> = self
            .chunks
            .iter()
            .map(|c| match c {
                Chunk::Text(t) => Some(Ok(t.to_string())),
                Chunk::Empty => None,
                Chunk::Fail => Some(Err(ProfRagError::OpenAI("connection reset".to_string()))),
            })
            .collect();

        Ok(stream::iter(items).filter_map(|item| async move { item }).boxed())
    }
}

/// The three upstreams wired to one call log.
pub struct Upstreams {
    pub log: CallLog,
    pub embedder: Arc<MockEmbedder>,
    pub index: Arc<MockIndex>,
    pub model: Arc<MockChatModel>,
}

impl Upstreams {
    pub fn new(matches: Vec<IndexMatch>, chunks: Vec<Chunk>) -> Self {
        let log = CallLog::default();
        Self {
            embedder: Arc::new(MockEmbedder {
                log: log.clone(),
                vector: vec![0.1, 0.2, 0.3],
                fail: false,
            }),
            index: Arc::new(MockIndex {
                log: log.clone(),
                matches,
                fail: false,
                upserted: Mutex::new(Vec::new()),
            }),
            model: Arc::new(MockChatModel {
                log: log.clone(),
                chunks,
                fail_on_start: false,
                seen: Mutex::new(Vec::new()),
            }),
            log,
        }
    }

    pub fn with_failing_embedder(mut self) -> Self {
        self.embedder = Arc::new(MockEmbedder {
            log: self.log.clone(),
            vector: Vec::new(),
            fail: true,
        });
        self
    }

    pub fn with_failing_index(mut self) -> Self {
        self.index = Arc::new(MockIndex {
            log: self.log.clone(),
            matches: Vec::new(),
            fail: true,
            upserted: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn with_failing_model(mut self) -> Self {
        self.model = Arc::new(MockChatModel {
            log: self.log.clone(),
            chunks: Vec::new(),
            fail_on_start: true,
            seen: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

/// A review match with the standard metadata attributes.
pub fn review_match(id: &str, review: &str, subject: &str, stars: i64) -> IndexMatch {
    let metadata: Metadata = json!({"review": review, "subject": subject, "stars": stars})
        .as_object()
        .cloned()
        .unwrap_or_default();
    IndexMatch::new(id, 0.9, metadata)
}

/// Requests received by [`FakeOpenAI`] as `(path, JSON body)`, in arrival order.
pub type Requests = Arc<Mutex<Vec<(String, Value)>>>;

/// How [`FakeOpenAI`] answers.
#[derive(Clone, Default)]
pub struct OpenAIScript {
    /// Content deltas streamed by `/chat/completions`.
    pub deltas: Vec<&'static str>,
    /// Reject `/chat/completions` with this status and an OpenAI error body.
    pub reject_chat: Option<StatusCode>,
    /// Pause before each server-sent event.
    pub event_delay: Duration,
}

#[derive(Clone)]
struct FakeState {
    script: Arc<OpenAIScript>,
    requests: Requests,
}

/// OpenAI API stand-in serving `/embeddings` and streamed `/chat/completions`
/// on a random local port.
pub struct FakeOpenAI {
    pub base: String,
    pub requests: Requests,
}

impl FakeOpenAI {
    pub async fn start(script: OpenAIScript) -> Self {
        let requests = Requests::default();
        let state = FakeState {
            script: Arc::new(script),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/embeddings", post(fake_embeddings))
            .route("/chat/completions", post(fake_chat_completions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            requests,
        }
    }

    /// Client settings pointing at this server.
    pub fn settings(&self) -> OpenAISettings {
        OpenAISettings {
            api_base: Some(self.base.clone()),
            connect_timeout_secs: 5,
            read_timeout_secs: 5,
        }
    }

    /// Bodies received on `path`.
    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

/// Answers in reverse index order so callers must sort.
async fn fake_embeddings(State(state): State<FakeState>, Json(body): Json<Value>) -> Json<Value> {
    let inputs = body["input"].as_array().map(|a| a.len()).unwrap_or(1);
    let model = body["model"].clone();
    state
        .requests
        .lock()
        .unwrap()
        .push(("/embeddings".to_string(), body));

    let data: Vec<Value> = (0..inputs)
        .rev()
        .map(|i| json!({"object": "embedding", "index": i, "embedding": [i as f32, 0.5]}))
        .collect();
    Json(json!({
        "object": "list",
        "data": data,
        "model": model,
        "usage": {"prompt_tokens": 1, "total_tokens": 1}
    }))
}

async fn fake_chat_completions(
    State(state): State<FakeState>,
    Json(body): Json<Value>,
) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(("/chat/completions".to_string(), body));

    if let Some(status) = state.script.reject_chat {
        let error = json!({"error": {
            "message": "Incorrect API key provided",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }});
        return (status, Json(error)).into_response();
    }

    let mut events = vec![sse_chunk(json!({"role": "assistant", "content": ""}), None)];
    events.extend(
        state
            .script
            .deltas
            .iter()
            .map(|delta| sse_chunk(json!({"content": delta}), None)),
    );
    events.push(sse_chunk(json!({}), Some("stop")));
    events.push("data: [DONE]\n\n".to_string());

    let delay = state.script.event_delay;
    let body = stream::iter(events).then(move |event| async move {
        tokio::time::sleep(delay).await;
        Ok::<_, Infallible>(event)
    });

    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(body),
    )
        .into_response()
}

fn sse_chunk(delta: Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1,
        "model": "gpt-3.5-turbo",
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    });
    format!("data: {}\n\n", chunk)
}
