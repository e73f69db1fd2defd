//! Stub inference backend and canned vision models for integration tests.

use serde_json::{Value, json};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use tempfile::NamedTempFile;
use tiny_http::{Header, Response, Server};
use vision_agent::capability::{
    adapters::register_builtin_tools,
    domain::{CapabilityResult, ImageRef},
    ports::{ModelSpec, PredictRequest, VisionModel, model_loader},
    services::{CapabilityRegistry, ModelCatalog},
};

/// Model that answers every prediction with the same output.
struct CannedModel {
    output: Value,
}

impl VisionModel for CannedModel {
    fn predict(&mut self, _image: &ImageRef, _request: &PredictRequest) -> CapabilityResult<Value> {
        Ok(self.output.clone())
    }
}

fn register_canned(catalog: &ModelCatalog, name: &str, output: Value) {
    catalog
        .register(
            name,
            model_loader(move |_spec: &ModelSpec| {
                Ok(Box::new(CannedModel {
                    output: output.clone(),
                }) as Box<dyn VisionModel>)
            }),
        )
        .expect("register canned model");
}

/// Registry with the built-in tools backed by canned YOLO and SAM models.
///
/// YOLO reports one car; SAM reports two masks.
pub fn builtin_registry() -> Arc<CapabilityRegistry> {
    let catalog = Arc::new(ModelCatalog::new());
    register_canned(
        &catalog,
        "YOLO",
        json!({ "detections": [{ "label": "car", "confidence": 0.91 }] }),
    );
    register_canned(&catalog, "SAM-ViT-H", json!({ "masks": [[1, 0], [0, 1]] }));

    let registry = CapabilityRegistry::new();
    register_builtin_tools(&registry, &catalog).expect("register built-in tools");
    Arc::new(registry)
}

/// Writes a placeholder image file that lives as long as the handle.
pub fn image_file() -> NamedTempFile {
    let mut image = NamedTempFile::new().expect("create image file");
    image
        .write_all(b"placeholder image bytes")
        .expect("write image file");
    image
}

/// Body of a modern completion response carrying `text`.
pub fn modern_completion(text: &str) -> Value {
    json!({ "choices": [{ "index": 0, "text": text }] })
}

/// A request seen by the stub backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

/// HTTP server on an ephemeral local port that answers from a routing
/// function.
///
/// The route receives the request path and JSON body and returns a status
/// code and JSON response.
pub struct StubBackend {
    server: Arc<Server>,
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    worker: Option<JoinHandle<()>>,
}

impl StubBackend {
    /// Starts the stub on a background thread.
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &Value) -> (u16, Value) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind stub backend"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("stub backend listens on TCP")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let worker = std::thread::spawn(move || {
            for mut request in worker_server.incoming_requests() {
                let mut raw = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut raw)
                    .expect("read request body");
                let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
                let path = request.url().to_owned();
                let (status, payload) = route(&path, &body);
                worker_requests
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(RecordedRequest { path, body });

                let response = Response::from_string(payload.to_string())
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("valid header"),
                    );
                request.respond(response).expect("send stub response");
            }
        });

        Self {
            server,
            port,
            requests,
            worker: Some(worker),
        }
    }

    /// Returns the port the stub listens on.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the base URL of the stub.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Returns every request served so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the paths of every request served so far.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.path)
            .collect()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            worker.join().expect("stub backend thread exits cleanly");
        }
    }
}
