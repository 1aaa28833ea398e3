#![deny(missing_docs)]
//! A web server exposing the LFSR keystream toolkit over HTTP+JSON.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use keystream_core::config::SearchDefaults;
use keystream_core::pipeline::{self, PipelineRequest};
use keystream_core::service::{
    self, DecryptRequest, GenerateLfsrRequest, RunFsm2Request, RunFsm3Request,
};
use keystream_core::KeystreamError;
use local_ip_address::local_ip;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const DEFAULT_PORT: u16 = 5000;

/// Shared application state
struct AppState {
    defaults: SearchDefaults,
}

type Reply = (StatusCode, Json<Value>);

fn respond<T: Serialize>(result: Result<T, KeystreamError>) -> Reply {
    match result {
        Ok(payload) => match serde_json::to_value(payload) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                error!("Failed to serialize response: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("Failed to serialize response: {e}") })),
                )
            }
        },
        Err(e) => {
            warn!("Rejected request: {e}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
    }
}

/// Runs a core computation on the blocking pool and maps its result to a reply.
async fn run_blocking<T, F>(job: F) -> Reply
where
    F: FnOnce() -> Result<T, KeystreamError> + Send + 'static,
    T: Serialize + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => respond(result),
        Err(e) => {
            error!("Worker task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Worker task failed: {e}") })),
            )
        }
    }
}

fn load_defaults() -> SearchDefaults {
    match env::var("KEYSTREAM_DEFAULTS").map(PathBuf::from) {
        Ok(path) => SearchDefaults::from_json_file(&path).unwrap_or_else(|e| {
            error!("{e}");
            std::process::exit(1);
        }),
        Err(_) => SearchDefaults::builtin(),
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/generate_lfsr", post(generate_lfsr_handler))
        .route("/run_fsm", post(run_fsm_handler))
        .route("/run_fsm_2lfsr", post(run_fsm_2lfsr_handler))
        .route("/ms_decryption", post(ms_decryption_handler))
        .route("/run_pipeline", post(run_pipeline_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    // Set up the port from an environment variable or use a default.
    let port = env::var("KEYSTREAM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let defaults = load_defaults();
    info!(
        "Search defaults: {} cipher bits, {} keys, {} dictionary words",
        defaults.cipher_bits.len(),
        defaults.keys.len(),
        defaults.dictionary.len()
    );

    let app_state = Arc::new(AppState { defaults });

    // Run the server.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        });

    println!("listening on:");
    if let Ok(my_local_ip) = local_ip() {
        println!("  - http://{my_local_ip}:{port}");
    }
    println!("  - http://127.0.0.1:{port}");

    if let Err(e) = axum::serve(listener, app(app_state)).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Runs one LFSR until its first repeated state.
async fn generate_lfsr_handler(Json(payload): Json<GenerateLfsrRequest>) -> Reply {
    run_blocking(move || service::generate_lfsr(&payload)).await
}

/// Runs the three-register clock-controlled combiner.
async fn run_fsm_handler(Json(payload): Json<RunFsm3Request>) -> Reply {
    run_blocking(move || service::run_fsm_3(&payload)).await
}

/// Runs one of the two-register alternating-step combiners.
async fn run_fsm_2lfsr_handler(Json(payload): Json<RunFsm2Request>) -> Reply {
    run_blocking(move || service::run_fsm_2(&payload)).await
}

/// Tries candidate keys against a ciphertext, falling back to the configured defaults.
///
/// An empty body is accepted and means "use every default".
async fn ms_decryption_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Reply {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        DecryptRequest::default()
    } else {
        match serde_json::from_slice::<DecryptRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected malformed decryption request: {e}");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Malformed request body: {e}") })),
                );
            }
        }
    };
    run_blocking(move || service::decrypt(&request, &state.defaults)).await
}

/// Generates register streams and combines them.
async fn run_pipeline_handler(Json(payload): Json<PipelineRequest>) -> Reply {
    run_blocking(move || pipeline::run_pipeline(&payload)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            defaults: SearchDefaults::builtin(),
        }))
    }

    #[tokio::test]
    async fn test_generate_lfsr_handler() {
        let request = GenerateLfsrRequest {
            init_state: vec![0, 0, 1],
            taps: vec![0, 2],
            max_steps: None,
        };
        let (status, Json(body)) = generate_lfsr_handler(Json(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], 7);
        assert_eq!(body["theoretical_period"], 7);
        assert_eq!(body["outputs"], json!([1, 0, 0, 1, 1, 1, 0]));
    }

    #[tokio::test]
    async fn test_bad_tap_is_bad_request() {
        let request = GenerateLfsrRequest {
            init_state: vec![0, 0, 1],
            taps: vec![3],
            max_steps: None,
        };
        let (status, Json(body)) = generate_lfsr_handler(Json(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("tap index 3"));
    }

    #[tokio::test]
    async fn test_run_fsm_handler() {
        let request: RunFsm3Request =
            serde_json::from_value(json!({"r1": [1, 0, 1], "r2": [1, 1], "r3": [0, 1]})).unwrap();
        let (status, Json(body)) = run_fsm_handler(Json(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fsm"], json!([1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0]));
        assert_eq!(body["stats"]["r1_index"], 0);
    }

    #[tokio::test]
    async fn test_run_fsm_handler_rejects_huge_step_count() {
        let request: RunFsm3Request = serde_json::from_value(
            json!({"r1": [1], "r2": [1], "r3": [1], "steps": 18_446_744_073_709_551_615u64}),
        )
        .unwrap();
        let (status, Json(body)) = run_fsm_handler(Json(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("exceeds the maximum")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_handlers_run_side_by_side() {
        let mut init_state = vec![0; 20];
        init_state[19] = 1;
        let slow = GenerateLfsrRequest {
            init_state,
            taps: vec![0, 19],
            max_steps: Some(1 << 16),
        };
        let fast = RunFsm2Request {
            r1: vec![1, 0],
            r2: vec![1, 0, 1],
            steps: None,
            variant: service::TwoRegisterVariant::Sparse,
        };
        let (slow_reply, fast_reply) = tokio::join!(
            generate_lfsr_handler(Json(slow)),
            run_fsm_2lfsr_handler(Json(fast))
        );
        assert_eq!(slow_reply.0, StatusCode::OK);
        let (status, Json(body)) = fast_reply;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fsm"], json!([1, 1, 0]));
    }

    #[tokio::test]
    async fn test_run_fsm_2lfsr_handler_rejects_empty_stream() {
        let request: RunFsm2Request =
            serde_json::from_value(json!({"r1": [], "r2": [1]})).unwrap();
        let (status, _) = run_fsm_2lfsr_handler(Json(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ms_decryption_without_body_uses_defaults() {
        let (status, Json(body)) = ms_decryption_handler(state(), Bytes::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best"]["key_index"], 5);
        assert_eq!(body["best"]["decoded_text"], "FINDELEXERCICE");
        assert_eq!(body["per_key"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn test_ms_decryption_with_custom_keys() {
        let body = Bytes::from(r#"{"keys": [[1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0]]}"#);
        let (status, Json(body)) = ms_decryption_handler(state(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best"]["key_index"], 1);
        assert_eq!(body["best"]["score"], 17);
    }

    #[tokio::test]
    async fn test_ms_decryption_rejects_malformed_body() {
        let (status, Json(body)) =
            ms_decryption_handler(state(), Bytes::from(r#"{"keys": 3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) =
            ms_decryption_handler(state(), Bytes::from(r#"{"keys": [[]]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_pipeline_handler() {
        let request = pipeline::preset("two-register").unwrap();
        let (status, Json(body)) = run_pipeline_handler(Json(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["output_length"], 124);
        assert_eq!(body["registers"].as_array().map(Vec::len), Some(2));
    }
}
