use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use code_runner::{ExecutionService, RunRequest};
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Execution(#[from] code_runner::Error),
    #[error("Server error: {0}")]
    Server(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Execution(e) => match e {
                code_runner::Error::MalformedInput
                | code_runner::Error::MissingField
                | code_runner::Error::PathTraversal
                | code_runner::Error::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
                code_runner::Error::WriteFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<ExecutionService>,
}

pub fn create_app(workspace_root: PathBuf, ceiling: Duration) -> Router {
    create_app_with_service(ExecutionService::new(workspace_root, ceiling))
}

pub fn create_app_with_service(service: ExecutionService) -> Router {
    let state = AppState {
        service: Arc::new(service),
    };

    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check))
        .route("/run_code", post(run_code))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting code runner server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn run_code(State(state): State<AppState>, body: Bytes) -> Result<Response, ServerError> {
    // Parse by hand rather than via the Json extractor so that a body that is
    // not JSON gets the fixed "Invalid JSON payload" shape.
    let raw: RunRequest =
        serde_json::from_slice(&body).map_err(|_| code_runner::Error::MalformedInput)?;

    let outcome = state.service.execute(raw).await?;

    let status = if outcome.is_timeout() {
        StatusCode::REQUEST_TIMEOUT
    } else if outcome.is_fault() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        // The HTTP layer succeeded even when the program exited nonzero.
        StatusCode::OK
    };

    Ok((status, Json(outcome)).into_response())
}
