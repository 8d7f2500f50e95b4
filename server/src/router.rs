use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use tracing::error;
use tracing::info;
use tracing::warn;
use webterm_core::CommandExecutor;
use webterm_core::Config;
use webterm_core::ExecutionRequest;
use webterm_protocol::ErrorResponse;
use webterm_protocol::ExecuteCommandRequest;
use webterm_protocol::ExecuteCommandResponse;
use webterm_protocol::TERMINAL_ROUTE;

#[derive(Clone)]
pub struct AppState {
    executor: Arc<CommandExecutor>,
}

impl AppState {
    pub fn new(executor: CommandExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CommandExecutor::new(config.projects_root.clone()).with_timeout(config.exec_timeout),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(TERMINAL_ROUTE, post(execute_command))
        .with_state(state)
}

async fn execute_command(
    State(state): State<AppState>,
    project_id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    let project_id = match project_id {
        Ok(Path(project_id)) => project_id,
        Err(err) => {
            warn!("unusable project id in request path: {err}");
            return execution_failed();
        }
    };
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!("malformed request body for project {project_id}: {err}");
            return execution_failed();
        }
    };
    let Some(command) = request.command_text() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::command_required()),
        )
            .into_response();
    };

    info!("executing command in project {project_id}: {command:?}");
    let execution = ExecutionRequest::new(command, project_id);
    let executor = Arc::clone(&state.executor);
    let task = tokio::spawn(async move { executor.execute(&execution).await });
    match task.await {
        Ok(result) => (StatusCode::OK, Json(ExecuteCommandResponse::from(result))).into_response(),
        Err(err) => {
            error!("command task failed: {err}");
            execution_failed()
        }
    }
}

/// An empty body reads as `{}`, so it fails validation rather than parsing.
fn parse_request(body: &[u8]) -> serde_json::Result<ExecuteCommandRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExecuteCommandRequest::default());
    }
    serde_json::from_slice(body)
}

fn execution_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::execution_failed()),
    )
        .into_response()
}
