use std::sync::Arc;

use adgen::{Outcome, TaskId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::server::state::ServerState;
use crate::server::ServerError;

/// Report a task's outcome, consuming it. Ids that do not parse are treated
/// like any other unknown id.
pub async fn get_task_result(
    State(server_state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<Response, ServerError> {
    let outcome = match task_id.parse::<TaskId>() {
        Ok(id) => server_state.jobs.poll(&id),
        Err(_) => Outcome::Processing,
    };

    match outcome {
        // Serializes as `{"status": "processing"}`.
        Outcome::Processing => {
            Ok((StatusCode::ACCEPTED, Json(Outcome::Processing)).into_response())
        }
        Outcome::Completed { data } => Ok((StatusCode::OK, Json(data)).into_response()),
        Outcome::Failed { error } => Err(ServerError::TaskFailed(error)),
    }
}
