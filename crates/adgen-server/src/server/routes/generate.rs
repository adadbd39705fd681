use std::sync::Arc;

use adgen::Payload;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use crate::server::data_models::SubmitResponse;
use crate::server::state::ServerState;
use crate::server::ServerError;

/// Accept an image and a style, queue the job and return its id right away.
pub async fn generate_ad(
    State(server_state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), ServerError> {
    let mut style: Option<String> = None;
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("style") => style = Some(field.text().await?),
            Some("image") => {
                let content_type = field.content_type().unwrap_or_default().to_owned();
                image = Some((content_type, field.bytes().await?));
            }
            _ => tracing::trace!("Ignoring form field {:?}", name),
        }
    }

    let style = style.ok_or(ServerError::MissingField("style"))?;
    let (content_type, data) = image.ok_or(ServerError::MissingField("image"))?;

    let task_id = server_state
        .jobs
        .submit(Payload::new(data, content_type, style))
        .await?;

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { task_id })))
}
