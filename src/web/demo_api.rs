//! JSON API behind the Live Demo page.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::demo::{self, DemoServices, SessionSnapshot, SharedSession};
use crate::error::{DemoError, Error, ErrorKind, MediaError};
use crate::media::UploadedFile;
use crate::web::registry::SessionRegistry;

/// Shared state for the demo routes.
#[derive(Clone)]
pub struct DemoApiState {
    pub registry: Arc<SessionRegistry>,
    pub services: Arc<DemoServices>,
}

/// Error body: `{ "error": "...", "kind": "..." }`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

/// An [`Error`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

/// Status code for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::MediaLoadError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::AiServiceError => StatusCode::BAD_GATEWAY,
        ErrorKind::ConfigurationError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            tracing::warn!(%kind, "Demo request failed: {}", self.0);
        } else {
            tracing::debug!(%kind, "Demo request rejected: {}", self.0);
        }
        let body = ApiErrorBody {
            error: self.0.user_message(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub input: String,
}

async fn snapshot(session: &SharedSession) -> Json<SessionSnapshot> {
    Json(session.lock().await.snapshot())
}

async fn create_session(State(state): State<DemoApiState>) -> impl IntoResponse {
    let session = state.registry.create().await;
    (StatusCode::CREATED, snapshot(&session).await)
}

async fn get_session(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    Ok(snapshot(&session).await)
}

async fn delete_session(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.registry.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DemoError::SessionNotFound { id }.into())
    }
}

async fn put_text(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TextRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::set_text(&session, req.text).await?;
    Ok(snapshot(&session).await)
}

async fn submit_url(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UrlRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::submit_url(&session, &state.services, &req.input).await?;
    Ok(snapshot(&session).await)
}

async fn type_url(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UrlRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::url_changed(&session, &state.services, &req.input).await?;
    Ok(snapshot(&session).await)
}

async fn upload_file(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| MediaError::LoadFailed {
        reason: format!("Malformed upload: {}", e.body_text()),
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| MediaError::LoadFailed {
            reason: format!("Failed to read upload: {}", e.body_text()),
        })?;
        file = Some(UploadedFile::new(name, content_type, data));
        break;
    }

    let file = file.ok_or_else(|| MediaError::LoadFailed {
        reason: "No file in upload".to_string(),
    })?;
    demo::upload(&session, &state.services, file).await?;
    Ok(snapshot(&session).await)
}

async fn toggle(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::toggle(&session, &state.services).await?;
    Ok(snapshot(&session).await)
}

async fn generate(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::regenerate(&session, &state.services).await?;
    Ok(snapshot(&session).await)
}

async fn speech(
    State(state): State<DemoApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.registry.get(id).await?;
    demo::toggle_speech(&session, &state.services).await?;
    Ok(snapshot(&session).await)
}

/// Serve the bytes behind a live preview handle.
async fn get_preview(State(state): State<DemoApiState>, Path(id): Path<Uuid>) -> Response {
    match state.services.previews.get(id) {
        Some((data, mime_type)) => (
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
            data,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Demo API and preview routes.
pub fn routes(state: DemoApiState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/demo/sessions", post(create_session))
        .route(
            "/api/demo/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/demo/sessions/{id}/text", put(put_text))
        .route(
            "/api/demo/sessions/{id}/url",
            post(submit_url).put(type_url),
        )
        .route(
            "/api/demo/sessions/{id}/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/demo/sessions/{id}/toggle", post(toggle))
        .route("/api/demo/sessions/{id}/generate", post(generate))
        .route("/api/demo/sessions/{id}/speech", post(speech))
        .route("/previews/{id}", get(get_preview))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AiError, ConfigError, InputError};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(Error, StatusCode)> = vec![
            (InputError::NoUrlFound.into(), StatusCode::BAD_REQUEST),
            (
                MediaError::NoValidMedia {
                    url: "https://x".to_string(),
                }
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AiError::AuthFailed {
                    provider: "gemini".to_string(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ConfigError::MissingCredential {
                    service: "Gemini".to_string(),
                    var: "GEMINI_API_KEY".to_string(),
                }
                .into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DemoError::SessionNotFound { id: Uuid::nil() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (DemoError::GenerationInProgress.into(), StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            assert_eq!(status_for(err.kind()), status, "{}", err);
        }
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError::from(InputError::EmptyContent).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
