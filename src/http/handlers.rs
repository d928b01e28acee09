use super::state::AppState;
use crate::error::{CaptureError, SessionError};
use crate::session::{
    mime_type_for_path, ArtifactSource, InMemoryPreviewRegistry, InterviewSessionController, MediaPayload,
    ResponseArtifact, SessionSnapshot, SetupMetadata,
};
use crate::submission::InterviewReport;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub company: String,
    pub position: String,
    pub experience: String,

    /// Number of questions to generate (clamped to 1..=8, default 5)
    pub question_count: Option<usize>,

    /// Owner of persisted results (generated if not provided)
    pub user_id: Option<String>,

    /// Use these questions instead of generating them
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigateRequest {
    Next,
    Previous,
    Jump { index: usize },
}

#[derive(Debug, Default, Deserialize)]
pub struct ExitParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler failure rendered as an [`ErrorResponse`]
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Upstream(String),
    Internal(String),
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl From<CaptureError> for ApiError {
    fn from(e: CaptureError) -> Self {
        Self::Session(e.into())
    }
}

fn session_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::InvalidSetup(_) => StatusCode::BAD_REQUEST,
        SessionError::Navigation(_) => StatusCode::FORBIDDEN,
        SessionError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
        SessionError::Capture(CaptureError::PermissionDenied) => StatusCode::FORBIDDEN,
        SessionError::Capture(CaptureError::Unsupported(_) | CaptureError::NoDataCaptured) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SessionError::Capture(CaptureError::Device(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::Capture(CaptureError::AlreadyReleased)
        | SessionError::NoActiveSession
        | SessionError::Incomplete { .. }
        | SessionError::CaptureInProgress
        | SessionError::NoActiveCapture
        | SessionError::SubmissionInProgress
        | SessionError::Stale { .. } => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::Session(e) => (session_status(&e), e.to_string()),
        };

        if status.is_server_error() {
            error!("{}", message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

type Controller = Arc<Mutex<InterviewSessionController>>;

async fn find_session(state: &AppState, session_id: &str) -> Result<Controller, ApiError> {
    state
        .sessions
        .read()
        .await
        .get(session_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Interview {} not found", session_id)))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews
/// Generate questions (unless supplied) and start an interview
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut setup = SetupMetadata {
        company: req.company,
        position: req.position,
        experience: req.experience,
        ..SetupMetadata::default()
    };
    if let Some(count) = req.question_count {
        setup.question_count = count;
    }
    if let Some(user_id) = req.user_id {
        setup = setup.with_user_id(user_id);
    }
    let setup = setup.validated()?;

    let questions = match req.questions {
        Some(questions) => questions,
        None => state
            .services
            .questions
            .generate_questions(&setup)
            .await
            .map_err(|e| {
                warn!("Question generation failed: {:#}", e);
                ApiError::Upstream(format!("Failed to generate questions: {}", e))
            })?,
    };

    let mut controller = state.services.controller();
    let session_id = controller.start(questions, setup)?;
    let snapshot = controller.snapshot();

    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), Arc::new(Mutex::new(controller)));

    info!("Interview {} ready", session_id);

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /interviews/:session_id
pub async fn get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let snapshot = controller.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// PUT /interviews/:session_id/response
/// Body is the raw video; Content-Type is its MIME type
pub async fn upload_response(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            params
                .file_name
                .as_deref()
                .map(|name| mime_type_for_path(std::path::Path::new(name)))
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let controller = find_session(&state, &session_id).await?;
    let mut controller = controller.lock().await;

    let artifact = ResponseArtifact::new(
        MediaPayload::new(body, mime_type),
        ArtifactSource::Uploaded {
            file_name: params.file_name,
        },
        controller.registry(),
    )?;
    let index = controller.answer_current(artifact)?;
    info!("Interview {}: answer uploaded for question {}", session_id, index);

    Ok(Json(controller.snapshot()))
}

/// DELETE /interviews/:session_id/response
pub async fn reset_response(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let mut controller = controller.lock().await;
    controller.reset_current()?;
    Ok(Json(controller.snapshot()))
}

/// POST /interviews/:session_id/navigate
pub async fn navigate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let mut controller = controller.lock().await;

    match req {
        NavigateRequest::Next => {
            controller.advance()?;
        }
        NavigateRequest::Previous => {
            controller.retreat()?;
        }
        NavigateRequest::Jump { index } => controller.jump_to(index)?,
    }

    Ok(Json(controller.snapshot()))
}

/// POST /interviews/:session_id/recording/start
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let mut controller = controller.lock().await;
    controller.start_recording().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /interviews/:session_id/recording/stop
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let mut controller = controller.lock().await;
    controller.stop_recording().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /interviews/:session_id/complete
/// Submit every answer; the session stays locked against edits meanwhile
///
/// The upload runs on its own task so a dropped connection cannot leave the
/// session stuck in `Submitting`. A completed interview is forgotten.
pub async fn complete_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<InterviewReport>, ApiError> {
    let controller = find_session(&state, &session_id).await?;

    let pending = controller.lock().await.begin_completion()?;
    let epoch = pending.epoch;

    let task = {
        let state = state.clone();
        let controller = Arc::clone(&controller);
        let session_id = session_id.clone();

        tokio::spawn(async move {
            let report = state.services.coordinator.submit(pending.request).await;
            let report = controller.lock().await.finish_completion(pending.epoch, report)?;

            state.sessions.write().await.remove(&session_id);
            info!(
                "Interview {} completed: score {} ({})",
                session_id, report.score, report.category
            );

            Ok::<_, SessionError>(report)
        })
    };
    controller.lock().await.track_submission(epoch, task.abort_handle());

    match task.await {
        Ok(result) => Ok(Json(result?)),
        Err(e) if e.is_cancelled() => {
            warn!("Submission for interview {} was aborted", session_id);
            Err(SessionError::Stale { epoch }.into())
        }
        Err(e) => Err(ApiError::Internal(format!("Submission task failed: {}", e))),
    }
}

/// DELETE /interviews/:session_id?confirm=true
pub async fn exit_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<ExitParams>,
) -> Result<StatusCode, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    controller.lock().await.exit(params.confirm)?;

    state.sessions.write().await.remove(&session_id);
    info!("Interview {} exited", session_id);

    Ok(StatusCode::NO_CONTENT)
}

/// GET /previews/:preview_id
pub async fn get_preview(
    State(state): State<AppState>,
    Path(preview_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}{}", InMemoryPreviewRegistry::SCHEME, preview_id);
    let payload = state
        .services
        .registry()
        .resolve(&url)
        .ok_or_else(|| ApiError::NotFound(format!("Preview {} not found", preview_id)))?;

    Ok(([(header::CONTENT_TYPE, payload.mime_type)], payload.bytes))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
