//! Session handlers: upload, crop, detect.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use croploc_image::{crop_selection, decode_upload, is_supported_declared_type, to_submission_jpeg};
use croploc_models::{AspectConstraint, CropSelection, SessionEvent, SessionPhase};

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_detection, record_upload};
use crate::render::{render, RenderedReport};
use crate::session::Session;
use crate::state::AppState;

/// Decoded image summary.
#[derive(Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub format: String,
}

/// Session snapshot returned by every session endpoint.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub phase: SessionPhase,
    pub detection_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<CropSelection>,
    pub aspect: AspectConstraint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RenderedReport>,
}

fn session_response(id: Uuid, session: &Session, detection_enabled: bool) -> SessionResponse {
    SessionResponse {
        id,
        phase: session.phase,
        detection_enabled,
        image: session.image.as_ref().map(|upload| ImageInfo {
            width: upload.width(),
            height: upload.height(),
            has_alpha: upload.has_alpha(),
            format: format!("{:?}", upload.format),
        }),
        selection: session.selection,
        aspect: session.aspect,
        report: session.report.clone(),
    }
}

/// Create a new session.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<Json<SessionResponse>> {
    let id = state.sessions.create().await;
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::internal("session vanished after create"))?;
    let session = handle.lock().await;

    info!(session_id = %id, "Created session");
    Ok(Json(session_response(id, &session, state.detection_enabled())))
}

/// Get a session snapshot.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let handle = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("session {}", session_id)))?;
    let session = handle.lock().await;

    Ok(Json(session_response(
        session_id,
        &session,
        state.detection_enabled(),
    )))
}

/// Discard a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.sessions.remove(&session_id).await {
        return Err(ApiError::not_found(format!("session {}", session_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Upload an image into a session.
///
/// The declared content type must be one of the accepted upload types
/// (jpg/jpeg/png); the actual bytes are then sniffed and decoded. A new
/// upload replaces any previous bitmap, installs a full-frame default
/// selection, and discards the previous report.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<SessionResponse>> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !is_supported_declared_type(declared) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "declared type '{}' is not one of jpg, jpeg, png",
            declared
        )));
    }

    let upload = match decode_upload(&body) {
        Ok(upload) => upload,
        Err(e) => {
            record_upload("rejected");
            return Err(e.into());
        }
    };

    let handle = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("session {}", session_id)))?;
    let mut session = handle.lock().await;

    let (width, height) = (upload.width(), upload.height());
    session.phase = session.phase.transition(SessionEvent::UploadReceived)?;
    session.selection = Some(CropSelection::full_frame(width, height));
    session.image = Some(upload);
    session.report = None;
    session.touch();

    record_upload("ok");
    info!(session_id = %session_id, width, height, "Image uploaded");

    Ok(Json(session_response(
        session_id,
        &session,
        state.detection_enabled(),
    )))
}

/// Crop update request.
#[derive(Deserialize)]
pub struct SetCropRequest {
    /// The selected rectangle, in source-image pixels.
    pub selection: CropSelection,
    /// Aspect constraint option as the UI names it: "Free", "1:1", "16:9", "4:3".
    /// Omitted means keep the session's current constraint.
    #[serde(default)]
    pub aspect: Option<String>,
}

/// Update the crop selection (live, on every drag).
pub async fn set_crop(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SetCropRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let handle = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("session {}", session_id)))?;
    let mut session = handle.lock().await;

    let (frame_width, frame_height) = match session.image.as_ref() {
        Some(upload) => (upload.width(), upload.height()),
        None => return Err(ApiError::conflict("no image uploaded yet")),
    };

    let aspect = match &request.aspect {
        Some(raw) => raw
            .parse::<AspectConstraint>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => session.aspect,
    };

    let selection = request.selection;
    if !selection.fits_within(frame_width, frame_height) {
        return Err(ApiError::bad_request(format!(
            "selection {}x{}+{}+{} does not fit within the {}x{} image",
            selection.width, selection.height, selection.x, selection.y, frame_width, frame_height
        )));
    }
    if !selection.conforms_to(&aspect) {
        return Err(ApiError::bad_request(format!(
            "selection {}x{} does not match the {} aspect ratio",
            selection.width, selection.height, aspect
        )));
    }

    session.phase = session.phase.transition(SessionEvent::CropChanged)?;
    session.selection = Some(selection);
    session.aspect = aspect;
    session.report = None;
    session.touch();

    Ok(Json(session_response(
        session_id,
        &session,
        state.detection_enabled(),
    )))
}

/// Run the detection pipeline on the current crop.
///
/// Normalizes the crop (alpha flattened onto white, JPEG-encoded), submits
/// it to the object-localization service, and stores the rendered report.
/// Requires a credential-backed client; when startup credential loading
/// failed this returns the disabled warning without touching the session.
pub async fn detect(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let vision = match &state.vision {
        Some(client) => client.clone(),
        None => return Err(ApiError::DetectionDisabled),
    };

    let handle = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("session {}", session_id)))?;
    let mut session = handle.lock().await;

    // Crop and normalize. Both are pure; the session's bitmap is untouched.
    let prepared = match (session.image.as_ref(), session.selection) {
        (Some(upload), Some(selection)) => {
            crop_selection(&upload.image, selection).and_then(|crop| to_submission_jpeg(&crop))
        }
        _ => return Err(ApiError::conflict("no image or crop selection in session")),
    };

    session.phase = session.phase.transition(SessionEvent::DetectPressed)?;

    let jpeg = match prepared {
        Ok(jpeg) => jpeg,
        Err(e) => {
            session.phase = session.phase.transition(SessionEvent::DetectionFailed)?;
            session.report = Some(RenderedReport::failure(e.to_string()));
            session.touch();
            record_detection("pipeline_error");
            return Err(e.into());
        }
    };

    info!(session_id = %session_id, bytes = jpeg.len(), "Running object localization on cropped image");

    match vision.localize_objects(&jpeg).await {
        Ok(result) => {
            let event = if result.is_error() {
                SessionEvent::DetectionFailed
            } else {
                SessionEvent::ResponseReceived
            };
            record_detection(if result.is_error() { "remote_error" } else { "ok" });

            session.phase = session.phase.transition(event)?;
            session.report = Some(render(&result));
            session.touch();

            Ok(Json(session_response(
                session_id,
                &session,
                state.detection_enabled(),
            )))
        }
        Err(e) => {
            session.phase = session.phase.transition(SessionEvent::DetectionFailed)?;
            session.report = Some(RenderedReport::failure(e.to_string()));
            session.touch();
            record_detection("transport_error");
            Err(e.into())
        }
    }
}
