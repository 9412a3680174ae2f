use axum::{extract::State, http::StatusCode, Json};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use super::{
    dto::{
        AcknowledgeResponse, ControlCommandDto, ImageAnalysisResponse, ImageUploadRequest,
        SensorReadingDto,
    },
    errors::ApiError,
    extract::{ApiJson, ApiPath},
};
use crate::{
    analysis::{decode_base64_image, ImageUpload},
    i18n::Locale,
    state::AppState,
    store::NewReading,
};

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Store one sensor reading pushed by a greenhouse device.
#[utoipa::path(
    post,
    path = "/api/sensor-data",
    request_body = NewReading,
    responses(
        (status = 201, description = "Reading stored", body = SensorReadingDto),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown greenhouse"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "telemetry"
)]
pub async fn post_sensor_data(
    State(state): State<AppState>,
    ApiJson(reading): ApiJson<NewReading>,
) -> Result<(StatusCode, Json<SensorReadingDto>), ApiError> {
    let stored = state.telemetry.ingest(&reading).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Pending commands for a greenhouse, oldest first.
#[utoipa::path(
    get,
    path = "/api/greenhouse/{id}/commands",
    params(
        ("id" = Uuid, Path, description = "Greenhouse ID"),
    ),
    responses(
        (status = 200, description = "Unexecuted commands in FIFO order", body = Vec<ControlCommandDto>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "commands"
)]
pub async fn get_pending_commands(
    State(state): State<AppState>,
    ApiPath(greenhouse_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ControlCommandDto>>, ApiError> {
    let pending = state.commands.list_pending(greenhouse_id).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// Mark a command executed. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/api/greenhouse/{id}/commands/{command_id}/acknowledge",
    params(
        ("id"         = Uuid, Path, description = "Greenhouse ID"),
        ("command_id" = Uuid, Path, description = "Command ID"),
    ),
    responses(
        (status = 200, description = "Command is executed", body = AcknowledgeResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "No such command in this greenhouse"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "commands"
)]
pub async fn acknowledge_command(
    State(state): State<AppState>,
    ApiPath((greenhouse_id, command_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<AcknowledgeResponse>, ApiError> {
    let command = state.commands.acknowledge(greenhouse_id, command_id).await?;
    Ok(Json(AcknowledgeResponse {
        status: "ok".into(),
        command: command.into(),
    }))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Upload a base64 image and receive the (canned) analysis text.
#[utoipa::path(
    post,
    path = "/api/greenhouse/{id}/image",
    params(
        ("id" = Uuid, Path, description = "Greenhouse ID"),
    ),
    request_body = ImageUploadRequest,
    responses(
        (status = 200, description = "Image stored and analysed", body = ImageAnalysisResponse),
        (status = 400, description = "Empty or undecodable image"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown greenhouse"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "images"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    ApiPath(greenhouse_id): ApiPath<Uuid>,
    request_locale: Locale,
    ApiJson(body): ApiJson<ImageUploadRequest>,
) -> Result<Json<ImageAnalysisResponse>, ApiError> {
    state
        .store
        .find_greenhouse(greenhouse_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("greenhouse {greenhouse_id} not found")))?;

    let locale = body
        .language
        .as_deref()
        .and_then(|l| l.parse::<Locale>().ok())
        .unwrap_or(request_locale);

    let image = ImageUpload {
        file_name: body.file_name,
        bytes: decode_base64_image(&body.image)?,
    };
    let path = state.images.save(Some(greenhouse_id), &image).await?;
    let analysis = state.analyzer.analyze(&image, locale)?;

    info!(greenhouse_id = %greenhouse_id, bytes = image.bytes.len(), locale = %locale, "Image analysed");

    let stored_as = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();
    Ok(Json(ImageAnalysisResponse {
        analysis,
        language: locale.code().to_owned(),
        stored_as,
    }))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        post_sensor_data,
        get_pending_commands,
        acknowledge_command,
        upload_image,
        health
    ),
    components(schemas(
        NewReading,
        SensorReadingDto,
        ControlCommandDto,
        AcknowledgeResponse,
        ImageUploadRequest,
        ImageAnalysisResponse
    )),
    tags(
        (name = "telemetry", description = "Sensor data ingestion"),
        (name = "commands",  description = "Device command polling and acknowledgement"),
        (name = "images",    description = "Image upload and analysis"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Greenhouse Device API",
        version = "0.1.0",
        description = "REST API for greenhouse devices. Every `/api` route requires the `X-API-Key` header."
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
