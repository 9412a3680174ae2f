pub mod dto;
pub mod errors;
pub mod extract;
pub mod handlers;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use errors::ApiError;
use handlers::ApiDoc;

use crate::{auth::secrets_match, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects device requests that do not carry the shared key.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    match presented {
        Some(key) if secrets_match(key, &state.config.api_key) => {}
        _ => return Err(ApiError::Unauthorized),
    }
    Ok(next.run(req).await)
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/sensor-data", post(handlers::post_sensor_data))
        .route(
            "/api/greenhouse/{id}/commands",
            get(handlers::get_pending_commands),
        )
        .route(
            "/api/greenhouse/{id}/commands/{command_id}/acknowledge",
            post(handlers::acknowledge_command),
        )
        .route("/api/greenhouse/{id}/image", post(handlers::upload_image))
        .with_state(state.clone())
        .split_for_parts();

    router
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
