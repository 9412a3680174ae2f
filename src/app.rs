use axum::{extract::DefaultBodyLimit, middleware, Router};

use crate::{api, i18n, state::AppState, web};

/// Largest request body accepted; covers multipart and base64 image uploads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Web UI and device API on one router.
pub fn router(state: AppState) -> Router {
    web::router(state.clone())
        .merge(api::router(state))
        .layer(middleware::from_fn(i18n::remember_locale))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
