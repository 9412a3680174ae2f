pub mod errors;
pub mod extract;
pub mod handlers;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/greenhouses/new",
            get(handlers::new_greenhouse_form).post(handlers::create_greenhouse),
        )
        .route("/greenhouses/{id}", get(handlers::greenhouse_detail))
        .route("/greenhouses/{id}/control", post(handlers::submit_control))
        .route("/analyze", get(handlers::analyze_form).post(handlers::analyze))
        .route("/debug", get(handlers::debug_panel))
        .route("/debug/issues", post(handlers::create_issue))
        .route("/debug/issues/{id}/resolve", post(handlers::resolve_issue))
        .with_state(state)
}
