use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::WebError;
use crate::{
    auth::{SessionUser, SESSION_COOKIE},
    cookies,
    state::AppState,
};

fn session_from(parts: &Parts, state: &AppState) -> Option<SessionUser> {
    cookies::get(&parts.headers, SESSION_COOKIE).and_then(|c| state.sessions.decode(&c))
}

/// A logged-in user; anonymous requests are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_from(parts, state)
            .map(CurrentUser)
            .ok_or(WebError::Unauthenticated)
    }
}

/// The session user if there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_from(parts, state)))
    }
}
