//! Page endpoints that only read the session state.

use super::render;
use crate::auth::gate::{AppState, AuthSession};
use crate::templates::{PageData, Template};
use axum::{extract::State, http::StatusCode, response::Html};

/// GET /: Home page, with a variant for logged-in visitors
pub async fn index(session: Option<AuthSession>, State(state): State<AppState>) -> Html<String> {
    let authenticated = session.is_some();
    render(&state, Template::Index, PageData::Session { authenticated })
}

/// GET /game: Protected page
pub async fn game(session: AuthSession, State(state): State<AppState>) -> Html<String> {
    tracing::debug!(username = %session.username, "Rendering game");
    render(&state, Template::Game, PageData::Empty)
}

/// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}
