//! Register, login and logout endpoints.

use super::params::FormParams;
use super::render;
use crate::auth::cookie::SESSION_COOKIE;
use crate::auth::gate::{AppState, Guest};
use crate::auth::manager::AuthError;
use crate::error::{AppError, PROTECTED_PATH};
use crate::models::{LoginForm, RegisterForm};
use crate::templates::{PageData, Template};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Redirect to the protected page with the new session cookie attached.
fn signed_in(cookie: Cookie<'static>) -> Response {
    (CookieJar::new().add(cookie), Redirect::to(PROTECTED_PATH)).into_response()
}

/// Re-render `template` with the failure message, or escalate to a 500.
fn form_failure(
    state: &AppState,
    template: Template,
    err: AuthError,
) -> Result<Response, AppError> {
    match err.user_message() {
        Some(message) => Ok(render(state, template, PageData::Message(&message)).into_response()),
        None => Err(AppError::Internal(err.to_string())),
    }
}

/// GET /register: Registration form
pub async fn register_page(_guest: Guest, State(state): State<AppState>) -> Html<String> {
    render(&state, Template::Register, PageData::Empty)
}

/// POST /register: Create an account and log it in
pub async fn register(
    _guest: Guest,
    State(state): State<AppState>,
    FormParams(form): FormParams<RegisterForm>,
) -> Result<Response, AppError> {
    match state.manager.register(&form).await {
        Ok(cookie) => Ok(signed_in(cookie)),
        Err(e) => form_failure(&state, Template::Register, e),
    }
}

/// GET /login: Login form
pub async fn login_page(_guest: Guest, State(state): State<AppState>) -> Html<String> {
    render(&state, Template::Login, PageData::Empty)
}

/// POST /login: Verify credentials and start a session
pub async fn login(
    _guest: Guest,
    State(state): State<AppState>,
    FormParams(form): FormParams<LoginForm>,
) -> Result<Response, AppError> {
    match state.manager.login(&form).await {
        Ok(cookie) => Ok(signed_in(cookie)),
        Err(e) => form_failure(&state, Template::Login, e),
    }
}

/// GET /logout: End the current session
///
/// Always clears the cookie, whether or not a session existed.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let cookie = state.manager.logout(token.as_deref()).await;
    (jar.add(cookie), Redirect::to("/"))
}
