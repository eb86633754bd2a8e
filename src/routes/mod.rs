//! HTTP route handlers.

pub mod auth;
pub mod pages;
pub mod params;

use crate::auth::gate::AppState;
use crate::middleware::{log_response, make_request_span, security_headers};
use crate::templates::{PageData, Template};
use axum::{response::Html, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Render a page through the injected renderer.
pub(crate) fn render(state: &AppState, template: Template, data: PageData<'_>) -> Html<String> {
    Html(state.templates.render(template, data))
}

/// Build the router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/game", get(pages::game))
        .route("/favicon.ico", get(pages::favicon))
}

/// The full application: routes, security headers and request logging.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn(security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(log_response),
        )
        .with_state(state)
}
