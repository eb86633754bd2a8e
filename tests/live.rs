//! Full HTTP flows against real Postgres and Redis.
//!
//! These tests wipe the `users` table when they finish, so they only run when
//! `PANURGE_LIVE_TESTS=1` is set alongside `DATABASE_URL` and `REDIS_URL`
//! pointing at disposable instances. Otherwise each test returns early.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use panurge::{
    auth::AppState,
    config::Config,
    routes,
    storage::{session::RedisSessionCache, user::PgCredentialStore},
    templates::HtmlTemplates,
};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;

// Each test wipes the users table on teardown, so they take turns.
static LIVE_LOCK: Mutex<()> = Mutex::const_new(());

struct LiveApp {
    _guard: MutexGuard<'static, ()>,
    router: Router,
    credentials: PgCredentialStore,
}

async fn live_app() -> Option<LiveApp> {
    if std::env::var("PANURGE_LIVE_TESTS").ok().as_deref() != Some("1") {
        eprintln!("Skipping test: PANURGE_LIVE_TESTS not set");
        return None;
    }
    let guard = LIVE_LOCK.lock().await;
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let redis_url = std::env::var("REDIS_URL").ok()?;

    let credentials = match PgCredentialStore::connect(&database_url, 2).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Skipping test: Postgres not available: {}", e);
            return None;
        }
    };
    credentials.ensure_schema().await.ok()?;

    let client = redis::Client::open(redis_url.as_str()).ok()?;
    if let Err(e) = client.get_multiplexed_async_connection().await {
        eprintln!("Skipping test: Redis not available: {}", e);
        return None;
    }

    let config = Config {
        database_url,
        database_max_connections: 2,
        redis_url,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_ttl_secs: 60,
        persistent_session_ttl_secs: 600,
        session_cookie_secure: false,
    };
    let state = AppState::new(
        Arc::new(credentials.clone()),
        Arc::new(RedisSessionCache::new(client)),
        Arc::new(HtmlTemplates),
        Arc::new(config),
    );

    Some(LiveApp {
        _guard: guard,
        router: routes::app(state),
        credentials,
    })
}

impl LiveApp {
    async fn send(&self, method: &str, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session={}", token));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn teardown(self) {
        self.credentials.delete_all_users().await.unwrap();
    }
}

fn session_token(response: &Response) -> String {
    let header = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    let pair = header.split(';').next().unwrap();
    pair.trim_start_matches("session=").to_string()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_live_register_login_logout() {
    let Some(app) = live_app().await else {
        return;
    };

    let response = app
        .send(
            "POST",
            "/register?username=livealice&password=Abc123!?&email=livealice@example.com",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let token = session_token(&response);

    let response = app.send("GET", "/game", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Both uniqueness constraints surface as inline messages
    let response = app
        .send(
            "POST",
            "/register?username=livealice&password=Abc123!?&email=other@example.com",
            None,
        )
        .await;
    assert!(body_string(response).await.contains("livealice is taken"));

    let response = app
        .send(
            "POST",
            "/register?username=livebob&password=Abc123!?&email=livealice@example.com",
            None,
        )
        .await;
    assert!(body_string(response)
        .await
        .contains("livealice@example.com is already in use"));

    let response = app.send("GET", "/logout", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.send("GET", "/game", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .send("POST", "/login?username=livealice&password=wrong", None)
        .await;
    assert!(body_string(response).await.contains("Incorrect Password."));

    let response = app
        .send(
            "POST",
            "/login?username=livealice&password=Abc123!?&persist=true",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let token = session_token(&response);
    let response = app.send("GET", "/", Some(&token)).await;
    assert!(body_string(response).await.contains("href=\"/logout\""));

    app.teardown().await;
}

#[tokio::test]
async fn test_live_concurrent_registrations() {
    let Some(app) = live_app().await else {
        return;
    };

    let uri = "/register?username=liveracer&password=Abc123!?&email=liveracer@example.com";
    let (first, second) = tokio::join!(
        app.send("POST", uri, None),
        app.send("POST", uri, None)
    );

    // Exactly one registration wins and gets a session
    let winners = [&first, &second]
        .iter()
        .filter(|r| r.status() == StatusCode::SEE_OTHER)
        .count();
    assert_eq!(winners, 1);

    app.teardown().await;
}
