//! Session authentication: password digests, session tokens and cookies,
//! the session manager, and the request gate extractors.

pub mod cookie;
pub mod gate;
pub mod manager;
pub mod password;
pub mod session;

pub use gate::{AppState, AuthSession, Guest};
pub use manager::{AuthError, SessionManager};
pub use session::generate_session_token;
