//! Parameter extraction for the form endpoints.
//!
//! Forms may arrive as a query string, an urlencoded body, or both. Body
//! pairs are appended after the query pairs and the last occurrence of a key
//! wins, so a field sent in both places takes the body value.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
};
use serde::de::DeserializeOwned;

pub struct FormParams<T>(pub T);

impl<S, T> FromRequest<S> for FormParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().unwrap_or_default().to_string();
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Unreadable request body"))?;

        let mut pairs = parse_pairs(&query)?;
        if is_form && !body.is_empty() {
            let body = std::str::from_utf8(&body)
                .map_err(|_| (StatusCode::BAD_REQUEST, "Form body is not UTF-8"))?;
            pairs.extend(parse_pairs(body)?);
        }

        let encoded = serde_urlencoded::to_string(last_wins(pairs))
            .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed form parameters"))?;
        let value = serde_urlencoded::from_str(&encoded)
            .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed form parameters"))?;
        Ok(FormParams(value))
    }
}

fn parse_pairs(encoded: &str) -> Result<Vec<(String, String)>, (StatusCode, &'static str)> {
    serde_urlencoded::from_str(encoded)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed form parameters"))
}

/// Collapse repeated keys, keeping the last value in first-seen position.
fn last_wins(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}
