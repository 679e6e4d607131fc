//! HTTP surface: router, shared state, and request context.

pub mod embed;
pub mod handlers;

use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::config::DeploymentMode;
use crate::error::{ColloquiaError, SearchError, StoreError};
use crate::search::FilterPrefs;
use crate::store::Store;
use crate::viewer::Viewer;
use crate::vocab::Vocabulary;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub mode: DeploymentMode,
    pub vocab: Arc<Vocabulary>,
}

impl ApiState {
    pub fn new(store: Arc<dyn Store>, mode: DeploymentMode, vocab: Vocabulary) -> Self {
        Self {
            store,
            mode,
            vocab: Arc::new(vocab),
        }
    }
}

/// Build the application router.
pub fn router(state: ApiState) -> Router {
    // Endpoints meant for inclusion on third-party pages answer any origin.
    let open = Router::new()
        .route("/seminar/:shortname/bare", get(handlers::seminar_bare))
        .route("/embed_seminars.js", get(embed::embed_seminars))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(handlers::browse_future_talks))
        .route("/past", get(handlers::browse_past_talks))
        .route("/conferences", get(handlers::browse_conferences))
        .route("/past_conferences", get(handlers::browse_past_conferences))
        .route("/seminar_series", get(handlers::browse_seminar_series))
        .route("/search", get(handlers::search_form))
        .route("/search/talks", get(handlers::search_talks))
        .route("/search/seminars", get(handlers::search_seminars))
        .route("/search/conferences", get(handlers::search_conferences))
        .route("/institutions", get(handlers::list_institutions))
        .route("/institution/:shortname", get(handlers::institution_detail))
        .route("/seminar/:shortname", get(handlers::seminar_detail))
        .route("/seminar/:shortname/raw", get(handlers::seminar_raw))
        .route("/seminar/:shortname/json", get(handlers::seminar_json_feed))
        .route("/seminar/:shortname/ics", get(handlers::seminar_ics))
        .route("/talk/:seminar_id/:talkid", get(handlers::talk_detail))
        .route("/talk/:seminar_id/:talkid/ics", get(handlers::talk_ics))
        .route(
            "/embeddable_schedule.js",
            get(embed::embeddable_schedule),
        )
        .merge(open)
        // Subject shortcuts go last so literal routes take priority.
        .route("/:subject", get(handlers::browse_subject))
        .route("/:subject/:topic", get(handlers::browse_subject_topic))
        .with_state(state)
}

/// Handler-level error wrapper, mapped onto HTTP status codes.
///
/// Lookup misses ([`StoreError`]) and unknown vocabulary codes
/// ([`SearchError`]) answer 404 with the error's message; anything else is
/// an internal error and only logged.
#[derive(Debug)]
pub struct ApiError(ColloquiaError);

impl From<ColloquiaError> for ApiError {
    fn from(err: ColloquiaError) -> Self {
        ApiError(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err.into())
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ColloquiaError::Store(err) => (StatusCode::NOT_FOUND, err.to_string()),
            ColloquiaError::Search(err) => (StatusCode::NOT_FOUND, err.to_string()),
            err => {
                tracing::error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Per-request viewer and filter preferences, reconstructed from cookies.
pub fn request_context(headers: &HeaderMap) -> (Viewer, FilterPrefs) {
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mut viewer = Viewer::anonymous();
    if let Some(tz) = cookie_value(cookies, "timezone") {
        if let Ok(tz) = tz.parse() {
            viewer.timezone = tz;
        }
    }
    (viewer, FilterPrefs::from_cookie_header(cookies))
}

fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == name).then(|| v.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_timezone_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("timezone=America/New_York; filter_topic=1"),
        );
        let (viewer, prefs) = request_context(&headers);
        assert_eq!(viewer.timezone.name(), "America/New_York");
        assert!(prefs.filter_topic);
    }

    #[test]
    fn test_bad_timezone_falls_back_to_utc() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("timezone=Mars/Olympus"),
        );
        let (viewer, _) = request_context(&headers);
        assert_eq!(viewer.timezone, chrono_tz::UTC);
    }
}
