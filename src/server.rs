//! HTTP query and ingestion server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/records` | Ingest the first line of the body as one record |
//! | `GET`  | `/records/{sort}` | List records sorted by `email`, `birthdate`, or `name` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `POST /records` picks the delimiter from the `Content-Type` subtype:
//! `text/csv`, `text/psv`, or `text/ssv`. Unlike file ingestion, an invalid
//! line fails the whole request.
//!
//! The sort tokens here are not the shell's `list` profiles; see
//! [`crate::sort`].
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "unsupported_content_type", "message": "..." } }
//! ```
//!
//! Every validation failure is a `400`; the code names the failure kind
//! (see [`RosterError::code`]). Unexpected failures are `500` with code
//! `internal`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::error::RosterError;
use crate::format::DelimiterTable;
use crate::models::Record;
use crate::parse::ingest_body;
use crate::sort::{sort_records, QueryProfile};
use crate::store::Store;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn Store>,
    table: Arc<DelimiterTable>,
}

/// Builds the router with all routes and the CORS layer.
///
/// Exposed separately from [`run_server`] so the routes can be exercised
/// in-process.
pub fn router(store: Arc<dyn Store>, table: Arc<DelimiterTable>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/records", post(handle_create))
        .route("/records/{sort}", get(handle_list))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { store, table })
}

/// Binds to `bind_addr` and serves until the process is terminated.
pub async fn run_server(
    bind_addr: &str,
    store: Arc<dyn Store>,
    table: Arc<DelimiterTable>,
) -> anyhow::Result<()> {
    let app = router(store, table);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        debug!(code = %self.code, message = %self.message, "request failed");
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /records ============

/// Single-record ingestion. Responds `201` with the stored record.
async fn handle_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let content_type = match headers.get(header::CONTENT_TYPE) {
        Some(value) => Some(value.to_str().map_err(|_| {
            let raw = String::from_utf8_lossy(value.as_bytes()).into_owned();
            RosterError::MalformedContentType(raw)
        })?),
        None => None,
    };

    let record = ingest_body(content_type, &body, &state.table)?;
    state.store.put(record.email(), record.clone());
    info!(email = record.email(), "record created");

    Ok((StatusCode::CREATED, Json(record)))
}

// ============ GET /records/{sort} ============

async fn handle_list(
    State(state): State<AppState>,
    Path(sort): Path<String>,
) -> Result<Json<Vec<Record>>, AppError> {
    let profile: QueryProfile = sort.parse()?;
    Ok(Json(sort_records(state.store.all_values(), profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app_with(store: Arc<InMemoryStore>) -> Router {
        router(store, Arc::new(DelimiterTable::with_builtins()))
    }

    fn canned_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_all(vec![
            Record::new("George", "Fred", "kool.dude@example.net", "blue", "08/12/1901").unwrap(),
            Record::new("Zimmer", "Joey", "joey.zimmer@example.net", "purple", "07/01/1944")
                .unwrap(),
            Record::new("Lars", "Owen", "owen.lars@example.net", "yellow", "08/12/2950").unwrap(),
        ]);
        store
    }

    fn post(content_type: Option<&str>, body: &str) -> Request<Body> {
        post_bytes(content_type, body.as_bytes())
    }

    fn post_bytes(content_type: Option<&str>, body: &[u8]) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/records");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body.to_vec())).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_each_format() {
        let bodies = [
            ("text/csv", "George, Fred, fred.george@example.net, blue, 08/12/1901"),
            ("text/psv", "George | Fred | fred.george@example.net | blue | 08/12/1901"),
            ("text/ssv", "George Fred fred.george@example.net blue 08/12/1901"),
        ];
        for (content_type, body) in bodies {
            let store = Arc::new(InMemoryStore::new());
            let response = app_with(store.clone())
                .oneshot(post(Some(content_type), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED, "{}", content_type);

            let json = json_body(response).await;
            assert_eq!(json["email"], "fred.george@example.net");
            assert_eq!(json["dateOfBirth"], "08/12/1901");

            let stored = store.all_values();
            assert_eq!(stored.len(), 1);
            assert_eq!(
                stored[0],
                Record::new("George", "Fred", "fred.george@example.net", "blue", "08/12/1901")
                    .unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let cases = [
            (None, "Smith,Bob,bob@x.net,red,01/23/1972", "missing_content_type"),
            (Some("csv"), "Smith,Bob,bob@x.net,red,01/23/1972", "malformed_content_type"),
            (
                Some("application/json"),
                "Smith,Bob,bob@x.net,red,01/23/1972",
                "unsupported_content_type",
            ),
            (Some("text/plain"), "Smith,Bob,bob@x.net,red,01/23/1972", "unsupported_format"),
            (Some("text/csv"), "BadLine", "malformed_record"),
            (Some("text/csv"), "Smith,Bob,bob@x.net,red,1972-01-23", "malformed_record"),
        ];
        for (content_type, body, code) in cases {
            let store = Arc::new(InMemoryStore::new());
            let response = app_with(store.clone())
                .oneshot(post(content_type, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", code);
            let json = json_body(response).await;
            assert_eq!(json["error"]["code"], code);
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn test_create_undecodable_body_uses_error_envelope() {
        let store = Arc::new(InMemoryStore::new());
        let response = app_with(store.clone())
            .oneshot(post_bytes(
                Some("text/csv"),
                b"M\xfcller,Hans,hans@x.net,blue,05/05/1960",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "malformed_record");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let expected = [
            ("email", ["Zimmer", "George", "Lars"]),
            ("birthdate", ["George", "Zimmer", "Lars"]),
            ("name", ["George", "Lars", "Zimmer"]),
        ];
        for (sort, names) in expected {
            let response = app_with(canned_store())
                .oneshot(get_req(&format!("/records/{}", sort)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = json_body(response).await;
            let got: Vec<&str> = json
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["lastName"].as_str().unwrap())
                .collect();
            assert_eq!(got, names, "sort {}", sort);
        }
    }

    #[tokio::test]
    async fn test_list_rejects_shell_profile_tokens() {
        let response = app_with(canned_store())
            .oneshot(get_req("/records/output2-birthdate-asc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "invalid_sort_profile");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("email, birthdate, name"));
    }

    #[tokio::test]
    async fn test_create_then_list_overwrites_by_email() {
        let store = Arc::new(InMemoryStore::new());
        let app = app_with(store.clone());
        app.clone()
            .oneshot(post(Some("text/csv"), "Smith,Bob,bob@x.net,red,01/23/1972"))
            .await
            .unwrap();
        app.clone()
            .oneshot(post(Some("text/csv"), "Smith,Robert,bob@x.net,blue,01/23/1972"))
            .await
            .unwrap();

        let response = app.oneshot(get_req("/records/email")).await.unwrap();
        let json = json_body(response).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["firstName"], "Robert");
        assert_eq!(records[0]["favoriteColor"], "blue");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app_with(Arc::new(InMemoryStore::new()))
            .oneshot(get_req("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
    }
}
