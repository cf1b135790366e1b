//! Response helpers and the error-translation layer.

use crate::error::{ErrorKind, ErrorReport};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Propagated into `requestId` when the caller supplies one.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers of the original error response kept on the translated one.
const CARRIED_HEADERS: [HeaderName; 2] = [header::WWW_AUTHENTICATE, header::ALLOW];

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

/// JSON body of every error response. `status` and `developerMessage` are the stable contract.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: String,
    pub path: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub request_id: String,
    pub developer_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ErrorBody {
    /// Build from the [`ErrorReport`] attached by `AppError`, or from the bare
    /// status when the framework produced the response itself.
    pub fn new(
        report: Option<ErrorReport>,
        status: StatusCode,
        path: String,
        request_id: String,
        with_trace: bool,
    ) -> Self {
        let reason = |s: StatusCode| s.canonical_reason().unwrap_or("Error").to_string();
        let (status, message, developer_message, trace) = match report {
            Some(report) => (
                report.status(),
                report.message,
                report.kind.developer_message().to_string(),
                Some(report.detail),
            ),
            None => match ErrorKind::from_status(status) {
                Some(kind) => (
                    kind.status(),
                    reason(status),
                    kind.developer_message().to_string(),
                    None,
                ),
                None => (status, reason(status), reason(status), None),
            },
        };
        ErrorBody {
            timestamp: chrono::Utc::now().to_rfc3339(),
            path,
            status: status.as_u16(),
            error: reason(status),
            message,
            request_id,
            developer_message,
            trace: trace.filter(|_| with_trace),
        }
    }
}

/// True when the query string carries `trace=true`.
pub fn trace_requested(query: Option<&str>) -> bool {
    query
        .unwrap_or("")
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(k, v)| k == "trace" && v == "true")
}

/// Outermost layer: every 4xx/5xx response leaves through here as an [`ErrorBody`].
pub async fn translate_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let with_trace = state.expose_trace && trace_requested(request.uri().query());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    if let Some(report) = &report {
        if report.kind == ErrorKind::Unclassified {
            tracing::error!(
                path = %path,
                request_id = %request_id,
                detail = %report.detail,
                "request failed"
            );
        } else {
            tracing::debug!(
                path = %path,
                kind = ?report.kind,
                message = %report.message,
                "request rejected"
            );
        }
    }

    let body = ErrorBody::new(report, status, path, request_id, with_trace);
    let code = StatusCode::from_u16(body.status).unwrap_or(status);
    let mut translated = (code, Json(body)).into_response();
    for name in CARRIED_HEADERS {
        if let Some(value) = response.headers().get(&name) {
            translated.headers_mut().insert(name, value.clone());
        }
    }
    translated
}
