use std::sync::Arc;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{
    CONTENT_SECURITY_POLICY, COOKIE, HOST, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, info, info_span, warn, Instrument};

use super::error::{AppError, ErrorMarker};
use super::state::AppState;
use super::{DIAGNOSTIC_PATH, WEBHOOK_PATH};
use crate::favorites::api::{CSRF_COOKIE, CSRF_HEADER, VIEWER_HEADER};

/// Longest API log line, response body included
pub const AUDIT_LINE_LIMIT: usize = 80;

/// Statuses axum's extractors reject with, carrying a plain-text message
const REJECTION_STATUSES: &[StatusCode] = &[
    StatusCode::BAD_REQUEST,
    StatusCode::UNSUPPORTED_MEDIA_TYPE,
    StatusCode::UNPROCESSABLE_ENTITY,
];
const REJECTION_BODY_LIMIT: usize = 4096;

const CONTENT_SECURITY: &str = "default-src 'self'; \
    img-src 'self' data: https:; \
    script-src 'self' https://maps.googleapis.com; \
    style-src 'self' 'unsafe-inline'; \
    connect-src 'self' https:; \
    frame-ancestors 'self'";

/// Send plain-HTTP requests on the managed host to HTTPS.
pub async fn redirect_to_https(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if state.config.managed_host {
        let headers = request.headers();
        let plain = headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));
        let host = headers.get(HOST).and_then(|value| value.to_str().ok());

        if let (true, Some(host)) = (plain, host) {
            let path = request
                .uri()
                .path_and_query()
                .map_or("/", |path| path.as_str());
            let target = format!("https://{host}{path}");
            debug!("Redirecting to {target}");
            return Redirect::permanent(&target).into_response();
        }
    }
    next.run(request).await
}

/// One span per request, with status and latency logged at the end.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let span = info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        debug!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request finished",
        );
    });
    response
}

/// Log every `/api` call with its viewer, status and a truncated response body.
pub async fn audit_api(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !path.starts_with("/api") {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let viewer = request
        .headers()
        .get(VIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!("Failed to buffer response of {method} {path}: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut line = format!(
        "{method} {path} {} in {}ms",
        parts.status.as_u16(),
        started.elapsed().as_millis(),
    );
    if !bytes.is_empty() {
        line.push_str(" :: ");
        line.push_str(&String::from_utf8_lossy(&bytes));
    }
    info!(viewer = %viewer, "{}", truncate(&line, AUDIT_LINE_LIMIT));

    Response::from_parts(parts, Body::from(bytes))
}

pub async fn security_headers(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CONTENT_SECURITY));
    if state.config.is_production() {
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    response
}

/// Double-submit check: mutating requests must echo the CSRF cookie in a header.
pub async fn csrf_protection(request: Request, next: Next) -> Result<Response, AppError> {
    let exempt = matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS)
        || request.uri().path() == WEBHOOK_PATH;
    if exempt {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    let header = headers.get(CSRF_HEADER).and_then(|value| value.to_str().ok());
    let valid = matches!(
        (header, cookie_value(headers, CSRF_COOKIE)),
        (Some(header), Some(cookie)) if !header.is_empty() && header == cookie
    );

    if !valid {
        warn!("Rejected {} {} without a valid CSRF token", request.method(), request.uri().path());
        return Err(AppError::CsrfRejected);
    }
    Ok(next.run(request).await)
}

/// Last stop for errors: normalize oversized-body and extractor rejections,
/// and send TLS symptoms on the managed host to the diagnostic page.
pub async fn handle_errors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge.into_response();
    }

    let marker = response.extensions().get::<ErrorMarker>().copied();
    if marker.is_none() && REJECTION_STATUSES.contains(&response.status()) {
        return rejection_to_json(response).await;
    }

    let tls_symptom = marker.is_some_and(|marker| marker.tls_symptom);
    if tls_symptom && state.config.managed_host {
        warn!("TLS error on the managed host, redirecting to {DIAGNOSTIC_PATH}");
        return Redirect::temporary(DIAGNOSTIC_PATH).into_response();
    }
    response
}

/// Re-emit an extractor rejection's plain-text message as an [`AppError`] body.
async fn rejection_to_json(response: Response) -> Response {
    let (parts, body) = response.into_parts();
    let text = match to_bytes(body, REJECTION_BODY_LIMIT).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };
    let message = if text.is_empty() {
        parts.status.canonical_reason().unwrap_or("Bad Request").to_string()
    } else {
        text
    };
    debug!("Request rejected with {}: {message}", parts.status);
    AppError::Status {
        status: parts.status,
        message,
    }
    .into_response()
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
