//! Middleware for modifying requests and responses.

use crate::infra::error::{ApiError, InternalError};
use axum::{body::Body, middleware::Next, response::IntoResponse};
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use hyper::body::Body as _;
use tower_http::trace::MakeSpan;

static X_REQUEST_ID: &str = "x-request-id";

#[derive(Clone)]
pub(crate) struct MakeRequestIdSpan;

impl<B> MakeSpan<B> for MakeRequestIdSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .expect("request id not set")
            .to_str()
            .expect("invalid request id");
        tracing::info_span!(
            "request",
            request_id = request_id,
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}

/// The maximum size of a body to log.
const MAX_BODY_SIZE: u64 = 8192;

/// Trace the request and response, including small bodies.
pub(crate) async fn log_request_response(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let (parts, body) = req.into_parts();
    let req = match body.size_hint().upper() {
        Some(n) if n <= MAX_BODY_SIZE => {
            let body_bytes = buffer_and_print("Request", body).await?;
            Request::from_parts(parts, Body::from(body_bytes))
        }
        _ => Request::from_parts(parts, body),
    };

    let res = next.run(req).await;

    let (parts, body) = res.into_parts();
    let res = match body.size_hint().upper() {
        Some(n) if n <= MAX_BODY_SIZE => {
            let body_bytes = buffer_and_print("Response", body).await?;
            Response::from_parts(parts, Body::from(body_bytes))
        }
        _ => Response::from_parts(parts, body),
    };

    Ok(res)
}

/// Read an entire body stream into memory, and trace it if it is valid text.
async fn buffer_and_print(direction: &str, body: Body) -> Result<Bytes, ApiError> {
    let body: Bytes = body
        .collect()
        .await
        .map_err(|e| InternalError::BodyError(e.to_string()))?
        .to_bytes();

    if let Ok(body) = std::str::from_utf8(&body) {
        tracing::trace!("{} body = {:?}", direction, body);
    }

    Ok(body)
}
