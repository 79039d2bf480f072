//! HTTP response building module
//!
//! Builders for every response the service sends. The password endpoint only
//! ever answers 200: failures travel in-band as a JSON envelope.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;

/// Body written when a password request fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "OK")]
    pub ok: bool,
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: message.into(),
        }
    }

    /// Serialized form followed by a newline
    pub fn to_body(&self) -> Bytes {
        match serde_json::to_vec(self) {
            Ok(mut json) => {
                json.push(b'\n');
                Bytes::from(json)
            }
            Err(e) => {
                crate::logger::log_error(&format!("Failed to serialize error envelope: {e}"));
                Bytes::from_static(b"{\"OK\":false,\"Error\":\"internal error\"}\n")
            }
        }
    }
}

/// Build 200 response carrying an error envelope
pub fn build_envelope_response(message: impl Into<String>) -> Response<Full<Bytes>> {
    let body = ErrorEnvelope::failure(message).to_body();
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Content-Length", body.len())
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error("envelope", &e);
            Response::new(Full::new(body))
        })
}

/// Build 200 response relaying generator output untouched
pub fn build_output_response(output: Bytes, content_type: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", output.len())
        .body(Full::new(output.clone()))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(output))
        })
}

/// Build health probe response
pub fn build_health_response(status: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-store")
        .body(Full::new(Bytes::from_static(status.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from_static(status.as_bytes())))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
