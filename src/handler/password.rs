//! `GET /v1/password` handler
//!
//! parse -> validate -> run generator -> relay stdout. Every failure is
//! answered with a single JSON envelope and ends the request.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::params::parse_password_params;
use crate::config::AppState;
use crate::generator::GeneratorError;
use crate::http;
use crate::logger;

/// Serve one password request for the given raw query string
pub async fn handle_password(query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    let params = match parse_password_params(query, &state.config.limits) {
        Ok(params) => params,
        Err(e) => {
            logger::log_debug(&format!("[Password] Rejected query: {e}"));
            return http::build_envelope_response(e.to_string());
        }
    };

    match state.generator.generate(params).await {
        Ok(output) => {
            http::build_output_response(output, &state.config.http.output_content_type)
        }
        Err(e) => {
            logger::log_generator_failed(&e);
            http::build_envelope_response(generator_failure_message(&e))
        }
    }
}

fn generator_failure_message(err: &GeneratorError) -> String {
    let (stdout, stderr) = err.captured_output();
    format!("Error: {err}\nStdout: {stdout}\nStderr: {stderr}")
}
