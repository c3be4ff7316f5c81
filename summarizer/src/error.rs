use std::collections::BTreeMap;

use serde_json::json;
use thiserror::Error;
use warp::{
    http::StatusCode,
    reject::Reject,
    reply::{Json, WithStatus},
    Rejection, Reply,
};

/// Field name -> messages, as reported by request shape validation.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid data")]
    InvalidShape(FieldErrors),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Reject for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidShape(_) => StatusCode::BAD_REQUEST,
            ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{error, details}` body with the matching status code.
    pub fn to_reply(&self) -> WithStatus<Json> {
        let details = match self {
            ApiError::InvalidShape(fields) => json!(fields),
            ApiError::Metrics(e) => json!(e.to_string()),
        };
        let body = json!({
            "error": self.to_string(),
            "details": details,
        });
        warp::reply::with_status(warp::reply::json(&body), self.status())
    }
}

/// Failures raised inside a summary backend before it can produce an outcome.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error calling {backend} API (Status: {status}): {body}")]
    Upstream {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response structure from {0} API.")]
    InvalidResponse(&'static str),

    #[error("Generated summary is empty.")]
    EmptySummary,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Status and field messages for rejections raised while reading the body.
fn body_problem(err: &Rejection) -> Option<(StatusCode, FieldErrors)> {
    let (status, message) = if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "A Content-Length header is required".to_string())
    } else {
        return None;
    };

    let mut fields = FieldErrors::new();
    fields.insert("body".to_string(), vec![message]);
    Some((status, fields))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        return Ok(api_err.to_reply());
    }

    if let Some((status, fields)) = body_problem(&err) {
        let body = json!({ "error": "Invalid data", "details": fields });
        return Ok(warp::reply::with_status(warp::reply::json(&body), status));
    }

    Err(err)
}

/// Body failures on the validate routes, in the `{valid, errors}` shape.
pub async fn handle_validate_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    match body_problem(&err) {
        Some((status, fields)) => {
            let body = json!({ "valid": false, "errors": fields });
            Ok(warp::reply::with_status(warp::reply::json(&body), status))
        }
        None => Err(err),
    }
}
