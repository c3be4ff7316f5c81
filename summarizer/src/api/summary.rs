use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;
use warp::{http::StatusCode, Rejection, Reply};

use super::{docs, shape};
use crate::error::ApiError;
use crate::pipeline::SummaryService;

pub async fn handle_summary(
    body: Value,
    service: Arc<SummaryService>,
) -> Result<impl Reply, Rejection> {
    let domain = service.domain();
    let request = match shape::parse_request(domain, &body) {
        Ok(request) => request,
        Err(fields) => {
            info!("Rejected {} summary request: {:?}", domain.kind.as_str(), fields);
            return Ok(ApiError::InvalidShape(fields).to_reply());
        }
    };

    let reply = match service.generate(&request).await.into_response() {
        Ok(success) => warp::reply::with_status(warp::reply::json(&success), StatusCode::OK),
        Err(failure) => warp::reply::with_status(
            warp::reply::json(&failure),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    };
    Ok(reply)
}

/// Pass-through summary: the history goes to the provider as sent.
pub async fn handle_history(
    body: Value,
    service: Arc<SummaryService>,
) -> Result<impl Reply, Rejection> {
    let request = match shape::parse_history_request(&body) {
        Ok(request) => request,
        Err(fields) => return Ok(ApiError::InvalidShape(fields).to_reply()),
    };

    let reply = match service.summarize_raw(&request).await.into_response() {
        Ok(success) => warp::reply::with_status(warp::reply::json(&success), StatusCode::OK),
        Err(failure) => warp::reply::with_status(
            warp::reply::json(&failure),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    };
    Ok(reply)
}

pub async fn handle_validate(
    body: Value,
    service: Arc<SummaryService>,
) -> Result<impl Reply, Rejection> {
    let request = match shape::parse_request(service.domain(), &body) {
        Ok(request) => request,
        Err(fields) => {
            let body = json!({ "valid": false, "errors": fields });
            return Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    let report = service.validate(&request);
    Ok(warp::reply::with_status(warp::reply::json(&report), StatusCode::OK))
}

pub fn handle_docs(service: Arc<SummaryService>) -> impl Reply {
    warp::reply::json(&docs::describe(service.domain()))
}
