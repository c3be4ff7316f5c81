use std::sync::Arc;

use serde_json::Value;
use warp::{Filter, Rejection, Reply};

use crate::error::{handle_rejection, handle_validate_rejection};
use crate::pipeline::SummaryService;

pub mod docs;
pub mod shape;
mod summary;

const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Clinical routes under `/api/v1/summary`, veterinary ones under
/// `/api/v1/veterinary/summary`.
pub fn routes(
    clinical: Arc<SummaryService>,
    veterinary: Arc<SummaryService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    let clinical_routes = family(api.clone(), clinical);
    let veterinary_routes = family(api.and(warp::path("veterinary")), veterinary);

    clinical_routes
        .or(veterinary_routes)
        .recover(handle_rejection)
}

/// summary, history, validate and docs endpoints below `prefix`.
fn family<P>(
    prefix: P,
    service: Arc<SummaryService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    P: Filter<Extract = (), Error = Rejection> + Clone + Send + Sync + 'static,
{
    let base = prefix.and(warp::path("summary"));

    let summary_route = base
        .clone()
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(summary::handle_summary);

    let validate_route = base
        .clone()
        .and(warp::path("validate"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(summary::handle_validate)
        .recover(handle_validate_rejection);

    let history_route = base
        .clone()
        .and(warp::path("history"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(summary::handle_history);

    let docs_route = base
        .and(warp::path("docs"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service))
        .map(summary::handle_docs);

    summary_route
        .or(history_route)
        .or(validate_route)
        .or(docs_route)
}

fn json_body() -> impl Filter<Extract = (Value,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with_service(
    service: Arc<SummaryService>,
) -> impl Filter<Extract = (Arc<SummaryService>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}
