/// Browser clients call the summary API cross-origin.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Origin",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
            "Content-Type",
            "Accept",
            "Content-Length",
        ])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}
