//! Filter Pipeline Middleware.
//! Runs an endpoint's filters and only calls the handler when none of them
//! short-circuits.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::filters::{FilterContext, FilterPipeline};

pub async fn filter_middleware(
    State(pipeline): State<Arc<FilterPipeline>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ctx = FilterContext::from_request(pipeline.handler_name(), &req);
    pipeline.execute(ctx, move || next.run(req)).await
}
