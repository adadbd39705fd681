use std::sync::Arc;
use std::time::Duration;

use adgen::JobConfig;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::server::routes::{default, generate, results};
use crate::server::state::ServerState;
use crate::server::utils::at_least_one;

/// Upload limit applied when `--max-payload-bytes` is not given.
const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

#[derive(Debug, Args)]
pub struct RouterArgs {
    /// Maximum number of queued tasks; submissions wait for space when full.
    /// Unbounded when omitted. A submission still waiting when the request
    /// timeout fires is answered with 408 and no task is queued.
    #[clap(long, value_parser = at_least_one)]
    pub queue_capacity: Option<usize>,

    /// Fail a task whose processing takes longer than this many seconds.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub processing_timeout_secs: Option<u64>,

    /// Drop results nobody polled for this many seconds.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub result_ttl_secs: Option<u64>,

    /// Reject uploads larger than this many bytes.
    #[clap(long, value_parser = at_least_one)]
    pub max_payload_bytes: Option<usize>,

    /// Answer requests still running after this many seconds with 408.
    #[clap(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_secs: u64,

    /// Artificial delay added to every processed task, in milliseconds.
    #[clap(long, default_value = "0")]
    pub simulate_delay_ms: u64,
}

impl RouterArgs {
    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            queue_capacity: self.queue_capacity,
            processing_timeout: self.processing_timeout_secs.map(Duration::from_secs),
            result_ttl: self.result_ttl_secs.map(Duration::from_secs),
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    pub fn simulate_delay(&self) -> Duration {
        Duration::from_millis(self.simulate_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn init_router(state: Arc<ServerState>) -> Router {
    // Leave room for the multipart framing around the image itself.
    let body_limit = state
        .jobs
        .max_payload_bytes()
        .map_or(DEFAULT_BODY_LIMIT, |limit| limit.saturating_add(64 * 1024));
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/generate-ad", post(generate::generate_ad))
        .route("/results/:task_id", get(results::get_task_result))
        .route("/health", get(default::health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer((
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                // Log the matched route's path (with placeholders not filled in).
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                )
            }),
            TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout),
        ))
}
