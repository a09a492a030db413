//! HTTP front end serving one sub-route per question source.
//!
//! Each configured source is mounted under its `sub_addr`:
//!
//! - `GET {sub_addr}/question.json?year=..&season=..&no=..`
//! - `GET {sub_addr}/random.json?min_year=..&max_year=..&min_no=..&max_no=..&season=..`
//!
//! Both answer with the question record plus an `error` field, which is empty
//! on success. Every request runs under the source's deadline.

mod params;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query as QueryParams, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, SourceConfig};
use crate::error::ConfigError;
use crate::fetch::{FetchError, Fetcher, deadline_token};
use crate::query::{Query, QueryRange, ValidationError};
use crate::random::SharedRng;
use crate::response::Response;
use crate::source::Source;

/// Error text returned when the deadline passes first.
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again later.";

/// Body of every route: the record plus an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonResponse {
    /// The question; empty when `error` is set.
    #[serde(flatten)]
    pub response: Response,

    /// Failure description; empty on success.
    pub error: String,
}

impl JsonResponse {
    fn ok(response: Response) -> Self {
        Self {
            response,
            error: String::new(),
        }
    }

    fn err(error: impl Into<String>) -> Self {
        Self {
            response: Response::default(),
            error: error.into(),
        }
    }
}

/// A source mounted at a sub-address, with its own fetcher and deadline.
#[derive(Debug)]
pub struct SourceRoute {
    name: String,
    sub_addr: String,
    wait: Duration,
    fetcher: Fetcher,
}

impl SourceRoute {
    /// Builds the route for one configured source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the fetcher cannot be built.
    pub fn from_config(config: &SourceConfig, rng: SharedRng) -> Result<Self, ConfigError> {
        let fetcher =
            Fetcher::with_charset(config.source(), config.interval(), rng, &config.charset)?;
        Ok(Self {
            name: config.name.clone(),
            sub_addr: config.route_prefix().to_string(),
            wait: config.wait(),
            fetcher,
        })
    }

    /// Source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path prefix of this route.
    #[must_use]
    pub fn sub_addr(&self) -> &str {
        &self.sub_addr
    }

    /// Per-request deadline.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// The source served here.
    #[must_use]
    pub fn source(&self) -> &Source {
        self.fetcher.source()
    }

    /// Fetches one question under this route's deadline.
    ///
    /// # Errors
    ///
    /// See [`Fetcher::get`].
    pub async fn get(&self, query: &Query) -> Result<Response, FetchError> {
        let token = deadline_token(self.wait);
        self.fetcher.get(query, &token).await
    }

    /// Fetches a random question under this route's deadline.
    ///
    /// # Errors
    ///
    /// See [`Fetcher::get_random`].
    pub async fn get_random(&self, range: &QueryRange) -> Result<Response, FetchError> {
        let token = deadline_token(self.wait);
        self.fetcher.get_random(range, &token).await
    }
}

/// Builds one route per configured source.
///
/// # Errors
///
/// Returns an error naming the first source that cannot be built.
pub fn build_routes(config: &AppConfig, rng: &SharedRng) -> Result<Vec<Arc<SourceRoute>>> {
    config
        .sources
        .iter()
        .map(|source| {
            SourceRoute::from_config(source, rng.clone())
                .map(Arc::new)
                .with_context(|| format!("Failed to set up source `{}`", source.name))
        })
        .collect()
}

/// Router with both endpoints of every route.
pub fn router(routes: &[Arc<SourceRoute>]) -> Router {
    routes.iter().fold(Router::new(), |app, route| {
        let sub: Router = Router::new()
            .route(
                &format!("{}/question.json", route.sub_addr()),
                get(question_json),
            )
            .route(
                &format!("{}/random.json", route.sub_addr()),
                get(random_json),
            )
            .with_state(Arc::clone(route));
        app.merge(sub)
    })
}

/// Binds `config.bind_addr()` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error when a source cannot be built or the listener fails.
pub async fn serve(config: &AppConfig, rng: SharedRng) -> Result<()> {
    let routes = build_routes(config, &rng)?;
    let app = router(&routes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    for route in &routes {
        info!(
            source = route.name(),
            "serving http://{addr}{}/question.json and {}/random.json",
            route.sub_addr(),
            route.sub_addr()
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn question_json(
    State(route): State<Arc<SourceRoute>>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> (StatusCode, Json<JsonResponse>) {
    debug!(source = route.name(), ?params, "question request");
    let query = match params::question_query(&params, route.source()) {
        Ok(query) => query,
        Err(e) => return invalid_params(&params, &e),
    };
    respond(route.get(&query).await)
}

async fn random_json(
    State(route): State<Arc<SourceRoute>>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> (StatusCode, Json<JsonResponse>) {
    debug!(source = route.name(), ?params, "random request");
    let range = match params::random_range(&params, route.source()) {
        Ok(range) => range,
        Err(e) => return invalid_params(&params, &e),
    };
    respond(route.get_random(&range).await)
}

fn invalid_params(
    params: &HashMap<String, String>,
    error: &ValidationError,
) -> (StatusCode, Json<JsonResponse>) {
    let mut pairs: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    let message = format!("invalid query form ({}), {error}", pairs.join("&"));
    warn!(%message, "rejected request");
    (StatusCode::BAD_REQUEST, Json(JsonResponse::err(message)))
}

fn respond(result: Result<Response, FetchError>) -> (StatusCode, Json<JsonResponse>) {
    match result {
        Ok(response) => (StatusCode::OK, Json(JsonResponse::ok(response))),
        Err(e) => {
            warn!(error = %e, "fetch failed");
            let status = match &e {
                FetchError::Validation(_) => StatusCode::BAD_REQUEST,
                FetchError::Cancelled { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            let message = if e.is_cancelled() {
                TIMEOUT_MESSAGE.to_string()
            } else {
                e.to_string()
            };
            (status, Json(JsonResponse::err(message)))
        }
    }
}
