// REST API with Axum
// POST /transactions, GET /transactions, GET /health-score, GET /status

use crate::config::Config;
use crate::db::TransactionStore;
use crate::error::Error;
use crate::health::HealthReport;
use crate::models::{Transaction, TransactionInput};
use crate::schema::{DateRange, ValidationError};
use crate::summary::SummaryReport;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TransactionStore>,
}

impl AppState {
    pub fn new(store: TransactionStore) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(ThisError, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] Error),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize, Deserialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match &self {
            ApiError::Core(Error::Validation(errors)) => (StatusCode::BAD_REQUEST, errors.clone()),
            ApiError::Core(e) => {
                error!("request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, Vec::new()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            errors,
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("rejected query string: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeParams {
    fn to_range(&self) -> Result<DateRange, Error> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
            .map_err(Error::Validation)
    }
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    status: String,
    version: String,
    transactions: usize,
}

/// POST /transactions - Record a transaction
async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(input) = payload?;
    let tx = state.store.insert(&input)?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// GET /transactions?start_date&end_date - Totals plus the transactions in range
async fn list_transactions(
    State(state): State<AppState>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult<Json<SummaryReport>> {
    let Query(params) = params?;
    let range = params.to_range()?;
    let transactions = state.store.query(&range)?;
    debug!(count = transactions.len(), "list_transactions: loaded range");
    Ok(Json(SummaryReport::build(&range, transactions)))
}

/// GET /health-score?start_date&end_date - Savings rate, score, and expense mix
async fn get_health_score(
    State(state): State<AppState>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult<Json<HealthReport>> {
    let Query(params) = params?;
    let range = params.to_range()?;
    let transactions = state.store.query(&range)?;
    let report = HealthReport::build(&range, &transactions);
    debug!(score = report.health.score, label = %report.health.label, "health score computed");
    Ok(Json(report))
}

/// GET /status - Liveness plus record count
async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        transactions: state.store.count()?,
    }))
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

pub fn app_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/health-score", get(get_health_score))
        .route("/status", get(status))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout))
                .layer(cors_layer(config)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let response = ApiError::from(Error::validation("amount", "Must be numeric")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_maps_to_server_error() {
        let response = ApiError::from(Error::LockPoisoned).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_range_params_require_both_bounds() {
        let params = RangeParams {
            start_date: Some("2024-01-01".to_string()),
            end_date: None,
        };
        assert!(params.to_range().unwrap_err().is_validation());
    }
}
