//! Customer REST endpoints.
//!
//! Routes under `/api/v1/customers` map one-to-one onto `CustomerService`
//! operations. Failures are rendered as [`ApiError`] bodies; the status code
//! follows the error kind (not found 404, duplicate email 409, no-op update 400).

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use clientele_core::{
    ApplicationError, Customer, CustomerId, CustomerRegistrationRequest, CustomerService,
    CustomerUpdateRequest, InterfaceError,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct CustomerState {
    service: CustomerService,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub path: String,
    pub message: String,
    pub status_code: u16,
    pub correlation_id: String,
    pub timestamp: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn router(service: CustomerService) -> Router {
    Router::new()
        .route("/api/v1/customers", get(list_customers).post(register_customer))
        .route(
            "/api/v1/customers/{customer_id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(CustomerState { service })
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(error: ApplicationError, uri: &Uri, correlation_id: String) -> (StatusCode, Json<ApiError>) {
    let interface = error.into_interface(correlation_id);
    let status = status_for(&interface);

    if status.is_server_error() {
        error!(
            event_name = "http.customers.failed",
            correlation_id = %interface.correlation_id(),
            path = %uri.path(),
            error = %interface,
            "customer request failed"
        );
    } else {
        warn!(
            event_name = "http.customers.rejected",
            correlation_id = %interface.correlation_id(),
            path = %uri.path(),
            status = status.as_u16(),
            error = %interface,
            "customer request rejected"
        );
    }

    (
        status,
        Json(ApiError {
            path: uri.path().to_string(),
            message: interface.user_message().to_string(),
            status_code: status.as_u16(),
            correlation_id: interface.correlation_id().to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

async fn list_customers(
    State(state): State<CustomerState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Vec<Customer>>> {
    let correlation_id = correlation_id(&headers);
    let customers = state
        .service
        .get_all_customers()
        .await
        .map_err(|error| api_error(error, &uri, correlation_id))?;

    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<CustomerState>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Customer>> {
    let correlation_id = correlation_id(&headers);
    let customer = state
        .service
        .get_customer(CustomerId(customer_id))
        .await
        .map_err(|error| api_error(error, &uri, correlation_id))?;

    Ok(Json(customer))
}

async fn register_customer(
    State(state): State<CustomerState>,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<CustomerRegistrationRequest>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let correlation_id = correlation_id(&headers);
    let customer = state
        .service
        .add_customer(request)
        .await
        .map_err(|error| api_error(error, &uri, correlation_id.clone()))?;

    info!(
        event_name = "http.customers.created",
        correlation_id = %correlation_id,
        customer_id = %customer.id,
        "customer created"
    );
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<CustomerState>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<CustomerUpdateRequest>,
) -> ApiResult<Json<Customer>> {
    let correlation_id = correlation_id(&headers);
    let customer = state
        .service
        .update_customer(CustomerId(customer_id), request)
        .await
        .map_err(|error| api_error(error, &uri, correlation_id))?;

    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<CustomerState>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<StatusCode> {
    let correlation_id = correlation_id(&headers);
    state
        .service
        .delete_customer_by_id(CustomerId(customer_id))
        .await
        .map_err(|error| api_error(error, &uri, correlation_id))?;

    Ok(StatusCode::NO_CONTENT)
}
