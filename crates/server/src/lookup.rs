//! Product lookup endpoint.
//!
//! - `GET /?code=<value>`: resolve one live product by its code
//!
//! Responses:
//! - 200 `{"id", "code", "price", "created_at", "updated_at"}`; `deleted_at`
//!   is never serialized because only live products are returned
//! - 400 code longer than `lookup.max_code_length`
//! - 404 no live product with that code
//! - 500 store failure or timeout
//!
//! Error bodies are `{"error", "correlation_id"}` with a fixed message.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::{errors::ApplicationError, Product};
use catalog_db::{ProductResolver, ResolveError};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct LookupState {
    resolver: ProductResolver,
}

impl LookupState {
    pub fn new(resolver: ProductResolver) -> Self {
        Self { resolver }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub code: String,
    pub price: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.0,
            code: product.code,
            price: product.price,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LookupError {
    pub error: &'static str,
    pub correlation_id: String,
}

pub fn router(resolver: ProductResolver) -> Router {
    Router::new().route("/", get(lookup_product)).with_state(LookupState::new(resolver))
}

/// Picks the first `code` pair; a missing parameter is the empty string and
/// takes the same resolver path as any other value.
fn code_param(pairs: &[(String, String)]) -> &str {
    pairs.iter().find(|(key, _)| key == "code").map(|(_, value)| value.as_str()).unwrap_or("")
}

pub async fn lookup_product(
    State(state): State<LookupState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<LookupError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();
    let code = code_param(&pairs);

    match state.resolver.resolve(code).await {
        Ok(product) => {
            info!(
                event_name = "catalog.lookup.hit",
                correlation_id = %correlation_id,
                product_id = product.id.0,
                "product resolved"
            );
            Ok(Json(ProductResponse::from(product)))
        }
        Err(resolve_error) => {
            match &resolve_error {
                ResolveError::NotFound => debug!(
                    event_name = "catalog.lookup.not_found",
                    correlation_id = %correlation_id,
                    code = ?code,
                    "no live product for code"
                ),
                ResolveError::InputRejected(reason) => warn!(
                    event_name = "catalog.lookup.rejected",
                    correlation_id = %correlation_id,
                    reason = %reason,
                    "lookup input rejected"
                ),
                ResolveError::Store(store_error) => error!(
                    event_name = "catalog.lookup.store_error",
                    correlation_id = %correlation_id,
                    error = %store_error,
                    "product lookup failed"
                ),
                ResolveError::Inconsistent(violation) => error!(
                    event_name = "catalog.lookup.inconsistent",
                    correlation_id = %correlation_id,
                    error = %violation,
                    "store returned a record outside the lookup contract"
                ),
            }

            let interface = ApplicationError::from(resolve_error).into_interface(correlation_id);
            let status = StatusCode::from_u16(interface.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((
                status,
                Json(LookupError {
                    error: interface.user_message(),
                    correlation_id: interface.correlation_id().to_string(),
                }),
            ))
        }
    }
}
