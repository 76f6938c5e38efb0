//! Product catalog routes.
//!
//! - `GET    /products`     : list every product in catalog order
//! - `GET    /products/{id}`: fetch one product
//! - `POST   /products`     : add a validated product; the id is assigned here
//! - `PUT    /products/{id}`: replace a product wholesale
//! - `DELETE /products/{id}`: remove a product

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_core::{
    ApplicationError, DecodeError, DomainError, InterfaceError, Product, ProductId,
    ProductValidator,
};
use catalog_db::ProductRepository;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct CatalogState {
    pub repository: Arc<dyn ProductRepository>,
    pub validator: Arc<ProductValidator>,
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// Request correlation id, taken from `x-correlation-id` or generated. The
/// value is cached in request extensions so every extractor sees the same id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    fn resolve(parts: &mut Parts) -> Self {
        if let Some(existing) = parts.extensions.get::<CorrelationId>() {
            return existing.clone();
        }

        let id = parts
            .headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let correlation_id = CorrelationId(id);
        parts.extensions.insert(correlation_id.clone());
        correlation_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CorrelationId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(parts))
    }
}

/// A request body that decoded into a product and passed validation. Handlers
/// receive the validated value directly.
#[derive(Debug)]
pub struct ValidatedProduct(pub Product);

impl FromRequest<CatalogState> for ValidatedProduct {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &CatalogState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let CorrelationId(correlation_id) = CorrelationId::resolve(&mut parts);
        let req = Request::from_parts(parts, body);

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::from_application(
                DecodeError::Malformed(rejection.body_text()).into(),
                &correlation_id,
            )
        })?;

        let candidate = Product::from_json(&bytes).map_err(|error| {
            warn!(
                event_name = "catalog.product.decode_failed",
                correlation_id = %correlation_id,
                error = %error,
                "unable to decode product payload"
            );
            ApiError::from_application(error.into(), &correlation_id)
        })?;

        let product = state.validator.validate_candidate(candidate).map_err(|error| {
            warn!(
                event_name = "catalog.product.validation_failed",
                correlation_id = %correlation_id,
                field = error.field(),
                error = %error,
                "product failed validation"
            );
            ApiError::from_application(error.into(), &correlation_id)
        })?;

        Ok(Self(product))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_product_id(raw: &str, correlation_id: &str) -> Result<ProductId, ApiError> {
    raw.parse::<ProductId>().map_err(|error| {
        ApiError::from_application(
            DomainError::InvalidIdentifier(error.to_string()).into(),
            correlation_id,
        )
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_products(
    State(state): State<CatalogState>,
    CorrelationId(correlation_id): CorrelationId,
) -> Result<Json<Vec<Product>>, ApiError> {
    info!(event_name = "catalog.products.list", correlation_id = %correlation_id, "handle GET products");

    let products = state
        .repository
        .list()
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?;

    Ok(Json(products))
}

async fn get_product(
    State(state): State<CatalogState>,
    CorrelationId(correlation_id): CorrelationId,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&raw_id, &correlation_id)?;
    info!(
        event_name = "catalog.product.get",
        correlation_id = %correlation_id,
        product_id = %id,
        "handle GET product"
    );

    state
        .repository
        .find_by_id(id)
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?
        .map(Json)
        .ok_or_else(|| {
            ApiError::from_application(DomainError::ProductNotFound(id).into(), &correlation_id)
        })
}

async fn create_product(
    State(state): State<CatalogState>,
    CorrelationId(correlation_id): CorrelationId,
    ValidatedProduct(product): ValidatedProduct,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let stored = state
        .repository
        .add(product)
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?;

    info!(
        event_name = "catalog.product.created",
        correlation_id = %correlation_id,
        product_id = %stored.id,
        "handle POST product"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn update_product(
    State(state): State<CatalogState>,
    CorrelationId(correlation_id): CorrelationId,
    Path(raw_id): Path<String>,
    ValidatedProduct(product): ValidatedProduct,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&raw_id, &correlation_id)?;

    let stored = state.repository.update(id, product).await.map_err(|error| {
        warn!(
            event_name = "catalog.product.update_failed",
            correlation_id = %correlation_id,
            product_id = %id,
            error = %error,
            "product update rejected"
        );
        ApiError::from_application(error.into(), &correlation_id)
    })?;

    info!(
        event_name = "catalog.product.updated",
        correlation_id = %correlation_id,
        product_id = %id,
        "handle PUT product"
    );
    Ok(Json(stored))
}

async fn delete_product(
    State(state): State<CatalogState>,
    CorrelationId(correlation_id): CorrelationId,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_product_id(&raw_id, &correlation_id)?;

    state.repository.delete(id).await.map_err(|error| {
        warn!(
            event_name = "catalog.product.delete_failed",
            correlation_id = %correlation_id,
            product_id = %id,
            error = %error,
            "product delete rejected"
        );
        ApiError::from_application(error.into(), &correlation_id)
    })?;

    info!(
        event_name = "catalog.product.deleted",
        correlation_id = %correlation_id,
        product_id = %id,
        "handle DELETE product"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use catalog_core::ProductValidator;
    use catalog_db::seeded_repository;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, CatalogState, CORRELATION_HEADER};

    fn app() -> Router {
        router(CatalogState {
            repository: Arc::new(seeded_repository()),
            validator: Arc::new(ProductValidator::new().expect("validator")),
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|raw| Body::from(raw.to_string())).unwrap_or_else(Body::empty))
            .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn list_returns_seeded_products_with_legacy_description_key() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/products", None).await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().expect("array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["descripton"], "Frothy milky coffee");
        assert!(items[0].get("created_on").is_none());
    }

    #[tokio::test]
    async fn create_assigns_next_identifier_and_ignores_client_id() {
        let app = app();
        let payload =
            json!({"id": 42, "name": "Mocha", "descripton": "Chocolate", "price": 3.2, "sku": "moc-cha-late"});

        let (status, body) = send(&app, Method::POST, "/products", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 3);

        let (_, listed) = send(&app, Method::GET, "/products", None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn create_accepts_negative_client_id_and_assigns_the_next_one() {
        let app = app();
        let payload =
            json!({"id": -1, "name": "Cortado", "description": "Cut with milk", "price": 2.6, "sku": "cor-ta-do"});

        let (status, body) = send(&app, Method::POST, "/products", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 3);
        assert_eq!(body["descripton"], "Cut with milk");
    }

    #[tokio::test]
    async fn create_with_null_name_is_rejected_by_the_validator() {
        let app = app();
        let payload = json!({"name": null, "price": 1.0, "sku": "abc-def-ghi"});

        let (status, body) = send(&app, Method::POST, "/products", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap_or_default();
        assert!(message.starts_with("Error validating product"), "{message}");
        assert!(message.contains("name"), "{message}");
    }

    #[tokio::test]
    async fn create_rejects_malformed_json() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/products", Some("{\"name\":")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("unmarshal"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_sku_and_names_the_field() {
        let app = app();
        let payload = json!({"name": "Tea", "price": 1.0, "sku": "abc123"});

        let (status, body) = send(&app, Method::POST, "/products", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("sku"));

        let (_, listed) = send(&app, Method::GET, "/products", None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn update_replaces_product_and_keeps_path_identifier() {
        let app = app();
        let payload = json!({"id": 9, "name": "Ristretto", "price": 2.1, "sku": "short-strong-shot"});

        let (status, body) =
            send(&app, Method::PUT, "/products/2", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 2);
        assert_eq!(body["name"], "Ristretto");
        assert_eq!(body["descripton"], "");

        let (_, first) = send(&app, Method::GET, "/products/1", None).await;
        assert_eq!(first["name"], "Latte");
    }

    #[tokio::test]
    async fn update_of_unknown_product_is_not_found() {
        let app = app();
        let payload = json!({"name": "Ghost", "price": 1.0, "sku": "abc-def-ghi"});

        let (status, _) = send(&app, Method::PUT, "/products/99", Some(&payload.to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_product_and_reports_missing_ones() {
        let app = app();

        let (status, _) = send(&app, Method::DELETE, "/products/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listed) = send(&app, Method::GET, "/products", None).await;
        let ids: Vec<_> = listed
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|item| item["id"].as_u64())
            .collect();
        assert_eq!(ids, vec![2]);

        let (status, _) = send(&app, Method::DELETE, "/products/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_or_zero_identifier_is_a_bad_request() {
        let app = app();

        let (status, _) = send(&app, Method::DELETE, "/products/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/products/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_body_echoes_supplied_correlation_id() {
        let app = app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/products/77")
            .header(CORRELATION_HEADER, "req-abc")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["correlation_id"], "req-abc");
    }
}
