//! Product command and query endpoints.

use std::sync::Arc;

use application::{ApplyDiscount, CreateProduct, ProductService, UpdateProduct};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use common::AggregateId;
use queries::{GetProduct, ListProducts, ProductListView, ProductQueries, ProductView};
use serde::{Deserialize, Serialize};
use store::{OutboxEvent, OutboxReader};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub commands: ProductService,
    pub queries: ProductQueries,
    pub outbox: Arc<dyn OutboxReader>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Base price as `price_numerator / price_denominator`.
    pub price_numerator: i64,
    pub price_denominator: i64,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

#[derive(Deserialize)]
pub struct ApplyDiscountRequest {
    /// Decimal percentage, e.g. `"12.5"`.
    pub percent: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub product_id: String,
}

#[derive(Serialize)]
pub struct OutboxEventResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub status: String,
    pub created_at: String,
    pub processed_at: Option<String>,
    pub payload: serde_json::Value,
}

impl From<OutboxEvent> for OutboxEventResponse {
    fn from(event: OutboxEvent) -> Self {
        Self {
            event_id: event.event_id.to_string(),
            event_type: event.event_type,
            aggregate_id: event.aggregate_id.to_string(),
            status: event.status.to_string(),
            created_at: event
                .created_at
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            processed_at: event
                .processed_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            payload: event.payload,
        }
    }
}

// -- Handlers --

/// POST /products creates an inactive product.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    let Json(req) = payload?;
    let cmd = CreateProduct::new(
        req.name,
        req.description,
        req.category,
        req.price_numerator,
        req.price_denominator,
    );
    let product_id = state.commands.create_product(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            product_id: product_id.to_string(),
        }),
    ))
}

/// GET /products lists active products, newest first.
#[tracing::instrument(skip(state, params))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListProductsParams>, QueryRejection>,
) -> Result<Json<ProductListView>, ApiError> {
    let Query(params) = params?;
    let page = state
        .queries
        .list_products(ListProducts {
            category: params.category,
            page_size: params.page_size.unwrap_or_default(),
            page_token: params.page_token,
        })
        .await?;

    Ok(Json(page))
}

/// GET /products/{id} returns a product priced at the current instant.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// PATCH /products/{id} replaces name, description and category.
#[tracing::instrument(skip(state, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let Json(req) = payload?;
    state
        .commands
        .update_product(UpdateProduct::new(
            product_id,
            req.name,
            req.description,
            req.category,
        ))
        .await?;

    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// POST /products/{id}/activate
#[tracing::instrument(skip(state))]
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.commands.activate_product(product_id).await?;
    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// POST /products/{id}/deactivate
#[tracing::instrument(skip(state))]
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.commands.deactivate_product(product_id).await?;
    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// POST /products/{id}/archive
#[tracing::instrument(skip(state))]
pub async fn archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.commands.archive_product(product_id).await?;
    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// POST /products/{id}/discount attaches a discount to an active product.
#[tracing::instrument(skip(state, payload))]
pub async fn apply_discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ApplyDiscountRequest>, JsonRejection>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let Json(req) = payload?;
    state
        .commands
        .apply_discount(ApplyDiscount::new(
            product_id,
            req.percent,
            req.start,
            req.end,
        ))
        .await?;

    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// DELETE /products/{id}/discount
#[tracing::instrument(skip(state))]
pub async fn remove_discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.commands.remove_discount(product_id).await?;
    Ok(Json(load_view(&state.queries, product_id).await?))
}

/// GET /products/{id}/events lists the outbox rows written for a product.
#[tracing::instrument(skip(state))]
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OutboxEventResponse>>, ApiError> {
    let product_id = parse_product_id(&id)?;
    load_view(&state.queries, product_id).await?;

    let events = state
        .outbox
        .events_for_aggregate(product_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}

async fn load_view(
    queries: &ProductQueries,
    product_id: AggregateId,
) -> Result<ProductView, ApiError> {
    Ok(queries.get_product(GetProduct::new(product_id)).await?)
}

fn parse_product_id(id: &str) -> Result<AggregateId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
