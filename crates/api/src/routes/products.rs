//! Product catalog route handlers.
//!
//! Listing and detail are public; create, update, and delete are admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use copperleaf_core::{Category, ProductId};

use crate::db::ProductRepository;
use crate::db::products::ProductInput;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{Product, ProductFilter};
use crate::routes::envelope::{Envelope, Pagination};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Catalog listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<Category>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<Product>>> {
    let filter = ProductFilter {
        category: query.category,
        min_price: query.min_price,
        max_price: query.max_price,
        in_stock: query.in_stock,
    };

    let repo = ProductRepository::new(state.pool());
    let page = repo
        .list(
            &filter,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let pagination = Pagination {
        total: page.total,
        page: page.page,
        pages: page.pages(),
    };
    let count = page.products.len();

    Ok(Envelope::paginated(page.products, count, pagination))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Envelope<Product>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;

    Ok(Envelope::ok(product))
}

fn validate_input(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("product name is required".to_string()));
    }
    if input.price < Decimal::ZERO {
        return Err(ApiError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// `POST /api/products` (admin)
#[instrument(skip(state, _admin, input))]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<Envelope<Product>> {
    validate_input(&input)?;

    let repo = ProductRepository::new(state.pool());
    let product = repo.create(&input).await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok(Envelope::created(product))
}

/// `PUT /api/products/{id}` (admin)
#[instrument(skip(state, _admin, input))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Envelope<Product>> {
    validate_input(&input)?;

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_string()))?;

    Ok(Envelope::ok(product))
}

/// `DELETE /api/products/{id}` (admin)
///
/// Carts referencing the product are not touched here; dangling lines are
/// pruned by reconciliation the next time each cart is read.
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Envelope<()>> {
    let repo = ProductRepository::new(state.pool());
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("product not found".to_string()));
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(Envelope::message("product deleted"))
}
