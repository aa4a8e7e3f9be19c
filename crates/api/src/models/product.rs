//! Product domain types and listing filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperleaf_core::{Category, ProductId};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Product description (stored verbatim; the frontend escapes it).
    pub description: String,
    /// Non-negative unit price.
    pub price: Decimal,
    /// Catalog category.
    pub category: Category,
    /// Image reference for the frontend.
    pub image_url: String,
    /// Whether the product can currently be added to carts.
    pub in_stock: bool,
    /// When the product was added to the catalog.
    pub created_at: DateTime<Utc>,
}

/// Catalog listing filters, taken from query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
}

/// One page of a catalog listing.
#[derive(Debug, Clone)]
pub struct ProductPage {
    /// Products on this page, newest first.
    pub products: Vec<Product>,
    /// Total products matching the filter.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    pub limit: i64,
}

impl ProductPage {
    /// Number of pages for this filter at this page size.
    #[must_use]
    pub const fn pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        // `i64::div_ceil` is not yet stable; this is the equivalent
        // ceiling division (limit > 0 is guaranteed above).
        let d = self.total / self.limit;
        let r = self.total % self.limit;
        if r > 0 { d + 1 } else { d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        let page = ProductPage {
            products: Vec::new(),
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(page.pages(), 3);
    }

    #[test]
    fn test_page_count_exact() {
        let page = ProductPage {
            products: Vec::new(),
            total: 20,
            page: 2,
            limit: 10,
        };
        assert_eq!(page.pages(), 2);
    }
}
