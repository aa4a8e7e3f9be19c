//! Catalog seeding command.
//!
//! `seed products` replaces the whole catalog with the sample set, the same
//! way a fixture import would; `seed clear` empties it.

use rust_decimal::Decimal;

use copperleaf_core::Category;
use copperleaf_api::db::products::ProductInput;

use super::{CliError, connect};

fn sample_products() -> Vec<ProductInput> {
    let product = |name: &str, description: &str, cents: i64, category, image: &str| ProductInput {
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(cents, 2),
        category,
        image_url: Some(image.to_string()),
        in_stock: Some(true),
    };

    vec![
        product(
            "Smartphone XYZ",
            "High-end smartphone with advanced features and security.",
            799_99,
            Category::Electronics,
            "images/products/smartphone.jpg",
        ),
        product(
            "Laptop Pro",
            "Professional grade laptop with secure boot and encryption features.",
            1299_99,
            Category::Electronics,
            "images/products/laptop.jpg",
        ),
        product(
            "Security Camera",
            "HD security camera with motion detection and encrypted data transmission.",
            129_99,
            Category::Electronics,
            "images/products/camera.jpg",
        ),
        product(
            "Secure External Hard Drive",
            "Encrypted external hard drive with hardware authentication.",
            89_99,
            Category::Electronics,
            "images/products/hard-drive.jpg",
        ),
        product(
            "T-Shirt",
            "Cotton t-shirt with cybersecurity themes.",
            24_99,
            Category::Clothing,
            "images/products/tshirt.jpg",
        ),
        product(
            "Cybersecurity Handbook",
            "Comprehensive guide to modern cybersecurity practices.",
            34_99,
            Category::Books,
            "images/products/book.jpg",
        ),
        product(
            "Smart Lock",
            "Wi-Fi enabled smart lock with advanced encryption.",
            149_99,
            Category::HomeAndKitchen,
            "images/products/smart-lock.jpg",
        ),
        product(
            "Password Manager Subscription",
            "One-year subscription to a secure password management service.",
            39_99,
            Category::Other,
            "images/products/password-manager.jpg",
        ),
    ]
}

/// Replace the catalog with the sample product set.
pub async fn products() -> Result<(), CliError> {
    let pool = connect().await?;

    sqlx::query("DELETE FROM products").execute(&pool).await?;

    let repo = copperleaf_api::db::ProductRepository::new(&pool);
    let samples = sample_products();
    let count = samples.len();

    for input in &samples {
        repo.create(input).await?;
    }

    tracing::info!("Seeded {count} products");
    Ok(())
}

/// Delete every product.
pub async fn clear() -> Result<(), CliError> {
    let pool = connect().await?;

    let result = sqlx::query("DELETE FROM products").execute(&pool).await?;

    tracing::info!("Deleted {} products", result.rows_affected());
    Ok(())
}
