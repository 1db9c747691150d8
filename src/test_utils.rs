//! Shared test utilities.
//!
//! Helpers for an in-memory database and for building records with
//! sensible defaults, so tests only spell out the fields they care about.

use crate::{
    entities::{
        Category, CustomerModel, OrderItemModel, OrderModel, OrderStatus, ProductModel, Region,
    },
    errors::Result,
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed "now" so generated dates are reproducible across test runs.
#[must_use]
pub fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 15)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// A customer in Europe who signed up at the start of 2025.
#[must_use]
pub fn customer(id: i64, email: &str) -> CustomerModel {
    CustomerModel {
        id,
        name: format!("Customer {id}"),
        email: email.to_string(),
        region: Region::Europe,
        signup_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
    }
}

/// A book with the given cost and price.
#[must_use]
pub fn product(id: i64, cost: f64, price: f64) -> ProductModel {
    ProductModel {
        id,
        name: format!("Test Product {id}"),
        category: Category::Books,
        cost,
        price,
    }
}

/// An order placed at the reference time.
#[must_use]
pub fn order(id: i64, customer_id: i64, status: OrderStatus) -> OrderModel {
    OrderModel {
        id,
        customer_id,
        status,
        created_at: reference_time(),
    }
}

#[must_use]
pub fn order_item(order_id: i64, product_id: i64, quantity: i32, unit_price: f64) -> OrderItemModel {
    OrderItemModel {
        order_id,
        product_id,
        quantity,
        unit_price,
    }
}
