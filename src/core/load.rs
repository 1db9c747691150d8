//! Database load of a generated dataset.
//!
//! Tables are filled parents first: `Customers`, `Products`, `Orders`, then
//! `OrderItems`. The first three are each one transaction: rows go out as
//! multi-row inserts of at most `batch_size` rows per statement and the table
//! is committed once, or rolled back as a whole. `OrderItems` is committed
//! batch by batch instead; the first failing batch is rolled back and the
//! batches after it are not attempted, leaving earlier batches in place.
//!
//! A failed table never stops the next table from being attempted. Nothing is
//! retried.

use crate::{
    core::generate::Dataset,
    entities::{
        CustomerModel, OrderItemModel, OrderModel, ProductModel, customer, order, order_item,
        product,
    },
    errors::Result,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use tracing::{error, info, instrument, warn};

/// Rows per committed `OrderItems` batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// What happened while loading one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Table name
    pub table: &'static str,
    /// Rows handed to the loader
    pub attempted: usize,
    /// Size of every committed transaction, in commit order
    pub committed_batches: Vec<usize>,
    /// Failure message, if the table did not load completely
    pub error: Option<String>,
}

impl StageReport {
    fn new(table: &'static str, attempted: usize) -> Self {
        Self {
            table,
            attempted,
            committed_batches: Vec::new(),
            error: None,
        }
    }

    /// Rows that made it into the table.
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.committed_batches.iter().sum()
    }

    /// Whether every row was committed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-table results of a load, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// One entry per table
    pub stages: Vec<StageReport>,
}

impl LoadReport {
    /// Whether every table loaded without error.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stages.iter().all(StageReport::succeeded)
    }

    /// Looks up the report for `table`.
    #[must_use]
    pub fn stage(&self, table: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.table == table)
    }
}

/// Loads all four collections in dependency order.
#[instrument(skip(db, dataset))]
pub async fn load_dataset(
    db: &DatabaseConnection,
    dataset: &Dataset,
    batch_size: usize,
) -> LoadReport {
    let batch_size = batch_size.max(1);
    let stages = vec![
        insert_customers(db, &dataset.customers, batch_size).await,
        insert_products(db, &dataset.products, batch_size).await,
        insert_orders(db, &dataset.orders, batch_size).await,
        insert_order_items(db, &dataset.order_items, batch_size).await,
    ];
    LoadReport { stages }
}

/// Inserts all customers in one transaction.
pub async fn insert_customers(
    db: &DatabaseConnection,
    customers: &[CustomerModel],
    batch_size: usize,
) -> StageReport {
    let rows: Vec<customer::ActiveModel> = customers.iter().map(customer_row).collect();
    load_table(db, "Customers", &rows, batch_size).await
}

/// Inserts all products in one transaction.
pub async fn insert_products(
    db: &DatabaseConnection,
    products: &[ProductModel],
    batch_size: usize,
) -> StageReport {
    let rows: Vec<product::ActiveModel> = products.iter().map(product_row).collect();
    load_table(db, "Products", &rows, batch_size).await
}

/// Inserts all orders in one transaction.
pub async fn insert_orders(
    db: &DatabaseConnection,
    orders: &[OrderModel],
    batch_size: usize,
) -> StageReport {
    let rows: Vec<order::ActiveModel> = orders.iter().map(order_row).collect();
    load_table(db, "Orders", &rows, batch_size).await
}

/// Inserts order lines in batches of `batch_size`, one commit per batch,
/// stopping at the first batch that fails.
pub async fn insert_order_items(
    db: &DatabaseConnection,
    order_items: &[OrderItemModel],
    batch_size: usize,
) -> StageReport {
    let batch_size = batch_size.max(1);
    let mut report = StageReport::new("OrderItems", order_items.len());
    info!("Inserting {} order items...", order_items.len());

    let rows: Vec<order_item::ActiveModel> = order_items.iter().map(order_item_row).collect();
    let total_batches = rows.len().div_ceil(batch_size);

    for (index, batch) in rows.chunks(batch_size).enumerate() {
        if let Err(e) = insert_in_transaction(db, batch, batch_size).await {
            error!(
                "Error inserting order items batch {}/{}: {e}",
                index + 1,
                total_batches
            );
            report.error = Some(format!("batch {} of {total_batches}: {e}", index + 1));
            break;
        }
        report.committed_batches.push(batch.len());
        info!(
            "  -> Inserted {}/{} order items...",
            report.inserted(),
            report.attempted
        );
    }

    if report.succeeded() {
        info!("Inserted {} order items", report.inserted());
    } else if report.inserted() < report.attempted {
        warn!(
            "OrderItems partially loaded: {} of {} rows committed, remaining batches skipped",
            report.inserted(),
            report.attempted
        );
    }
    report
}

async fn load_table<A>(
    db: &DatabaseConnection,
    table: &'static str,
    rows: &[A],
    batch_size: usize,
) -> StageReport
where
    A: ActiveModelTrait + Clone,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let mut report = StageReport::new(table, rows.len());
    info!("Inserting {} rows into {table}...", rows.len());

    match insert_in_transaction(db, rows, batch_size.max(1)).await {
        Ok(()) => {
            if !rows.is_empty() {
                report.committed_batches.push(rows.len());
            }
            info!("Inserted {} rows into {table}", rows.len());
        }
        Err(e) => {
            error!("Error inserting {table}, rolled back: {e}");
            report.error = Some(e.to_string());
        }
    }
    report
}

/// Inserts `rows` inside a single transaction, `statement_rows` rows per
/// statement. Rolls back on the first failed statement.
async fn insert_in_transaction<A>(
    db: &DatabaseConnection,
    rows: &[A],
    statement_rows: usize,
) -> Result<()>
where
    A: ActiveModelTrait + Clone,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    if rows.is_empty() {
        return Ok(());
    }

    let txn = db.begin().await?;
    for chunk in rows.chunks(statement_rows) {
        let inserted = <A::Entity as EntityTrait>::insert_many(chunk.iter().cloned())
            .exec_without_returning(&txn)
            .await;
        if let Err(e) = inserted {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback failed: {rollback_err}");
            }
            return Err(e.into());
        }
    }
    txn.commit().await?;
    Ok(())
}

fn customer_row(c: &CustomerModel) -> customer::ActiveModel {
    customer::ActiveModel {
        id: Set(c.id),
        name: Set(c.name.clone()),
        email: Set(c.email.clone()),
        region: Set(c.region),
        signup_date: Set(c.signup_date),
    }
}

fn product_row(p: &ProductModel) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(p.id),
        name: Set(p.name.clone()),
        category: Set(p.category),
        cost: Set(p.cost),
        price: Set(p.price),
    }
}

fn order_row(o: &OrderModel) -> order::ActiveModel {
    order::ActiveModel {
        id: Set(o.id),
        customer_id: Set(o.customer_id),
        status: Set(o.status),
        created_at: Set(o.created_at),
    }
}

fn order_item_row(i: &OrderItemModel) -> order_item::ActiveModel {
    order_item::ActiveModel {
        order_id: Set(i.order_id),
        product_id: Set(i.product_id),
        quantity: Set(i.quantity),
        unit_price: Set(i.unit_price),
    }
}
