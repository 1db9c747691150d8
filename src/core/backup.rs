//! CSV backups of the generated dataset.
//!
//! Every collection goes to its own file with a header row followed by one row
//! per record, columns in entity field order. Files are written independently:
//! a failure on one is recorded and the remaining files are still attempted.

use crate::{core::generate::Dataset, errors::Result};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Backup file for customers
pub const CUSTOMERS_FILE: &str = "customers.csv";
/// Backup file for products
pub const PRODUCTS_FILE: &str = "products.csv";
/// Backup file for orders
pub const ORDERS_FILE: &str = "orders.csv";
/// Backup file for order items
pub const ORDER_ITEMS_FILE: &str = "order_items.csv";

/// Column names of `customers.csv`
pub const CUSTOMERS_HEADER: [&str; 5] = ["id", "name", "email", "region", "signup_date"];
/// Column names of `products.csv`
pub const PRODUCTS_HEADER: [&str; 5] = ["id", "name", "category", "cost", "price"];
/// Column names of `orders.csv`
pub const ORDERS_HEADER: [&str; 4] = ["id", "customer_id", "status", "created_at"];
/// Column names of `order_items.csv`
pub const ORDER_ITEMS_HEADER: [&str; 4] = ["order_id", "product_id", "quantity", "unit_price"];

/// Outcome of writing one backup file.
#[derive(Debug)]
pub struct BackupOutcome {
    /// Where the file was (or would have been) written
    pub path: PathBuf,
    /// Rows written, excluding the header, or the failure
    pub result: Result<usize>,
}

impl BackupOutcome {
    /// Whether the file was written completely.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Writes `header` then `records` to `path` as CSV, returning the number of
/// data rows. The header is written even when there are no records.
pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], records: &[T]) -> Result<usize> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Writes all four backup files into `dir`, creating it if needed.
#[instrument(skip(dataset))]
pub fn write_backups(dir: &Path, dataset: &Dataset) -> Vec<BackupOutcome> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        error!("Could not create backup directory {}: {e}", dir.display());
    }

    let outcomes = vec![
        backup(dir, CUSTOMERS_FILE, &CUSTOMERS_HEADER, &dataset.customers),
        backup(dir, PRODUCTS_FILE, &PRODUCTS_HEADER, &dataset.products),
        backup(dir, ORDERS_FILE, &ORDERS_HEADER, &dataset.orders),
        backup(dir, ORDER_ITEMS_FILE, &ORDER_ITEMS_HEADER, &dataset.order_items),
    ];

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed == 0 {
        info!("Data saved to CSV files in {}", dir.display());
    } else {
        error!("{failed} of {} backup files failed", outcomes.len());
    }
    outcomes
}

fn backup<T: Serialize>(
    dir: &Path,
    file_name: &str,
    header: &[&str],
    records: &[T],
) -> BackupOutcome {
    let path = dir.join(file_name);
    let result = write_csv(&path, header, records);
    match &result {
        Ok(rows) => info!("Wrote {rows} rows to {}", path.display()),
        Err(e) => error!("Failed to write {}: {e}", path.display()),
    }
    BackupOutcome { path, result }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::OrderStatus;
    use crate::test_utils::{customer, order, order_item, product};

    fn read_rows(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader.records().collect::<std::result::Result<_, _>>().unwrap();
        (headers, rows)
    }

    #[test]
    fn test_headers_follow_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset {
            customers: vec![customer(1, "ada@example.com")],
            products: vec![product(1, 10.0, 12.5)],
            orders: vec![order(1, 1, OrderStatus::Completed)],
            order_items: vec![order_item(1, 1, 2, 12.5)],
        };

        let outcomes = write_backups(dir.path(), &dataset);
        assert!(outcomes.iter().all(BackupOutcome::is_ok));

        let (headers, rows) = read_rows(&dir.path().join(CUSTOMERS_FILE));
        assert_eq!(headers, ["id", "name", "email", "region", "signup_date"]);
        assert_eq!(&rows[0][2], "ada@example.com");

        let (headers, _) = read_rows(&dir.path().join(PRODUCTS_FILE));
        assert_eq!(headers, ["id", "name", "category", "cost", "price"]);

        let (headers, rows) = read_rows(&dir.path().join(ORDERS_FILE));
        assert_eq!(headers, ["id", "customer_id", "status", "created_at"]);
        assert_eq!(&rows[0][2], "Completed");

        let (headers, rows) = read_rows(&dir.path().join(ORDER_ITEMS_FILE));
        assert_eq!(headers, ["order_id", "product_id", "quantity", "unit_price"]);
        assert_eq!(&rows[0][3], "12.5");
    }

    #[test]
    fn test_row_counts_match_collections() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset {
            customers: (1..=4).map(|id| customer(id, &format!("c{id}@example.com"))).collect(),
            products: vec![product(1, 1.0, 2.0), product(2, 3.0, 4.0)],
            ..Dataset::default()
        };

        let outcomes = write_backups(dir.path(), &dataset);
        let rows: Vec<usize> = outcomes
            .iter()
            .map(|o| *o.result.as_ref().unwrap())
            .collect();
        assert_eq!(rows, vec![4, 2, 0, 0]);

        let (_, customer_rows) = read_rows(&dir.path().join(CUSTOMERS_FILE));
        assert_eq!(customer_rows.len(), 4);

        let (headers, order_rows) = read_rows(&dir.path().join(ORDERS_FILE));
        assert_eq!(headers, ORDERS_HEADER);
        assert!(order_rows.is_empty());
    }

    #[test]
    fn test_failure_does_not_block_other_files() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the products file name makes that one write fail.
        std::fs::create_dir(dir.path().join(PRODUCTS_FILE)).unwrap();

        let dataset = Dataset {
            customers: vec![customer(1, "ada@example.com")],
            products: vec![product(1, 10.0, 12.5)],
            ..Dataset::default()
        };

        let outcomes = write_backups(dir.path(), &dataset);
        let ok: Vec<bool> = outcomes.iter().map(BackupOutcome::is_ok).collect();
        assert_eq!(ok, vec![true, false, true, true]);
        assert!(dir.path().join(ORDER_ITEMS_FILE).exists());
    }
}
