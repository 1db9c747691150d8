//! Post-generation validation.
//!
//! Each filter drops records that break a value invariant and reports how many
//! it dropped. Nothing is repaired in place.

use crate::entities::{CustomerModel, OrderItemModel, ProductModel};
use tracing::{debug, warn};

/// How many records each filter removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    /// Customers dropped for a malformed email
    pub customers_removed: usize,
    /// Products dropped for a non-positive cost or a price below cost
    pub products_removed: usize,
    /// Order lines dropped for a non-positive quantity or negative price
    pub order_items_removed: usize,
}

impl CleaningReport {
    /// Total records dropped across all filters.
    #[must_use]
    pub const fn total_removed(&self) -> usize {
        self.customers_removed + self.products_removed + self.order_items_removed
    }
}

/// An email must contain both `@` and `.`.
#[must_use]
pub fn is_valid_customer(customer: &CustomerModel) -> bool {
    customer.email.contains('@') && customer.email.contains('.')
}

/// Cost and price must be positive and price must cover cost.
#[must_use]
pub fn is_valid_product(product: &ProductModel) -> bool {
    product.cost > 0.0 && product.price > 0.0 && product.price >= product.cost
}

/// Quantity must be positive and the unit price non-negative.
#[must_use]
pub fn is_valid_order_item(item: &OrderItemModel) -> bool {
    item.quantity > 0 && item.unit_price >= 0.0
}

/// Drops invalid customers, returning how many were dropped.
pub fn clean_customers(customers: &mut Vec<CustomerModel>) -> usize {
    retain_counted("customers", customers, is_valid_customer)
}

/// Drops invalid products, returning how many were dropped.
pub fn clean_products(products: &mut Vec<ProductModel>) -> usize {
    retain_counted("products", products, is_valid_product)
}

/// Drops invalid order lines, returning how many were dropped. Parent orders
/// are left alone.
pub fn clean_order_items(order_items: &mut Vec<OrderItemModel>) -> usize {
    retain_counted("order items", order_items, is_valid_order_item)
}

fn retain_counted<T>(label: &str, records: &mut Vec<T>, keep: fn(&T) -> bool) -> usize {
    let before = records.len();
    records.retain(keep);
    let removed = before - records.len();
    if removed > 0 {
        warn!("Removed {removed} invalid {label} ({} kept)", records.len());
    } else {
        debug!("All {before} {label} passed validation");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{customer, order_item, product};

    #[test]
    fn test_customer_email_filter() {
        let mut customers = vec![
            customer(1, "ada@example.com"),
            customer(2, "no-at-sign.example.com"),
            customer(3, "nodot@example"),
            customer(4, "grace@example.org"),
        ];

        assert_eq!(clean_customers(&mut customers), 2);
        let ids: Vec<i64> = customers.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_product_price_filter() {
        let mut products = vec![
            product(1, 10.0, 15.0),
            product(2, 0.0, 15.0),
            product(3, 10.0, 0.0),
            product(4, 10.0, 9.99),
            product(5, 10.0, 10.0),
        ];

        assert_eq!(clean_products(&mut products), 3);
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_order_item_filter() {
        let mut items = vec![
            order_item(1, 1, 2, 10.0),
            order_item(1, 2, 0, 10.0),
            order_item(2, 1, 1, -0.01),
            order_item(2, 2, 3, 0.0),
        ];

        assert_eq!(clean_order_items(&mut items), 2);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(is_valid_order_item));
    }

    #[test]
    fn test_report_total() {
        let report = CleaningReport {
            customers_removed: 1,
            products_removed: 2,
            order_items_removed: 3,
        };
        assert_eq!(report.total_removed(), 6);
        assert_eq!(CleaningReport::default().total_removed(), 0);
    }
}
