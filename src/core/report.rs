//! Post-load summary.
//!
//! Read-only aggregate queries confirming what landed in the database: a row
//! count per table and the revenue of completed orders.

use crate::{
    entities::{Customer, Order, OrderItem, OrderStatus, Product, order, order_item},
    errors::Result,
};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QuerySelect, RelationTrait,
};
use std::fmt;

/// Row counts and completed-order revenue as stored in the database.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Rows in `Customers`
    pub customers: u64,
    /// Rows in `Products`
    pub products: u64,
    /// Rows in `Orders`
    pub orders: u64,
    /// Rows in `OrderItems`
    pub order_items: u64,
    /// Σ(quantity × `unit_price`) over lines of `Completed` orders
    pub completed_revenue: f64,
}

/// Runs the summary queries against `db`.
pub async fn summarize(db: &DatabaseConnection) -> Result<Summary> {
    Ok(Summary {
        customers: Customer::find().count(db).await?,
        products: Product::find().count(db).await?,
        orders: Order::find().count(db).await?,
        order_items: OrderItem::find().count(db).await?,
        completed_revenue: completed_revenue(db).await?,
    })
}

/// Revenue of `Completed` orders; zero when there are none.
pub async fn completed_revenue(db: &DatabaseConnection) -> Result<f64> {
    let line_total = Expr::col((OrderItem, order_item::Column::Quantity))
        .mul(Expr::col((OrderItem, order_item::Column::UnitPrice)));

    let revenue: Option<Option<f64>> = OrderItem::find()
        .select_only()
        .column_as(SimpleExpr::FunctionCall(Func::sum(line_total)), "revenue")
        .join(JoinType::InnerJoin, order_item::Relation::Order.def())
        .filter(order::Column::Status.eq(OrderStatus::Completed))
        .into_tuple()
        .one(db)
        .await?;

    Ok(revenue.flatten().unwrap_or(0.0))
}

/// Formats a count with thousands separators, e.g. `12,345`.
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a dollar amount with thousands separators and cents, e.g. `$1,234.50`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let whole = whole.parse::<u64>().map_or_else(|_| whole.to_string(), format_count);
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${whole}.{fraction}")
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database Summary:")?;
        writeln!(f, "  • Customers: {}", format_count(self.customers))?;
        writeln!(f, "  • Products: {}", format_count(self.products))?;
        writeln!(f, "  • Orders: {}", format_count(self.orders))?;
        writeln!(f, "  • Order Items: {}", format_count(self.order_items))?;
        write!(
            f,
            "  • Total Revenue (Completed): {}",
            format_currency(self.completed_revenue)
        )
    }
}
