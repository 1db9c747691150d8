//! Order item entity - one product line on an order.
//!
//! The `(order_id, product_id)` pair is the primary key, so a product can
//! appear at most once per order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "OrderItems")]
pub struct Model {
    /// ID of the order this line belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: i64,
    /// ID of the product being bought
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
    /// Units bought, 1 to 5
    pub quantity: i32,
    /// Product price at the time the order was generated
    pub unit_price: f64,
}

impl Model {
    /// Revenue contributed by this line.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
