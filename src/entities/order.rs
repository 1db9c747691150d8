//! Order entity - a purchase placed by a customer.
//!
//! Only orders with status `Completed` count towards revenue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderStatus {
    /// Paid and fulfilled
    #[sea_orm(string_value = "Completed")]
    Completed,
    /// Placed but not yet fulfilled
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Abandoned or refunded
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Orders")]
pub struct Model {
    /// Sequential order number starting at 1
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// ID of the customer who placed the order
    pub customer_id: i64,
    /// Current status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTime,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
