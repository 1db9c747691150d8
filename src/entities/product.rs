//! Product entity - an item in the catalogue with a cost and a marked-up price.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalogue category a product is listed under.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Category {
    #[sea_orm(string_value = "Electronics")]
    Electronics,
    #[sea_orm(string_value = "Furniture")]
    Furniture,
    #[sea_orm(string_value = "Accessories")]
    Accessories,
    #[sea_orm(string_value = "Clothing")]
    Clothing,
    #[sea_orm(string_value = "Books")]
    Books,
    #[sea_orm(string_value = "Home & Garden")]
    #[serde(rename = "Home & Garden")]
    HomeAndGarden,
}

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Products")]
pub struct Model {
    /// Generator-assigned identifier, sequential from 1
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Display name, e.g. "Harbor Lantern Pro"
    pub name: String,
    /// Catalogue category
    pub category: Category,
    /// What the product costs the shop, in dollars
    pub cost: f64,
    /// Selling price in dollars, always at least `cost`
    pub price: f64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears on many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
