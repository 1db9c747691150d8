//! Customer entity - a shopper who places orders.
//!
//! Ids are assigned by the generator rather than the database so that orders
//! can reference them before anything is persisted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales region a customer signed up from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Region {
    #[sea_orm(string_value = "North America")]
    #[serde(rename = "North America")]
    NorthAmerica,
    #[sea_orm(string_value = "Europe")]
    Europe,
    #[sea_orm(string_value = "Asia")]
    Asia,
    #[sea_orm(string_value = "Latin America")]
    #[serde(rename = "Latin America")]
    LatinAmerica,
    #[sea_orm(string_value = "Africa")]
    Africa,
    #[sea_orm(string_value = "Oceania")]
    Oceania,
}

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Customers")]
pub struct Model {
    /// Generator-assigned identifier, sequential from 1
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact email, unique within a generated dataset
    #[sea_orm(unique)]
    pub email: String,
    /// Region the customer belongs to
    pub region: Region,
    /// Day the customer signed up
    pub signup_date: Date,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer places many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
