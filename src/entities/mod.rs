//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities are both the generated in-memory records and the rows
//! persisted to the `Customers`, `Products`, `Orders` and `OrderItems` tables.

pub mod customer;
pub mod order;
pub mod order_item;
pub mod product;

// Re-export specific types to avoid conflicts
pub use customer::{Entity as Customer, Model as CustomerModel, Region};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use product::{Category, Entity as Product, Model as ProductModel};
