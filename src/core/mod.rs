/// CSV backups of generated collections
pub mod backup;
/// Value-invariant filters applied after generation
pub mod clean;
/// Seeded generation of customers, products, orders and order items
pub mod generate;
/// Dependency-ordered, batched database load
pub mod load;
/// Orchestration of a full run
pub mod pipeline;
/// Post-load row counts and revenue
pub mod report;
