pub mod inline_expression;
pub mod sharding_tables;

pub use sharding_tables::{fill_in_sharding_tables, DataNode};
