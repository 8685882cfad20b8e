pub mod data_source_manager;
pub mod postgres_checker;

pub use data_source_manager::{DataSourceManager, DataSourceRole, ManagedDataSource};
pub use postgres_checker::PostgreSQLDataSourceChecker;
