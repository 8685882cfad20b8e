/// Pre-flight checks gating job start
///
/// Architecture:
/// - Domain: the dialect-specific checker trait and the factory selecting one by dialect tag
/// - Infrastructure: scoped probe connections and the PostgreSQL checker
/// - Application: the fixed-order check run used by `start`
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use application::PreflightChecker;
pub use domain::{DataSourceChecker, DataSourceCheckerFactory};
pub use infrastructure::{DataSourceManager, DataSourceRole, ManagedDataSource, PostgreSQLDataSourceChecker};
