pub mod checker;
pub mod checker_factory;

pub use checker::{DataSourceChecker, ShardingColumns};
pub use checker_factory::DataSourceCheckerFactory;

#[cfg(test)]
pub use checker::MockDataSourceChecker;
