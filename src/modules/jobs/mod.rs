/// Scaling jobs: configuration, runtime context, progress and lifecycle
///
/// Architecture:
/// - Domain: configuration entities, shard-table expansion, job context, progress model
/// - Application: the job service exposing list/start/stop/get/progress/remove
pub mod application;
pub mod domain;

// Re-exports for easy access
pub use application::ScalingJobService;
pub use domain::{
    DataSourceConfiguration, DatabaseType, HandleConfiguration, IncrementalTaskProgress,
    InventoryPositionGroup, InventoryTaskGroupProgress, JobConfiguration, JobContext,
    JobProgress, JobStatus, RuleConfiguration, ShardingRuleConfiguration, SourceConfiguration,
    TableRuleConfiguration, TaskConfiguration,
};
