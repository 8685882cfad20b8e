pub mod context;
pub mod entities;
pub mod progress;
pub mod services;
pub mod value_objects;

pub use context::{DumperConfiguration, ImporterConfiguration, JobContext, TaskConfiguration};
pub use entities::{
    DataSourceConfiguration, HandleConfiguration, JobConfiguration, RuleConfiguration,
    ShardingRuleConfiguration, SourceConfiguration, TableRuleConfiguration,
};
pub use progress::{
    IncrementalTaskProgress, InventoryPositionGroup, InventoryTaskGroupProgress, JobProgress,
};
pub use value_objects::{DatabaseType, JobStatus};
