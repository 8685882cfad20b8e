pub mod modules;
pub mod shared;

pub use modules::jobs::{
    JobConfiguration, JobContext, JobProgress, JobStatus, ScalingJobService,
};
pub use modules::preflight::{DataSourceChecker, DataSourceCheckerFactory, PreflightChecker};
pub use modules::registry::{ConsulRegistryRepository, InMemoryRegistryRepository, RegistryRepository};
pub use shared::errors::{PreflightCheck, ScalingError, ScalingResult};
pub use shared::infrastructure::ScalingConfig;
pub use shared::utils::init_logger;
