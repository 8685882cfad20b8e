use crate::modules::jobs::domain::context::JobContext;
use crate::modules::preflight::domain::{DataSourceChecker, DataSourceCheckerFactory};
use crate::modules::preflight::infrastructure::DataSourceManager;
use crate::shared::errors::ScalingResult;
use crate::shared::infrastructure::database::PoolSettings;
use crate::shared::utils::{LogContext, TimedOperation};
use crate::{log_info, log_warn};
use std::sync::Arc;

/// Runs the four data source checks for a job in fixed order:
/// connection (all), privilege (sources), variable (sources), target table (target).
///
/// Probe connections live only for the duration of `check` and are released
/// whatever the outcome.
pub struct PreflightChecker {
    factory: Arc<DataSourceCheckerFactory>,
    pool_settings: PoolSettings,
}

impl PreflightChecker {
    pub fn new(factory: Arc<DataSourceCheckerFactory>, pool_settings: PoolSettings) -> Self {
        Self {
            factory,
            pool_settings,
        }
    }

    pub async fn check(&self, job_context: &JobContext) -> ScalingResult<()> {
        let checker = self.factory.new_instance(job_context.database_type())?;
        let manager = DataSourceManager::new(job_context, &self.pool_settings)?;
        let timer = TimedOperation::new(&format!("pre-flight check of job {}", job_context.job_id()));

        let result = Self::run_checks(checker.as_ref(), &manager, job_context).await;
        manager.close();

        match &result {
            Ok(()) => {
                timer.finish_with_info("passed");
                log_info!("Pre-flight checks passed for job {}", job_context.job_id());
            }
            Err(e) => {
                timer.finish_with_info("failed");
                log_warn!("Pre-flight checks failed for job {}: {}", job_context.job_id(), e);
            }
        }
        result
    }

    async fn run_checks(
        checker: &dyn DataSourceChecker,
        manager: &DataSourceManager,
        job_context: &JobContext,
    ) -> ScalingResult<()> {
        let job_id = job_context.job_id();
        let all = manager.all_data_sources();
        let sources = manager.source_data_sources();
        let targets = manager.target_data_sources();

        LogContext::preflight_step(job_id, "connection", all.len());
        checker.check_connection(&all).await?;

        LogContext::preflight_step(job_id, "privilege", sources.len());
        checker.check_privilege(&sources).await?;

        LogContext::preflight_step(job_id, "variable", sources.len());
        checker.check_variable(&sources).await?;

        LogContext::preflight_step(job_id, "target table", targets.len());
        checker
            .check_target_table(&targets, &job_context.required_sharding_columns())
            .await
    }
}
