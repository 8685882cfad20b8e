/// Probe connections scoped to one pre-flight run
///
/// Pools are created without connecting; connections are opened by the
/// checks themselves and all of them are closed when the manager is closed
/// or dropped.
use crate::modules::jobs::domain::context::JobContext;
use crate::modules::jobs::domain::entities::DataSourceConfiguration;
use crate::shared::errors::{PreflightCheck, ScalingError, ScalingResult};
use crate::shared::infrastructure::database::{build_lazy_pool, DbConnection, DbPool, PoolSettings};
use std::collections::BTreeMap;

pub const TARGET_DATA_SOURCE_NAME: &str = "target";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceRole {
    Source,
    Target,
}

/// A named data source with its probe pool
#[derive(Debug, Clone)]
pub struct ManagedDataSource {
    name: String,
    role: DataSourceRole,
    pool: DbPool,
}

impl ManagedDataSource {
    fn open(
        name: &str,
        role: DataSourceRole,
        config: &DataSourceConfiguration,
        settings: &PoolSettings,
    ) -> ScalingResult<Self> {
        let pool = build_lazy_pool(&config.connection_url(), settings)
            .map_err(|e| ScalingError::preflight(PreflightCheck::Connection, name, e))?;
        Ok(Self {
            name: name.to_string(),
            role,
            pool,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> DataSourceRole {
        self.role
    }

    /// Check out a connection, attributing failures to `check`
    pub fn connection(&self, check: PreflightCheck) -> ScalingResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| ScalingError::preflight(check, &self.name, e))
    }
}

pub struct DataSourceManager {
    sources: BTreeMap<String, ManagedDataSource>,
    target: ManagedDataSource,
}

impl DataSourceManager {
    pub fn new(job_context: &JobContext, settings: &PoolSettings) -> ScalingResult<Self> {
        let sources = job_context
            .source_data_sources()
            .iter()
            .map(|(name, config)| {
                ManagedDataSource::open(name, DataSourceRole::Source, config, settings)
                    .map(|ds| (name.clone(), ds))
            })
            .collect::<ScalingResult<BTreeMap<_, _>>>()?;
        let target = ManagedDataSource::open(
            TARGET_DATA_SOURCE_NAME,
            DataSourceRole::Target,
            job_context.target_data_source(),
            settings,
        )?;

        log::debug!(
            "Data source manager for job {} opened {} source(s) and the target",
            job_context.job_id(),
            sources.len()
        );
        Ok(Self { sources, target })
    }

    pub fn source_data_sources(&self) -> Vec<ManagedDataSource> {
        self.sources.values().cloned().collect()
    }

    pub fn target_data_sources(&self) -> Vec<ManagedDataSource> {
        vec![self.target.clone()]
    }

    /// Sources followed by the target
    pub fn all_data_sources(&self) -> Vec<ManagedDataSource> {
        let mut all = self.source_data_sources();
        all.push(self.target.clone());
        all
    }

    /// Release every probe pool
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for DataSourceManager {
    fn drop(&mut self) {
        log::debug!(
            "Releasing probe pools for {} data source(s)",
            self.sources.len() + 1
        );
    }
}
