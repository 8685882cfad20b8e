/// Dialect-specific data source checks
///
/// Each method probes live connections and fails with
/// `ScalingError::PreflightCheckFailed` naming the offending data source.
/// Checks are read-only.
use crate::modules::preflight::infrastructure::ManagedDataSource;
use crate::shared::errors::ScalingResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

/// logic table -> sharding columns the target table must contain
pub type ShardingColumns = BTreeMap<String, BTreeSet<String>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSourceChecker: Send + Sync {
    /// Every data source is reachable
    async fn check_connection(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()>;

    /// Source credentials may read a consistent snapshot and the change stream
    async fn check_privilege(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()>;

    /// Source server settings allow change capture
    async fn check_variable(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()>;

    /// Target tables exist, carry every sharding column and hold no rows
    async fn check_target_table(
        &self,
        data_sources: &[ManagedDataSource],
        sharding_columns: &ShardingColumns,
    ) -> ScalingResult<()>;
}
