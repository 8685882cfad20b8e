/// Scaling job lifecycle: list, start, stop, inspect, remove
///
/// The registry is the only state. Nothing is cached between calls, so every
/// operation observes what task runners and other coordinators last wrote.
use crate::modules::jobs::domain::context::JobContext;
use crate::modules::jobs::domain::entities::JobConfiguration;
use crate::modules::jobs::domain::progress::{
    IncrementalTaskProgress, InventoryPositionGroup, InventoryTaskGroupProgress, JobProgress,
};
use crate::modules::jobs::domain::services::fill_in_sharding_tables;
use crate::modules::jobs::domain::value_objects::JobStatus;
use crate::modules::preflight::{DataSourceCheckerFactory, PreflightChecker};
use crate::modules::registry::domain::paths;
use crate::modules::registry::{
    ConsulRegistryRepository, InMemoryRegistryRepository, RegistryRepository,
};
use crate::shared::errors::{ScalingError, ScalingResult};
use crate::shared::infrastructure::{RegistryKind, ScalingConfig};
use crate::{log_debug, log_info};
use std::sync::Arc;

pub struct ScalingJobService {
    registry: Arc<dyn RegistryRepository>,
    preflight_checker: PreflightChecker,
}

impl ScalingJobService {
    pub fn new(registry: Arc<dyn RegistryRepository>, preflight_checker: PreflightChecker) -> Self {
        Self {
            registry,
            preflight_checker,
        }
    }

    /// Wire the registry selected by configuration and the default dialect checkers
    pub fn from_config(config: &ScalingConfig) -> ScalingResult<Self> {
        let registry: Arc<dyn RegistryRepository> = match config.registry.kind {
            RegistryKind::Memory => Arc::new(InMemoryRegistryRepository::new()),
            RegistryKind::Consul => Arc::new(ConsulRegistryRepository::from_config(&config.registry)?),
        };
        let preflight_checker = PreflightChecker::new(
            Arc::new(DataSourceCheckerFactory::with_default_checkers()),
            config.check_pool.clone(),
        );
        log_info!("Scaling job service using {:?} registry", config.registry.kind);
        Ok(Self::new(registry, preflight_checker))
    }

    /// One context per job id found under the job namespace, in registry order
    pub async fn list_jobs(&self) -> ScalingResult<Vec<JobContext>> {
        let children = self.registry.get_children_keys(paths::SCALING_ROOT).await?;
        let job_ids = children
            .iter()
            .map(|child| {
                child.parse::<i64>().map_err(|e| {
                    ScalingError::malformed(format!("{}/{}", paths::SCALING_ROOT, child), e)
                })
            })
            .collect::<ScalingResult<Vec<_>>>()?;

        futures::future::try_join_all(job_ids.into_iter().map(|job_id| self.get_job(job_id))).await
    }

    /// Expand, check and persist a job.
    ///
    /// Returns `None` without touching the registry when there is nothing to
    /// scale. A failed pre-flight check leaves the registry untouched.
    pub async fn start(&self, mut job_config: JobConfiguration) -> ScalingResult<Option<JobContext>> {
        fill_in_sharding_tables(&mut job_config)?;
        if !job_config.should_scale() {
            log_info!("No sharding tables to scale, no job created");
            return Ok(None);
        }

        if job_config.handle_config.job_id.is_none() {
            job_config.handle_config.job_id = Some(chrono::Utc::now().timestamp_millis());
        }
        job_config.handle_config.running = true;

        let job_context = JobContext::new(job_config)?;
        self.preflight_checker.check(&job_context).await?;
        self.update_job_config(job_context.job_id(), job_context.job_config())
            .await?;

        log_info!("start scaling job {}", job_context.job_id());
        Ok(Some(job_context))
    }

    /// Mark a job as not running. Stopping a stopped job rewrites the same state.
    pub async fn stop(&self, job_id: i64) -> ScalingResult<()> {
        let mut job_config = self.get_job(job_id).await?.into_job_config();
        job_config.handle_config.running = false;
        self.update_job_config(job_id, &job_config).await?;
        log_info!("stop scaling job {}", job_id);
        Ok(())
    }

    /// Serialize `job_config` (nulls included) to the job's config key
    pub async fn update_job_config(&self, job_id: i64, job_config: &JobConfiguration) -> ScalingResult<()> {
        let data = serde_json::to_string(job_config)?;
        self.registry.persist(&paths::config_key(job_id), &data).await
    }

    /// Read a job's configuration; the registry path's job id always wins over the stored one
    pub async fn get_job(&self, job_id: i64) -> ScalingResult<JobContext> {
        let key = paths::config_key(job_id);
        let data = match self.registry.get(&key).await? {
            Some(data) if !data.trim().is_empty() => data,
            _ => return Err(ScalingError::JobNotFound(job_id)),
        };

        let mut job_config: JobConfiguration =
            serde_json::from_str(&data).map_err(|e| ScalingError::malformed(&key, e))?;
        if job_config.handle_config.job_id != Some(job_id) {
            log_debug!(
                "Stamping job id {} over stored id {:?}",
                job_id,
                job_config.handle_config.job_id
            );
        }
        job_config.handle_config.job_id = Some(job_id);

        JobContext::new(job_config).map_err(|e| match e {
            ScalingError::InvalidConfiguration(reason) => ScalingError::malformed(&key, reason),
            other => other,
        })
    }

    /// Aggregate every sharding item's reported positions into one snapshot
    pub async fn get_progress(&self, job_id: i64) -> ScalingResult<JobProgress> {
        let running = self.get_job(job_id).await?.is_running();
        let mut result = JobProgress::new(job_id, JobStatus::from_running(running));

        let sharding_items = self
            .registry
            .get_children_keys(&paths::position_root(job_id))
            .await?;
        for sharding_item in &sharding_items {
            if let Some(inventory) = self.get_inventory_task_progress(job_id, sharding_item).await? {
                result.inventory_task_progress.push(inventory);
            }
            result
                .incremental_task_progress
                .extend(self.get_incremental_task_progress(job_id, sharding_item).await?);
        }
        Ok(result)
    }

    /// Delete the job's whole subtree. Does not require the job to be stopped.
    pub async fn remove(&self, job_id: i64) -> ScalingResult<()> {
        self.registry.delete(&paths::job_root(job_id)).await?;
        log_info!("remove scaling job {}", job_id);
        Ok(())
    }

    async fn read_present(&self, key: &str) -> ScalingResult<Option<String>> {
        Ok(self
            .registry
            .get(key)
            .await?
            .filter(|data| !data.trim().is_empty()))
    }

    async fn get_inventory_task_progress(
        &self,
        job_id: i64,
        sharding_item: &str,
    ) -> ScalingResult<Option<InventoryTaskGroupProgress>> {
        let key = paths::inventory_key(job_id, sharding_item);
        let Some(data) = self.read_present(&key).await? else {
            return Ok(None);
        };
        if data.trim() == "null" {
            return Ok(None);
        }
        let group = InventoryPositionGroup::parse(&key, &data)?;
        Ok(Some(InventoryTaskGroupProgress::from_group(sharding_item, &group)))
    }

    async fn get_incremental_task_progress(
        &self,
        job_id: i64,
        sharding_item: &str,
    ) -> ScalingResult<Vec<IncrementalTaskProgress>> {
        let key = paths::incremental_key(job_id, sharding_item);
        match self.read_present(&key).await? {
            Some(data) => IncrementalTaskProgress::parse_all(&key, sharding_item, &data),
            None => Ok(Vec::new()),
        }
    }
}
