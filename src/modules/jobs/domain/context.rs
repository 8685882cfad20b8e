/// Runtime handle of one scaling job
///
/// Built fresh from a `JobConfiguration` on every lookup; it is never cached or
/// shared between operations.
use crate::modules::jobs::domain::entities::{DataSourceConfiguration, JobConfiguration};
use crate::modules::jobs::domain::services::sharding_tables::{actual_data_nodes, DataNode};
use crate::modules::jobs::domain::value_objects::DatabaseType;
use crate::shared::errors::{ScalingError, ScalingResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// What the inventory/incremental dumper reads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumperConfiguration {
    pub data_source_name: String,
    pub data_source: DataSourceConfiguration,
    /// actual table -> logic table
    pub table_name_map: BTreeMap<String, String>,
}

/// Where the importer writes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImporterConfiguration {
    pub data_source: DataSourceConfiguration,
    /// logic table -> sharding columns the target must have
    pub sharding_columns_map: BTreeMap<String, BTreeSet<String>>,
    pub retry_times: u32,
}

/// Work description for one sharding item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfiguration {
    pub sharding_item: usize,
    pub concurrency: u32,
    pub sharding_size: u64,
    pub dumper_config: DumperConfiguration,
    pub importer_config: ImporterConfiguration,
}

#[derive(Debug, Clone)]
pub struct JobContext {
    job_id: i64,
    job_config: JobConfiguration,
    task_configs: Vec<TaskConfiguration>,
}

impl JobContext {
    /// Derive per-item task configurations. The job id must already be assigned.
    pub fn new(job_config: JobConfiguration) -> ScalingResult<Self> {
        let job_id = job_config.job_id().ok_or_else(|| {
            ScalingError::InvalidConfiguration("Job id has not been assigned".to_string())
        })?;
        let task_configs = Self::to_task_configs(&job_config)?;
        Ok(Self {
            job_id,
            job_config,
            task_configs,
        })
    }

    pub fn job_id(&self) -> i64 {
        self.job_id
    }

    pub fn job_config(&self) -> &JobConfiguration {
        &self.job_config
    }

    pub fn into_job_config(self) -> JobConfiguration {
        self.job_config
    }

    pub fn task_configs(&self) -> &[TaskConfiguration] {
        &self.task_configs
    }

    pub fn database_type(&self) -> DatabaseType {
        self.job_config.handle_config.database_type
    }

    pub fn is_running(&self) -> bool {
        self.job_config.is_running()
    }

    /// Source data sources touched by at least one task, by name
    pub fn source_data_sources(&self) -> BTreeMap<String, DataSourceConfiguration> {
        self.task_configs
            .iter()
            .map(|task| {
                (
                    task.dumper_config.data_source_name.clone(),
                    task.dumper_config.data_source.clone(),
                )
            })
            .collect()
    }

    pub fn target_data_source(&self) -> &DataSourceConfiguration {
        &self.job_config.rule_config.target
    }

    /// Union of every task's logic table -> sharding columns map
    pub fn required_sharding_columns(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut required: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for task in &self.task_configs {
            for (logic_table, columns) in &task.importer_config.sharding_columns_map {
                required
                    .entry(logic_table.clone())
                    .or_default()
                    .extend(columns.iter().cloned());
            }
        }
        required
    }

    fn to_task_configs(job_config: &JobConfiguration) -> ScalingResult<Vec<TaskConfiguration>> {
        let Some(sharding_tables) = &job_config.handle_config.sharding_tables else {
            return Ok(Vec::new());
        };
        if sharding_tables.is_empty() {
            return Ok(Vec::new());
        }

        let source = &job_config.rule_config.source;
        let logic_tables = actual_data_nodes(source)?;
        let handle = &job_config.handle_config;

        sharding_tables
            .iter()
            .enumerate()
            .map(|(sharding_item, entry)| {
                let nodes = entry
                    .split(',')
                    .filter(|node| !node.trim().is_empty())
                    .map(DataNode::parse)
                    .collect::<ScalingResult<Vec<_>>>()?;

                let data_source_name = match nodes.first() {
                    Some(first) => first.data_source.clone(),
                    None => {
                        return Err(ScalingError::InvalidConfiguration(format!(
                            "Sharding item {} has no tables",
                            sharding_item
                        )))
                    }
                };
                if let Some(other) = nodes.iter().find(|n| n.data_source != data_source_name) {
                    return Err(ScalingError::InvalidConfiguration(format!(
                        "Sharding item {} mixes data sources '{}' and '{}'",
                        sharding_item, data_source_name, other.data_source
                    )));
                }
                let data_source = source.data_sources.get(&data_source_name).cloned().ok_or_else(|| {
                    ScalingError::InvalidConfiguration(format!(
                        "Unknown source data source '{}'",
                        data_source_name
                    ))
                })?;

                let mut table_name_map = BTreeMap::new();
                let mut sharding_columns_map = BTreeMap::new();
                for node in &nodes {
                    let logic_table = logic_tables.get(node).ok_or_else(|| {
                        ScalingError::InvalidConfiguration(format!(
                            "Data node '{}' is not covered by any sharding rule",
                            node
                        ))
                    })?;
                    table_name_map.insert(node.table.clone(), logic_table.clone());
                    sharding_columns_map
                        .entry(logic_table.clone())
                        .or_insert_with(|| source.sharding_rule.sharding_columns(logic_table));
                }

                Ok(TaskConfiguration {
                    sharding_item,
                    concurrency: handle.concurrency,
                    sharding_size: handle.sharding_size,
                    dumper_config: DumperConfiguration {
                        data_source_name,
                        data_source,
                        table_name_map,
                    },
                    importer_config: ImporterConfiguration {
                        data_source: job_config.rule_config.target.clone(),
                        sharding_columns_map,
                        retry_times: handle.retry_times,
                    },
                })
            })
            .collect()
    }
}
