/// Job configuration model
///
/// The configuration is stored as JSON under `/scaling/job/{jobId}/config`.
/// Optional fields are always written (as `null` when unset) so readers can
/// tell a null value from a missing field.
use crate::modules::jobs::domain::value_objects::DatabaseType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    pub rule_config: RuleConfiguration,
    #[serde(default)]
    pub handle_config: HandleConfiguration,
}

impl JobConfiguration {
    pub fn new(rule_config: RuleConfiguration) -> Self {
        Self {
            rule_config,
            handle_config: HandleConfiguration::default(),
        }
    }

    pub fn job_id(&self) -> Option<i64> {
        self.handle_config.job_id
    }

    pub fn is_running(&self) -> bool {
        self.handle_config.running
    }

    /// Whether expansion produced at least one sharding item
    pub fn should_scale(&self) -> bool {
        self.handle_config
            .sharding_tables
            .as_ref()
            .map(|tables| !tables.is_empty())
            .unwrap_or(false)
    }
}

/// Source topology and target endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfiguration {
    pub source: SourceConfiguration,
    pub target: DataSourceConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfiguration {
    pub data_sources: BTreeMap<String, DataSourceConfiguration>,
    pub sharding_rule: ShardingRuleConfiguration,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardingRuleConfiguration {
    #[serde(default)]
    pub tables: Vec<TableRuleConfiguration>,
    #[serde(default)]
    pub default_sharding_column: Option<String>,
}

impl ShardingRuleConfiguration {
    pub fn find_table_rule(&self, logic_table: &str) -> Option<&TableRuleConfiguration> {
        self.tables
            .iter()
            .find(|rule| rule.logic_table.eq_ignore_ascii_case(logic_table))
    }

    /// Sharding columns declared for a logic table, falling back to the default column
    pub fn sharding_columns(&self, logic_table: &str) -> BTreeSet<String> {
        let mut columns: BTreeSet<String> = self
            .find_table_rule(logic_table)
            .map(|rule| {
                rule.database_sharding_column
                    .iter()
                    .chain(rule.table_sharding_column.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if columns.is_empty() {
            columns.extend(self.default_sharding_column.iter().cloned());
        }
        columns
    }
}

/// One logic table and the actual nodes it is spread over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRuleConfiguration {
    pub logic_table: String,
    /// Inline expression such as `ds_${0..1}.t_order_${0..1}`
    pub actual_data_nodes: String,
    #[serde(default)]
    pub database_sharding_column: Option<String>,
    #[serde(default)]
    pub table_sharding_column: Option<String>,
}

impl TableRuleConfiguration {
    pub fn new(logic_table: impl Into<String>, actual_data_nodes: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes: actual_data_nodes.into(),
            database_sharding_column: None,
            table_sharding_column: None,
        }
    }

    pub fn with_database_sharding_column(mut self, column: impl Into<String>) -> Self {
        self.database_sharding_column = Some(column.into());
        self
    }

    pub fn with_table_sharding_column(mut self, column: impl Into<String>) -> Self {
        self.table_sharding_column = Some(column.into());
        self
    }
}

/// Connection settings for one PostgreSQL-compatible data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfiguration {
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl DataSourceConfiguration {
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password,
        }
    }

    /// URL with percent-encoded credentials, unless the URL already carries some
    pub fn connection_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        if rest.contains('@') || self.username.is_empty() {
            return self.url.clone();
        }
        let credentials = match &self.password {
            Some(password) => format!(
                "{}:{}",
                urlencoding::encode(&self.username),
                urlencoding::encode(password)
            ),
            None => urlencoding::encode(&self.username).into_owned(),
        };
        format!("{}://{}@{}", scheme, credentials, rest)
    }
}

/// Runtime handling of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandleConfiguration {
    pub job_id: Option<i64>,
    /// One entry per sharding item: comma-joined `dataSource.actualTable` nodes
    /// of a single source data source. `None` until expanded.
    pub sharding_tables: Option<Vec<String>>,
    pub running: bool,
    pub concurrency: u32,
    pub retry_times: u32,
    pub sharding_size: u64,
    pub database_type: DatabaseType,
}

impl Default for HandleConfiguration {
    fn default() -> Self {
        Self {
            job_id: None,
            sharding_tables: None,
            running: true,
            concurrency: 3,
            retry_times: 3,
            sharding_size: 10_000_000,
            database_type: DatabaseType::default(),
        }
    }
}
