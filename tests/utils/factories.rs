/// Test data factories using builder pattern
///
/// Provides convenient methods to create job configurations with sensible defaults
use scaling_lib::modules::jobs::domain::{
    DataSourceConfiguration, JobConfiguration, RuleConfiguration, ShardingRuleConfiguration,
    SourceConfiguration, TableRuleConfiguration,
};

pub struct JobConfigFactory {
    job_id: Option<i64>,
    sharding_tables: Option<Vec<String>>,
    tables: Vec<TableRuleConfiguration>,
    data_sources: Vec<String>,
    running: bool,
}

impl Default for JobConfigFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl JobConfigFactory {
    /// `t_order` spread over `ds_0.t_order_${0..1}`, sharded by `order_id`
    pub fn new() -> Self {
        Self {
            job_id: None,
            sharding_tables: None,
            tables: vec![TableRuleConfiguration::new("t_order", "ds_0.t_order_${0..1}")
                .with_table_sharding_column("order_id")],
            data_sources: vec!["ds_0".to_string()],
            running: true,
        }
    }

    pub fn job_id(mut self, job_id: i64) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn sharding_tables(mut self, tables: &[&str]) -> Self {
        self.sharding_tables = Some(tables.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn table_rules(mut self, tables: Vec<TableRuleConfiguration>) -> Self {
        self.tables = tables;
        self
    }

    pub fn data_sources(mut self, names: &[&str]) -> Self {
        self.data_sources = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    pub fn build(self) -> JobConfiguration {
        let data_sources = self
            .data_sources
            .iter()
            .map(|name| (name.clone(), data_source(name)))
            .collect();

        let mut config = JobConfiguration::new(RuleConfiguration {
            source: SourceConfiguration {
                data_sources,
                sharding_rule: ShardingRuleConfiguration {
                    tables: self.tables,
                    default_sharding_column: None,
                },
            },
            target: data_source("scaling_target"),
        });
        config.handle_config.job_id = self.job_id;
        config.handle_config.sharding_tables = self.sharding_tables;
        config.handle_config.running = self.running;
        config
    }
}

/// Points at a closed port; probes only ever go through fake checkers
pub fn data_source(database: &str) -> DataSourceConfiguration {
    DataSourceConfiguration::new(
        format!("postgres://127.0.0.1:1/{}", database),
        "scaler",
        Some("secret".to_string()),
    )
}
