/// Shard-table expansion
///
/// Turns the source sharding rule into the `shardingTables` list of a job: one
/// entry per source data source, each a comma-joined list of
/// `dataSource.actualTable` nodes.
use crate::modules::jobs::domain::entities::{JobConfiguration, SourceConfiguration};
use crate::modules::jobs::domain::services::inline_expression;
use crate::shared::errors::{ScalingError, ScalingResult};
use std::collections::BTreeMap;

/// A physical table on one data source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataNode {
    pub data_source: String,
    pub table: String,
}

impl DataNode {
    pub fn parse(node: &str) -> ScalingResult<Self> {
        match node.trim().split_once('.') {
            Some((data_source, table)) if !data_source.is_empty() && !table.is_empty() => {
                Ok(Self {
                    data_source: data_source.to_string(),
                    table: table.to_string(),
                })
            }
            _ => Err(ScalingError::InvalidConfiguration(format!(
                "Data node '{}' must be written as dataSource.table",
                node
            ))),
        }
    }
}

impl std::fmt::Display for DataNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

/// Every actual node of the source rule mapped to its logic table
pub fn actual_data_nodes(source: &SourceConfiguration) -> ScalingResult<BTreeMap<DataNode, String>> {
    let mut nodes = BTreeMap::new();
    for rule in &source.sharding_rule.tables {
        for expanded in inline_expression::expand(&rule.actual_data_nodes)? {
            let node = DataNode::parse(&expanded)?;
            if !source.data_sources.contains_key(&node.data_source) {
                return Err(ScalingError::InvalidConfiguration(format!(
                    "Data node '{}' of logic table '{}' refers to unknown data source",
                    node, rule.logic_table
                )));
            }
            nodes.insert(node, rule.logic_table.clone());
        }
    }
    Ok(nodes)
}

/// Group nodes by data source, one comma-joined entry per data source
pub fn group_by_data_source<'a>(nodes: impl IntoIterator<Item = &'a DataNode>) -> Vec<String> {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for node in nodes {
        grouped
            .entry(node.data_source.as_str())
            .or_default()
            .push(node.to_string());
    }
    grouped.into_values().map(|group| group.join(",")).collect()
}

/// Fill in `shardingTables` from the source rule unless it is already set
pub fn fill_in_sharding_tables(job_config: &mut JobConfiguration) -> ScalingResult<()> {
    if job_config.handle_config.sharding_tables.is_some() {
        return Ok(());
    }
    let nodes = actual_data_nodes(&job_config.rule_config.source)?;
    let sharding_tables = group_by_data_source(nodes.keys());
    log::debug!(
        "Expanded {} data node(s) into {} sharding item(s)",
        nodes.len(),
        sharding_tables.len()
    );
    job_config.handle_config.sharding_tables = Some(sharding_tables);
    Ok(())
}
