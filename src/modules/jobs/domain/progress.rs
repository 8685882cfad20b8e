/// Progress model written by task runners and aggregated by the job service
///
/// Runners persist, per sharding item:
/// - `.../inventory`: an [`InventoryPositionGroup`]
/// - `.../incremental`: `{ streamId: { "delay": millis, ...cursor fields } }`
use crate::modules::jobs::domain::value_objects::JobStatus;
use crate::shared::errors::{ScalingError, ScalingResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

pub const DELAY: &str = "delay";
pub const POSITION: &str = "position";

/// Inventory units of one sharding item, split into finished and resumable ones.
///
/// A unit is in exactly one of the two sets; a finished unit never goes back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryPositionGroup {
    #[serde(default)]
    unfinished: BTreeMap<String, Value>,
    #[serde(default)]
    finished: BTreeSet<String>,
}

impl InventoryPositionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the value stored at `key`
    pub fn parse(key: &str, data: &str) -> ScalingResult<Self> {
        let group: Self =
            serde_json::from_str(data).map_err(|e| ScalingError::malformed(key, e))?;
        if let Some(unit) = group.unfinished.keys().find(|unit| group.finished.contains(*unit)) {
            return Err(ScalingError::malformed(
                key,
                format!("unit '{}' is both finished and unfinished", unit),
            ));
        }
        Ok(group)
    }

    pub fn to_json(&self) -> ScalingResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Record or advance the resumable position of an unfinished unit
    pub fn put_unfinished(&mut self, unit: impl Into<String>, position: Value) -> ScalingResult<()> {
        let unit = unit.into();
        if self.finished.contains(&unit) {
            return Err(ScalingError::InvalidConfiguration(format!(
                "Inventory unit '{}' is already finished",
                unit
            )));
        }
        self.unfinished.insert(unit, position);
        Ok(())
    }

    /// Move a unit to the finished set
    pub fn finish(&mut self, unit: impl Into<String>) {
        let unit = unit.into();
        self.unfinished.remove(&unit);
        self.finished.insert(unit);
    }

    pub fn unfinished(&self) -> &BTreeMap<String, Value> {
        &self.unfinished
    }

    pub fn finished(&self) -> &BTreeSet<String> {
        &self.finished
    }

    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    pub fn total_count(&self) -> usize {
        self.finished.len() + self.unfinished.len()
    }
}

/// Inventory counts of one sharding item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTaskGroupProgress {
    pub sharding_item: String,
    pub total: usize,
    pub finished: usize,
}

impl InventoryTaskGroupProgress {
    pub fn from_group(sharding_item: &str, group: &InventoryPositionGroup) -> Self {
        Self {
            sharding_item: sharding_item.to_string(),
            total: group.total_count(),
            finished: group.finished_count(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished == self.total
    }
}

/// One incremental stream of one sharding item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalTaskProgress {
    pub id: String,
    pub sharding_item: String,
    pub delay_millis: u64,
    pub position: Option<Value>,
}

impl IncrementalTaskProgress {
    /// Parse the value stored at `key`, one entry per stream.
    ///
    /// Any stream without a non-negative integer delay fails the whole read.
    pub fn parse_all(key: &str, sharding_item: &str, data: &str) -> ScalingResult<Vec<Self>> {
        let value: Value = serde_json::from_str(data).map_err(|e| ScalingError::malformed(key, e))?;
        let streams = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Object(streams) => streams,
            other => {
                return Err(ScalingError::malformed(
                    key,
                    format!("expected an object of streams, found {}", other),
                ))
            }
        };

        streams
            .into_iter()
            .map(|(stream_id, record)| Self::parse_stream(key, sharding_item, stream_id, record))
            .collect()
    }

    fn parse_stream(key: &str, sharding_item: &str, id: String, record: Value) -> ScalingResult<Self> {
        let Value::Object(mut record) = record else {
            return Err(ScalingError::malformed(
                key,
                format!("stream '{}' is not an object", id),
            ));
        };
        let delay = record.remove(DELAY).ok_or_else(|| {
            ScalingError::malformed(key, format!("stream '{}' has no {}", id, DELAY))
        })?;
        let delay_millis = delay.as_u64().ok_or_else(|| {
            ScalingError::malformed(
                key,
                format!("stream '{}' has invalid {} {}", id, DELAY, delay),
            )
        })?;
        let position = Self::remaining_position(record);

        Ok(Self {
            id,
            sharding_item: sharding_item.to_string(),
            delay_millis,
            position,
        })
    }

    /// A lone `position` field is unwrapped; any other cursor fields keep the whole record
    fn remaining_position(mut record: Map<String, Value>) -> Option<Value> {
        if record.len() == 1 {
            if let Some(position) = record.remove(POSITION) {
                return (!position.is_null()).then_some(position);
            }
        }
        (!record.is_empty()).then_some(Value::Object(record))
    }
}

/// Job-level progress snapshot, rebuilt on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub id: i64,
    pub status: JobStatus,
    pub inventory_task_progress: Vec<InventoryTaskGroupProgress>,
    pub incremental_task_progress: Vec<IncrementalTaskProgress>,
}

impl JobProgress {
    pub fn new(id: i64, status: JobStatus) -> Self {
        Self {
            id,
            status,
            inventory_task_progress: Vec::new(),
            incremental_task_progress: Vec::new(),
        }
    }

    /// (finished, total) inventory units over all sharding items
    pub fn inventory_totals(&self) -> (usize, usize) {
        self.inventory_task_progress
            .iter()
            .fold((0, 0), |(finished, total), group| {
                (finished + group.finished, total + group.total)
            })
    }

    /// Finished share of inventory work in percent; `None` before any item reported
    pub fn inventory_finished_percentage(&self) -> Option<u8> {
        let (finished, total) = self.inventory_totals();
        if self.inventory_task_progress.is_empty() {
            return None;
        }
        if total == 0 {
            return Some(100);
        }
        Some((finished * 100 / total) as u8)
    }

    /// True once at least one item reported and every reported item is done
    pub fn is_inventory_finished(&self) -> bool {
        !self.inventory_task_progress.is_empty()
            && self
                .inventory_task_progress
                .iter()
                .all(InventoryTaskGroupProgress::is_finished)
    }

    pub fn max_incremental_delay_millis(&self) -> Option<u64> {
        self.incremental_task_progress
            .iter()
            .map(|task| task.delay_millis)
            .max()
    }
}
