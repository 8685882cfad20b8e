//! Registry key layout for scaling jobs.
//!
//! ```text
//! /scaling/job/{jobId}/config
//! /scaling/job/{jobId}/position/{shardingItem}/inventory
//! /scaling/job/{jobId}/position/{shardingItem}/incremental
//! ```

pub const SCALING_ROOT: &str = "/scaling/job";
pub const CONFIG: &str = "config";
pub const POSITION: &str = "position";
pub const INVENTORY: &str = "inventory";
pub const INCREMENTAL: &str = "incremental";

/// Join a job id and path segments under the scaling root
pub fn job_path(job_id: i64, segments: &[&str]) -> String {
    let mut path = format!("{}/{}", SCALING_ROOT, job_id);
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path
}

pub fn job_root(job_id: i64) -> String {
    job_path(job_id, &[])
}

pub fn config_key(job_id: i64) -> String {
    job_path(job_id, &[CONFIG])
}

pub fn position_root(job_id: i64) -> String {
    job_path(job_id, &[POSITION])
}

pub fn inventory_key(job_id: i64, sharding_item: &str) -> String {
    job_path(job_id, &[POSITION, sharding_item, INVENTORY])
}

pub fn incremental_key(job_id: i64, sharding_item: &str) -> String {
    job_path(job_id, &[POSITION, sharding_item, INCREMENTAL])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(job_root(42), "/scaling/job/42");
        assert_eq!(config_key(42), "/scaling/job/42/config");
        assert_eq!(position_root(42), "/scaling/job/42/position");
        assert_eq!(inventory_key(42, "0"), "/scaling/job/42/position/0/inventory");
        assert_eq!(
            incremental_key(42, "1"),
            "/scaling/job/42/position/1/incremental"
        );
    }

    #[test]
    fn test_negative_ids_stay_decimal() {
        assert_eq!(config_key(-7), "/scaling/job/-7/config");
    }
}
