mod utils;

use scaling_lib::modules::jobs::TableRuleConfiguration;
use scaling_lib::modules::registry::{paths, RegistryRepository};
use scaling_lib::shared::errors::{PreflightCheck, ScalingError};
use serde_json::Value;
use std::sync::Arc;
use utils::factories::JobConfigFactory;
use utils::helpers::{build_service, build_test_services, FakeChecker, UnavailableRegistry};

#[tokio::test]
async fn test_start_persists_running_job() {
    let ctx = build_test_services(FakeChecker::passing());
    let config = JobConfigFactory::new().job_id(42).build();

    let job = ctx
        .service
        .start(config)
        .await
        .unwrap()
        .expect("job should be created");

    assert_eq!(job.job_id(), 42);
    assert_eq!(
        job.job_config().handle_config.sharding_tables,
        Some(vec!["ds_0.t_order_0,ds_0.t_order_1".to_string()])
    );
    assert_eq!(job.task_configs().len(), 1);

    let stored = ctx.service.get_job(42).await.unwrap();
    assert!(stored.is_running());
    assert_eq!(stored.job_config(), job.job_config());
}

#[tokio::test]
async fn test_start_runs_checks_in_order_on_expected_data_sources() {
    let ctx = build_test_services(FakeChecker::passing());

    ctx.service
        .start(JobConfigFactory::new().job_id(42).build())
        .await
        .unwrap();

    let calls = ctx.checker.calls();
    assert_eq!(
        calls,
        vec![
            (
                PreflightCheck::Connection,
                vec!["ds_0".to_string(), "target".to_string()]
            ),
            (PreflightCheck::Privilege, vec!["ds_0".to_string()]),
            (PreflightCheck::Variable, vec!["ds_0".to_string()]),
            (PreflightCheck::TargetTable, vec!["target".to_string()]),
        ]
    );
}

#[tokio::test]
async fn test_start_assigns_job_id_when_missing() {
    let ctx = build_test_services(FakeChecker::passing());

    let job = ctx
        .service
        .start(JobConfigFactory::new().build())
        .await
        .unwrap()
        .expect("job should be created");

    assert!(job.job_id() > 0);
    assert_eq!(job.job_config().job_id(), Some(job.job_id()));
    assert!(ctx.service.get_job(job.job_id()).await.unwrap().is_running());
}

#[tokio::test]
async fn test_start_forces_running_on_stopped_config() {
    let ctx = build_test_services(FakeChecker::passing());

    ctx.service
        .start(JobConfigFactory::new().job_id(42).running(false).build())
        .await
        .unwrap();

    assert!(ctx.service.get_job(42).await.unwrap().is_running());
}

#[tokio::test]
async fn test_start_with_empty_sharding_tables_is_noop() {
    let ctx = build_test_services(FakeChecker::passing());
    let config = JobConfigFactory::new().job_id(42).sharding_tables(&[]).build();

    let result = ctx.service.start(config).await.unwrap();

    assert!(result.is_none());
    assert!(ctx.registry.is_empty().await);
    assert!(ctx.checker.calls().is_empty());
}

#[tokio::test]
async fn test_start_without_table_rules_is_noop() {
    let ctx = build_test_services(FakeChecker::passing());
    let config = JobConfigFactory::new()
        .job_id(42)
        .table_rules(Vec::new())
        .build();

    let result = ctx.service.start(config).await.unwrap();

    assert!(result.is_none());
    assert_eq!(
        ctx.registry.get(&paths::config_key(42)).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_failed_check_persists_nothing() {
    let checks = [
        PreflightCheck::Connection,
        PreflightCheck::Privilege,
        PreflightCheck::Variable,
        PreflightCheck::TargetTable,
    ];

    for (position, check) in checks.iter().enumerate() {
        let ctx = build_test_services(FakeChecker::failing_on(*check));

        let error = ctx
            .service
            .start(JobConfigFactory::new().job_id(42).build())
            .await
            .unwrap_err();

        assert_eq!(error.failed_check(), Some(*check), "failing {}", check);
        assert_eq!(
            ctx.registry.get(&paths::config_key(42)).await.unwrap(),
            None,
            "config written after failed {} check",
            check
        );
        assert!(ctx.registry.is_empty().await);
        // later checks never run
        assert_eq!(ctx.checker.checks(), checks[..=position].to_vec());
    }
}

#[tokio::test]
async fn test_start_across_data_sources_creates_one_item_per_source() {
    let ctx = build_test_services(FakeChecker::passing());
    let config = JobConfigFactory::new()
        .job_id(7)
        .data_sources(&["ds_0", "ds_1"])
        .table_rules(vec![
            TableRuleConfiguration::new("t_order", "ds_${0..1}.t_order_${0..1}")
                .with_database_sharding_column("user_id")
                .with_table_sharding_column("order_id"),
        ])
        .build();

    let job = ctx.service.start(config).await.unwrap().unwrap();

    assert_eq!(
        job.job_config().handle_config.sharding_tables,
        Some(vec![
            "ds_0.t_order_0,ds_0.t_order_1".to_string(),
            "ds_1.t_order_0,ds_1.t_order_1".to_string(),
        ])
    );
    assert_eq!(job.task_configs().len(), 2);
    assert_eq!(
        ctx.checker.calls()[1],
        (
            PreflightCheck::Privilege,
            vec!["ds_0".to_string(), "ds_1".to_string()]
        )
    );
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let ctx = build_test_services(FakeChecker::passing());
    ctx.service
        .start(JobConfigFactory::new().job_id(42).build())
        .await
        .unwrap();

    ctx.service.stop(42).await.unwrap();
    assert!(!ctx.service.get_job(42).await.unwrap().is_running());

    ctx.service.stop(42).await.unwrap();
    assert!(!ctx.service.get_job(42).await.unwrap().is_running());
}

#[tokio::test]
async fn test_concurrent_stops_agree() {
    let ctx = build_test_services(FakeChecker::passing());
    ctx.service
        .start(JobConfigFactory::new().job_id(42).build())
        .await
        .unwrap();

    let (first, second) = tokio::join!(ctx.service.stop(42), ctx.service.stop(42));
    first.unwrap();
    second.unwrap();

    assert!(!ctx.service.get_job(42).await.unwrap().is_running());
}

#[tokio::test]
async fn test_stop_unknown_job() {
    let ctx = build_test_services(FakeChecker::passing());

    let error = ctx.service.stop(42).await.unwrap_err();

    assert!(matches!(error, ScalingError::JobNotFound(42)));
    assert!(ctx.registry.is_empty().await);
}

#[tokio::test]
async fn test_get_job_stamps_queried_id() {
    let ctx = build_test_services(FakeChecker::passing());
    let original = JobConfigFactory::new()
        .job_id(7)
        .sharding_tables(&["ds_0.t_order_0,ds_0.t_order_1"])
        .build();

    ctx.service.update_job_config(42, &original).await.unwrap();
    let job = ctx.service.get_job(42).await.unwrap();

    assert_eq!(job.job_id(), 42);
    let mut expected = original.clone();
    expected.handle_config.job_id = Some(42);
    assert_eq!(job.job_config(), &expected);
}

#[tokio::test]
async fn test_persisted_config_keeps_nulls() {
    let ctx = build_test_services(FakeChecker::passing());
    ctx.service
        .start(JobConfigFactory::new().job_id(42).build())
        .await
        .unwrap();

    let raw = ctx
        .registry
        .get(&paths::config_key(42))
        .await
        .unwrap()
        .unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();

    let sharding_rule = &json["ruleConfig"]["source"]["shardingRule"];
    assert!(sharding_rule
        .as_object()
        .unwrap()
        .contains_key("defaultShardingColumn"));
    assert!(sharding_rule["defaultShardingColumn"].is_null());
    assert_eq!(json["handleConfig"]["jobId"], 42);
    assert_eq!(json["handleConfig"]["running"], true);
}

#[tokio::test]
async fn test_get_job_missing_or_empty() {
    let ctx = build_test_services(FakeChecker::passing());
    assert!(matches!(
        ctx.service.get_job(42).await.unwrap_err(),
        ScalingError::JobNotFound(42)
    ));

    ctx.registry
        .persist(&paths::config_key(42), "")
        .await
        .unwrap();
    assert!(matches!(
        ctx.service.get_job(42).await.unwrap_err(),
        ScalingError::JobNotFound(42)
    ));
}

#[tokio::test]
async fn test_get_job_malformed_config() {
    let ctx = build_test_services(FakeChecker::passing());
    ctx.registry
        .persist(&paths::config_key(42), "{\"ruleConfig\": 3}")
        .await
        .unwrap();

    let error = ctx.service.get_job(42).await.unwrap_err();

    match error {
        ScalingError::MalformedPersistedState { key, .. } => {
            assert_eq!(key, "/scaling/job/42/config")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_job_rejects_mixed_sharding_item() {
    let ctx = build_test_services(FakeChecker::passing());
    let config = JobConfigFactory::new()
        .data_sources(&["ds_0", "ds_1"])
        .sharding_tables(&["ds_0.t_order_0,ds_1.t_order_0"])
        .build();
    ctx.service.update_job_config(42, &config).await.unwrap();

    let error = ctx.service.get_job(42).await.unwrap_err();

    assert!(matches!(error, ScalingError::MalformedPersistedState { .. }));
}

#[tokio::test]
async fn test_list_jobs() {
    let ctx = build_test_services(FakeChecker::passing());
    assert!(ctx.service.list_jobs().await.unwrap().is_empty());

    for job_id in [41, 42] {
        ctx.service
            .start(JobConfigFactory::new().job_id(job_id).build())
            .await
            .unwrap();
    }
    ctx.service.stop(41).await.unwrap();

    let jobs = ctx.service.list_jobs().await.unwrap();

    let summary: Vec<(i64, bool)> = jobs
        .iter()
        .map(|job| (job.job_id(), job.is_running()))
        .collect();
    assert_eq!(summary, vec![(41, false), (42, true)]);
}

#[tokio::test]
async fn test_list_jobs_rejects_non_numeric_entry() {
    let ctx = build_test_services(FakeChecker::passing());
    ctx.registry
        .persist("/scaling/job/not-a-job/config", "{}")
        .await
        .unwrap();

    let error = ctx.service.list_jobs().await.unwrap_err();

    assert!(matches!(error, ScalingError::MalformedPersistedState { .. }));
}

#[tokio::test]
async fn test_remove_deletes_subtree() {
    let ctx = build_test_services(FakeChecker::passing());
    for job_id in [41, 42] {
        ctx.service
            .start(JobConfigFactory::new().job_id(job_id).build())
            .await
            .unwrap();
    }
    ctx.registry
        .persist(&paths::inventory_key(42, "0"), "{\"finished\":[\"u1\"]}")
        .await
        .unwrap();

    ctx.service.remove(42).await.unwrap();

    assert!(matches!(
        ctx.service.get_job(42).await.unwrap_err(),
        ScalingError::JobNotFound(42)
    ));
    assert_eq!(ctx.registry.keys().await, vec![paths::config_key(41)]);
    assert!(ctx.service.get_job(41).await.is_ok());
}

#[tokio::test]
async fn test_remove_unknown_job_is_ok() {
    let ctx = build_test_services(FakeChecker::passing());

    ctx.service.remove(42).await.unwrap();

    assert!(ctx.registry.is_empty().await);
}

#[tokio::test]
async fn test_registry_outage_propagates() {
    let service = build_service(Arc::new(UnavailableRegistry), Arc::new(FakeChecker::passing()));

    assert!(matches!(
        service.get_job(42).await.unwrap_err(),
        ScalingError::RegistryUnavailable(_)
    ));
    assert!(matches!(
        service.list_jobs().await.unwrap_err(),
        ScalingError::RegistryUnavailable(_)
    ));
    assert!(matches!(
        service
            .start(JobConfigFactory::new().job_id(42).build())
            .await
            .unwrap_err(),
        ScalingError::RegistryUnavailable(_)
    ));
}
