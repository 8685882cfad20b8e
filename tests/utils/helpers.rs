/// Test doubles and service builders
use async_trait::async_trait;
use scaling_lib::modules::jobs::domain::DatabaseType;
use scaling_lib::modules::preflight::domain::ShardingColumns;
use scaling_lib::modules::preflight::{
    DataSourceChecker, DataSourceCheckerFactory, ManagedDataSource, PreflightChecker,
};
use scaling_lib::modules::registry::{InMemoryRegistryRepository, RegistryRepository};
use scaling_lib::shared::errors::{PreflightCheck, ScalingError, ScalingResult};
use scaling_lib::shared::infrastructure::PoolSettings;
use scaling_lib::ScalingJobService;
use std::sync::{Arc, Mutex};

/// Checker that records each check it ran and fails exactly one, if asked to
#[derive(Default)]
pub struct FakeChecker {
    fail_on: Option<PreflightCheck>,
    calls: Mutex<Vec<(PreflightCheck, Vec<String>)>>,
}

impl FakeChecker {
    pub fn passing() -> Self {
        Self::default()
    }

    pub fn failing_on(check: PreflightCheck) -> Self {
        Self {
            fail_on: Some(check),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PreflightCheck, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn checks(&self) -> Vec<PreflightCheck> {
        self.calls().into_iter().map(|(check, _)| check).collect()
    }

    fn record(&self, check: PreflightCheck, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        let names: Vec<String> = data_sources.iter().map(|ds| ds.name().to_string()).collect();
        let first = names.first().cloned().unwrap_or_default();
        self.calls.lock().unwrap().push((check, names));
        if self.fail_on == Some(check) {
            return Err(ScalingError::preflight(check, first, "rejected by fake checker"));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSourceChecker for FakeChecker {
    async fn check_connection(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        self.record(PreflightCheck::Connection, data_sources)
    }

    async fn check_privilege(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        self.record(PreflightCheck::Privilege, data_sources)
    }

    async fn check_variable(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        self.record(PreflightCheck::Variable, data_sources)
    }

    async fn check_target_table(
        &self,
        data_sources: &[ManagedDataSource],
        _sharding_columns: &ShardingColumns,
    ) -> ScalingResult<()> {
        self.record(PreflightCheck::TargetTable, data_sources)
    }
}

/// Registry whose transport is always down
pub struct UnavailableRegistry;

fn refused<T>() -> ScalingResult<T> {
    Err(ScalingError::RegistryUnavailable("connection refused".to_string()))
}

#[async_trait]
impl RegistryRepository for UnavailableRegistry {
    async fn get(&self, _key: &str) -> ScalingResult<Option<String>> {
        refused()
    }

    async fn persist(&self, _key: &str, _value: &str) -> ScalingResult<()> {
        refused()
    }

    async fn delete(&self, _key: &str) -> ScalingResult<()> {
        refused()
    }

    async fn get_children_keys(&self, _key: &str) -> ScalingResult<Vec<String>> {
        refused()
    }
}

pub struct TestServices {
    pub registry: Arc<InMemoryRegistryRepository>,
    pub checker: Arc<FakeChecker>,
    pub service: ScalingJobService,
}

/// Job service over a fresh in-memory registry and the given fake checker
pub fn build_test_services(checker: FakeChecker) -> TestServices {
    let registry = Arc::new(InMemoryRegistryRepository::new());
    let checker = Arc::new(checker);
    let service = build_service(registry.clone(), checker.clone());
    TestServices {
        registry,
        checker,
        service,
    }
}

pub fn build_service(
    registry: Arc<dyn RegistryRepository>,
    checker: Arc<dyn DataSourceChecker>,
) -> ScalingJobService {
    let factory = DataSourceCheckerFactory::new().register(DatabaseType::PostgreSQL, checker);
    ScalingJobService::new(
        registry,
        PreflightChecker::new(Arc::new(factory), PoolSettings::default()),
    )
}
