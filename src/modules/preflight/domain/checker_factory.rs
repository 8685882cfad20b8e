use crate::modules::jobs::domain::value_objects::DatabaseType;
use crate::modules::preflight::domain::checker::DataSourceChecker;
use crate::modules::preflight::infrastructure::PostgreSQLDataSourceChecker;
use crate::shared::errors::{ScalingError, ScalingResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Selects the checker for a dialect tag
#[derive(Clone, Default)]
pub struct DataSourceCheckerFactory {
    checkers: HashMap<DatabaseType, Arc<dyn DataSourceChecker>>,
}

impl DataSourceCheckerFactory {
    /// Factory without any registered dialect
    pub fn new() -> Self {
        Self::default()
    }

    /// PostgreSQL and openGauss share the PostgreSQL checker
    pub fn with_default_checkers() -> Self {
        let postgres: Arc<dyn DataSourceChecker> = Arc::new(PostgreSQLDataSourceChecker::new());
        Self::new()
            .register(DatabaseType::PostgreSQL, Arc::clone(&postgres))
            .register(DatabaseType::OpenGauss, postgres)
    }

    pub fn register(mut self, database_type: DatabaseType, checker: Arc<dyn DataSourceChecker>) -> Self {
        self.checkers.insert(database_type, checker);
        self
    }

    pub fn new_instance(&self, database_type: DatabaseType) -> ScalingResult<Arc<dyn DataSourceChecker>> {
        self.checkers
            .get(&database_type)
            .cloned()
            .ok_or_else(|| ScalingError::UnsupportedDatabaseType(database_type.to_string()))
    }

    pub fn supported_types(&self) -> Vec<DatabaseType> {
        self.checkers.keys().copied().collect()
    }
}
