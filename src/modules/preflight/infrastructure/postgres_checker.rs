/// PostgreSQL (and openGauss) pre-flight checks
///
/// Diesel is synchronous, so every probe runs on the blocking pool.
use crate::modules::preflight::domain::checker::{DataSourceChecker, ShardingColumns};
use crate::modules::preflight::infrastructure::data_source_manager::ManagedDataSource;
use crate::shared::errors::{PreflightCheck, ScalingError, ScalingResult};
use crate::shared::infrastructure::database::DbConnection;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};

/// Server settings change capture depends on, with the required value
const REQUIRED_VARIABLES: &[(&str, &str)] = &[("wal_level", "logical")];

#[derive(QueryableByName)]
struct RoleRow {
    #[diesel(sql_type = Bool)]
    rolsuper: bool,
    #[diesel(sql_type = Bool)]
    rolreplication: bool,
}

#[derive(QueryableByName)]
struct SettingRow {
    #[diesel(sql_type = Text)]
    setting: String,
}

#[derive(QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
}

#[derive(QueryableByName)]
struct HasRowsRow {
    #[diesel(sql_type = Bool)]
    has_rows: bool,
}

#[derive(Debug, Default)]
pub struct PostgreSQLDataSourceChecker;

impl PostgreSQLDataSourceChecker {
    pub fn new() -> Self {
        Self
    }

    /// Run `probe` against every data source on the blocking pool, stopping at the first failure
    async fn probe_each<F>(
        check: PreflightCheck,
        data_sources: &[ManagedDataSource],
        probe: F,
    ) -> ScalingResult<()>
    where
        F: Fn(&mut DbConnection, &str) -> ScalingResult<()> + Send + Sync + Clone + 'static,
    {
        for data_source in data_sources {
            let data_source = data_source.clone();
            let probe = probe.clone();
            let name = data_source.name().to_string();
            tokio::task::spawn_blocking(move || {
                let mut conn = data_source.connection(check)?;
                probe(&mut conn, data_source.name())
            })
            .await
            .map_err(|e| ScalingError::preflight(check, name, format!("probe aborted: {}", e)))??;
        }
        Ok(())
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn check_role(conn: &mut DbConnection, name: &str) -> ScalingResult<()> {
    let role: Option<RoleRow> = diesel::sql_query(
        "SELECT rolsuper, rolreplication FROM pg_roles WHERE rolname = current_user",
    )
    .get_result(conn)
    .optional()
    .map_err(|e| ScalingError::preflight(PreflightCheck::Privilege, name, e))?;

    match role {
        Some(role) if role.rolsuper || role.rolreplication => Ok(()),
        Some(_) => Err(ScalingError::preflight(
            PreflightCheck::Privilege,
            name,
            "current user needs the REPLICATION attribute or superuser",
        )),
        None => Err(ScalingError::preflight(
            PreflightCheck::Privilege,
            name,
            "current user has no pg_roles entry",
        )),
    }
}

fn check_settings(conn: &mut DbConnection, name: &str) -> ScalingResult<()> {
    for (variable, expected) in REQUIRED_VARIABLES {
        let row: Option<SettingRow> =
            diesel::sql_query("SELECT setting FROM pg_settings WHERE name = $1")
                .bind::<Text, _>(*variable)
                .get_result(conn)
                .optional()
                .map_err(|e| ScalingError::preflight(PreflightCheck::Variable, name, e))?;

        let actual = row.map(|r| r.setting).unwrap_or_default();
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ScalingError::preflight(
                PreflightCheck::Variable,
                name,
                format!("{} is '{}', required '{}'", variable, actual, expected),
            ));
        }
    }
    Ok(())
}

fn check_tables(conn: &mut DbConnection, name: &str, sharding_columns: &ShardingColumns) -> ScalingResult<()> {
    let fail = |reason: String| ScalingError::preflight(PreflightCheck::TargetTable, name, reason);

    for (table, required) in sharding_columns {
        let columns: Vec<ColumnRow> = diesel::sql_query(
            "SELECT column_name::text AS column_name FROM information_schema.columns \
             WHERE table_schema = ANY (current_schemas(false)) AND table_name = $1",
        )
        .bind::<Text, _>(table)
        .load(conn)
        .map_err(|e| fail(e.to_string()))?;

        if columns.is_empty() {
            return Err(fail(format!("table '{}' does not exist", table)));
        }
        if let Some(missing) = required
            .iter()
            .find(|column| !columns.iter().any(|c| c.column_name.eq_ignore_ascii_case(column)))
        {
            return Err(fail(format!(
                "table '{}' lacks sharding column '{}'",
                table, missing
            )));
        }

        let has_rows: HasRowsRow = diesel::sql_query(format!(
            "SELECT EXISTS (SELECT 1 FROM {} LIMIT 1) AS has_rows",
            quote_identifier(table)
        ))
        .get_result(conn)
        .map_err(|e| fail(e.to_string()))?;
        if has_rows.has_rows {
            return Err(fail(format!("table '{}' is not empty", table)));
        }
    }
    Ok(())
}

#[async_trait]
impl DataSourceChecker for PostgreSQLDataSourceChecker {
    async fn check_connection(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        Self::probe_each(PreflightCheck::Connection, data_sources, |conn, name| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map(|_| ())
                .map_err(|e| ScalingError::preflight(PreflightCheck::Connection, name, e))
        })
        .await
    }

    async fn check_privilege(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        Self::probe_each(PreflightCheck::Privilege, data_sources, check_role).await
    }

    async fn check_variable(&self, data_sources: &[ManagedDataSource]) -> ScalingResult<()> {
        Self::probe_each(PreflightCheck::Variable, data_sources, check_settings).await
    }

    async fn check_target_table(
        &self,
        data_sources: &[ManagedDataSource],
        sharding_columns: &ShardingColumns,
    ) -> ScalingResult<()> {
        let sharding_columns = sharding_columns.clone();
        Self::probe_each(PreflightCheck::TargetTable, data_sources, move |conn, name| {
            check_tables(conn, name, &sharding_columns)
        })
        .await
    }
}
