use async_trait::async_trait;
use quill_audit::{AUDITLOG_COLUMNS, AuditError, AuditRecord, AuditSink};
use quill_core::UpstreamConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;

/// Postgres caps bind parameters per statement at 65535.
const MAX_ROWS_PER_STATEMENT: usize = 65535 / AUDITLOG_COLUMNS.len();

/// DDL for the audit table, with `{table}` as placeholder.
pub const AUDITLOG_DDL: &str = "CREATE TABLE IF NOT EXISTS {table} (
    auditid      VARCHAR(32)  NOT NULL PRIMARY KEY,
    userid       BIGINT       NOT NULL,
    username     VARCHAR(100) NOT NULL DEFAULT '',
    clock        BIGINT       NOT NULL,
    action       INTEGER      NOT NULL,
    ip           VARCHAR(39)  NOT NULL DEFAULT '',
    resourceid   BIGINT       NOT NULL,
    resourcename VARCHAR(255) NOT NULL DEFAULT '',
    resourcetype INTEGER      NOT NULL,
    recordsetid  VARCHAR(32)  NOT NULL,
    details      TEXT         NOT NULL DEFAULT ''
)";

/// Sink that inserts audit batches into a Postgres table.
pub struct PostgresAuditSink {
    pool: sqlx::PgPool,
}

impl PostgresAuditSink {
    pub async fn connect(upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(upstream.pool.max_connections)
            .acquire_timeout(Duration::from_secs(u64::from(
                upstream.pool.acquire_timeout_seconds,
            )))
            .connect(&upstream.connection_string())
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Create the audit table if it does not exist.
    pub async fn ensure_table(&self, table: &str) -> Result<(), AuditError> {
        validate_table_name(table)?;
        let ddl = AUDITLOG_DDL.replace("{table}", table);
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn insert_batch(&self, table: &str, records: &[AuditRecord]) -> Result<(), AuditError> {
        if records.is_empty() {
            return Ok(());
        }

        let storage = |e: sqlx::Error| AuditError::StorageError(e.to_string());
        let mut tx = self.pool.begin().await.map_err(storage)?;

        for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder = build_insert(table, chunk)?;
            builder.build().execute(&mut *tx).await.map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        tracing::debug!(table, rows = records.len(), "Inserted audit batch");
        Ok(())
    }
}

struct PgAuditRow {
    audit_id: String,
    user_id: i64,
    username: String,
    clock: i64,
    action: i32,
    ip: String,
    resource_id: i64,
    resource_name: String,
    resource_type: i32,
    recordset_id: String,
    details: String,
}

impl TryFrom<&AuditRecord> for PgAuditRow {
    type Error = AuditError;

    fn try_from(record: &AuditRecord) -> Result<Self, Self::Error> {
        let to_bigint = |column: &str, value: u64| {
            i64::try_from(value).map_err(|_| {
                AuditError::InvalidRecord(format!("{} {} does not fit BIGINT", column, value))
            })
        };

        Ok(Self {
            audit_id: record.audit_id.clone(),
            user_id: to_bigint("userid", record.user_id)?,
            username: record.username.clone(),
            clock: record.clock,
            action: record.action,
            ip: record.ip.clone(),
            resource_id: to_bigint("resourceid", record.resource_id)?,
            resource_name: record.resource_name.clone(),
            resource_type: record.resource_type,
            recordset_id: record.recordset_id.clone(),
            details: record.details.clone(),
        })
    }
}

fn validate_table_name(table: &str) -> Result<(), AuditError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(AuditError::InvalidRecord(format!(
            "invalid table name '{}'",
            table
        )))
    }
}

/// Build one multi-row INSERT for `records`.
fn build_insert(
    table: &str,
    records: &[AuditRecord],
) -> Result<QueryBuilder<'static, Postgres>, AuditError> {
    validate_table_name(table)?;

    let rows = records
        .iter()
        .map(PgAuditRow::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        table,
        AUDITLOG_COLUMNS.join(", ")
    ));
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.audit_id)
            .push_bind(row.user_id)
            .push_bind(row.username)
            .push_bind(row.clock)
            .push_bind(row.action)
            .push_bind(row.ip)
            .push_bind(row.resource_id)
            .push_bind(row.resource_name)
            .push_bind(row.resource_type)
            .push_bind(row.recordset_id)
            .push_bind(row.details);
    });

    Ok(builder)
}
