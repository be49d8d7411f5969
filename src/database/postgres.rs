use async_trait::async_trait;
use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgPool, Row};
use uuid::Uuid;

use crate::database::gateway::{AttachedCustomer, DataGateway};
use crate::database::manager::DatabaseError;
use crate::database::models::NewAuditLog;
use crate::database::query_builder::{
    attach_billing_customer_sql, billing_customer_sql, default_payment_method_sql, Param, Scope, ScopedQuery,
};

/// `DataGateway` over a Postgres pool.
pub struct PgGateway {
    pool: PgPool,
    max_rows: i64,
}

impl PgGateway {
    pub fn new(pool: PgPool, max_rows: i64) -> Self {
        Self { pool, max_rows }
    }

    async fn current_billing_customer(&self, scope: &Scope, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        let sql_result = billing_customer_sql(scope, user_id);
        let row = bind_all(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;
        let current: Option<String> = row.try_get("billing_customer_id")?;
        Ok(current)
    }
}

#[async_trait]
impl DataGateway for PgGateway {
    async fn fetch(&self, query: &ScopedQuery) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = query.capped(self.max_rows).to_json_select_sql();
        let rows = bind_all(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    async fn count(&self, query: &ScopedQuery) -> Result<i64, DatabaseError> {
        let sql_result = query.to_count_sql();
        let row = bind_all(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn attach_billing_customer(
        &self,
        scope: &Scope,
        user_id: Uuid,
        customer_id: &str,
    ) -> Result<AttachedCustomer, DatabaseError> {
        let sql_result = attach_billing_customer_sql(scope, user_id, customer_id);
        let q = bind_all(sqlx::query(&sql_result.query), &sql_result.params);

        if let Some(row) = q.fetch_optional(&self.pool).await? {
            let customer_id: String = row.try_get("billing_customer_id")?;
            return Ok(AttachedCustomer {
                customer_id,
                written: true,
            });
        }

        // Lost the race, or the id was already set: report what is stored.
        match self.current_billing_customer(scope, user_id).await? {
            Some(existing) if !existing.is_empty() => Ok(AttachedCustomer {
                customer_id: existing,
                written: false,
            }),
            _ => Err(DatabaseError::QueryError(format!(
                "billing customer for user {} was neither written nor present",
                user_id
            ))),
        }
    }

    async fn set_default_payment_method(&self, user_id: Uuid, method_id: Uuid) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let [lock, clear, set] = default_payment_method_sql(user_id, method_id);

        let owned = bind_all(sqlx::query(&lock.query), &lock.params)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        bind_all(sqlx::query(&clear.query), &clear.params)
            .execute(&mut *tx)
            .await?;
        bind_all(sqlx::query(&set.query), &set.params)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO \"audit_logs\" (\"id\", \"user_id\", \"tenant_id\", \"action\", \"resource\", \"resource_id\") \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.tenant_id.0)
        .bind(entry.action)
        .bind(entry.resource)
        .bind(entry.resource_id.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q Param,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        Param::Uuid(u) => q.bind(*u),
        Param::Text(s) => q.bind(s.as_str()),
        Param::Bool(b) => q.bind(*b),
        Param::Int(i) => q.bind(*i),
    }
}

fn bind_all<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &'q [Param],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for p in params {
        q = bind_param(q, p);
    }
    q
}
