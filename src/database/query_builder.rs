use thiserror::Error;
use uuid::Uuid;

use crate::database::schema::{Isolation, Table};
use crate::types::TenantId;

#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("Invalid column '{column}' for table '{table}'")]
    InvalidColumn { table: &'static str, column: String },

    #[error("Invalid limit: {0}")]
    InvalidLimit(i64),
}

/// Capability to read tenant data. A query cannot be built without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope(ScopeKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Tenant(TenantId),
    Platform,
}

impl Scope {
    pub fn tenant(id: TenantId) -> Self {
        Scope(ScopeKind::Tenant(id))
    }

    /// Unfiltered access; only handed out for platform administrators.
    pub(crate) fn platform() -> Self {
        Scope(ScopeKind::Platform)
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        match self.0 {
            ScopeKind::Tenant(id) => Some(id),
            ScopeKind::Platform => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self.0, ScopeKind::Platform)
    }
}

/// Typed bind parameter. Keeps uuid columns bound as uuid, not text.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
    Int(i64),
}

impl From<Uuid> for Param {
    fn from(v: Uuid) -> Self {
        Param::Uuid(v)
    }
}

impl From<TenantId> for Param {
    fn from(v: TenantId) -> Self {
        Param::Uuid(v.0)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Param>,
}

/// Read against one table, always restricted to a scope.
#[derive(Debug, Clone)]
pub struct ScopedQuery {
    table: Table,
    scope: Scope,
    conditions: Vec<(String, Param)>,
    order: Vec<OrderBy>,
    limit: Option<i64>,
}

impl ScopedQuery {
    pub fn new(table: Table, scope: &Scope) -> Self {
        Self {
            table,
            scope: *scope,
            conditions: vec![],
            order: vec![],
            limit: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Param>) -> Result<Self, QueryError> {
        self.check_column(column)?;
        self.conditions.push((column.to_string(), value.into()));
        Ok(self)
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Result<Self, QueryError> {
        self.check_column(column)?;
        self.order.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self, QueryError> {
        if limit < 0 {
            return Err(QueryError::InvalidLimit(limit));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    /// Copy of this query whose limit never exceeds `max`.
    pub fn capped(&self, max: i64) -> Self {
        let mut capped = self.clone();
        capped.limit = Some(self.limit.map_or(max, |l| l.min(max)));
        capped
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn conditions(&self) -> &[(String, Param)] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn row_limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn to_where_sql(&self) -> SqlResult {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some((clause, param)) = scope_predicate(self.table, &self.scope, 1) {
            clauses.push(clause);
            params.push(param);
        }
        for (column, value) in &self.conditions {
            params.push(value.clone());
            clauses.push(format!("\"{}\" = ${}", column, params.len()));
        }

        SqlResult {
            query: clauses.join(" AND "),
            params,
        }
    }

    pub fn to_select_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let order_clause = if self.order.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = self
                .order
                .iter()
                .map(|o| format!("\"{}\" {}", o.column, o.direction.to_sql()))
                .collect();
            format!("ORDER BY {}", parts.join(", "))
        };
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table.name()),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult {
            query,
            params: where_result.params,
        }
    }

    /// Select wrapped so each row comes back as one JSON object.
    pub fn to_json_select_sql(&self) -> SqlResult {
        let inner = self.to_select_sql();
        SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM ({}) t", inner.query),
            params: inner.params,
        }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", self.table.name())
        } else {
            format!(
                "SELECT COUNT(*) as count FROM \"{}\" WHERE {}",
                self.table.name(),
                where_result.query
            )
        };
        SqlResult {
            query,
            params: where_result.params,
        }
    }

    fn check_column(&self, column: &str) -> Result<(), QueryError> {
        if self.table.has_column(column) {
            Ok(())
        } else {
            Err(QueryError::InvalidColumn {
                table: self.table.name(),
                column: column.to_string(),
            })
        }
    }
}

/// Tenant restriction for `table` using placeholder `$index`.
/// `None` only for the platform scope.
pub(crate) fn scope_predicate(table: Table, scope: &Scope, index: usize) -> Option<(String, Param)> {
    let tenant = scope.tenant_id()?;
    let clause = match table.isolation() {
        Isolation::SelfId => format!("\"id\" = ${}", index),
        Isolation::Column(column) => format!("\"{}\" = ${}", column, index),
        Isolation::Parent {
            column,
            parent,
            parent_tenant_column,
        } => format!(
            "\"{}\" IN (SELECT \"id\" FROM \"{}\" WHERE \"{}\" = ${})",
            column,
            parent.name(),
            parent_tenant_column,
            index
        ),
    };
    Some((clause, Param::from(tenant)))
}

/// Compare-and-set of a user's billing customer id: only an unset (NULL or
/// blank) id is overwritten, and the row comes back only if this statement
/// wrote it.
pub fn attach_billing_customer_sql(scope: &Scope, user_id: Uuid, customer_id: &str) -> SqlResult {
    let mut query = String::from(
        "UPDATE \"users\" SET \"billing_customer_id\" = $1, \"updated_at\" = now() \
         WHERE \"id\" = $2 AND (\"billing_customer_id\" IS NULL OR \"billing_customer_id\" = '')",
    );
    let mut params = vec![Param::Text(customer_id.to_string()), Param::Uuid(user_id)];
    if let Some((clause, param)) = scope_predicate(Table::Users, scope, 3) {
        query.push_str(" AND ");
        query.push_str(&clause);
        params.push(param);
    }
    query.push_str(" RETURNING \"billing_customer_id\"");
    SqlResult { query, params }
}

/// Read of the stored billing customer id, under the same scope as the write.
pub fn billing_customer_sql(scope: &Scope, user_id: Uuid) -> SqlResult {
    let mut query = String::from("SELECT \"billing_customer_id\" FROM \"users\" WHERE \"id\" = $1");
    let mut params = vec![Param::Uuid(user_id)];
    if let Some((clause, param)) = scope_predicate(Table::Users, scope, 2) {
        query.push_str(" AND ");
        query.push_str(&clause);
        params.push(param);
    }
    SqlResult { query, params }
}

/// Statements run in one transaction to make `method_id` the user's only
/// default: lock the owned row, clear the other defaults, set the new one.
/// Clearing comes first because the partial unique index on
/// `(user_id) WHERE is_default` is checked per row.
pub fn default_payment_method_sql(user_id: Uuid, method_id: Uuid) -> [SqlResult; 3] {
    [
        SqlResult {
            query: "SELECT \"id\" FROM \"payment_methods\" WHERE \"id\" = $1 AND \"user_id\" = $2 FOR UPDATE"
                .to_string(),
            params: vec![Param::Uuid(method_id), Param::Uuid(user_id)],
        },
        SqlResult {
            query: "UPDATE \"payment_methods\" SET \"is_default\" = false, \"updated_at\" = now() \
                    WHERE \"user_id\" = $1 AND \"is_default\" AND \"id\" <> $2"
                .to_string(),
            params: vec![Param::Uuid(user_id), Param::Uuid(method_id)],
        },
        SqlResult {
            query: "UPDATE \"payment_methods\" SET \"is_default\" = true, \"updated_at\" = now() \
                    WHERE \"id\" = $1 AND \"user_id\" = $2"
                .to_string(),
            params: vec![Param::Uuid(method_id), Param::Uuid(user_id)],
        },
    ]
}
