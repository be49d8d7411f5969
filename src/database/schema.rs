//! Table catalogue: the one place that knows table names, their columns,
//! and how each table is tied back to a tenant.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tenants,
    Users,
    Products,
    Orders,
    OrderItems,
    Payments,
    PaymentMethods,
    AuditLogs,
}

/// How rows of a table are attributed to a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// The row's own id is the tenant id.
    SelfId,
    /// The row carries the tenant id in this column.
    Column(&'static str),
    /// The row references a parent row which carries the tenant id.
    Parent {
        column: &'static str,
        parent: Table,
        parent_tenant_column: &'static str,
    },
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Tenants,
        Table::Users,
        Table::Products,
        Table::Orders,
        Table::OrderItems,
        Table::Payments,
        Table::PaymentMethods,
        Table::AuditLogs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Tenants => "tenants",
            Table::Users => "users",
            Table::Products => "products",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
            Table::Payments => "payments",
            Table::PaymentMethods => "payment_methods",
            Table::AuditLogs => "audit_logs",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Tenants => &["id", "name", "logo_url", "primary_color", "created_at", "updated_at"],
            Table::Users => &[
                "id",
                "email",
                "tenant_id",
                "role",
                "billing_customer_id",
                "created_at",
                "updated_at",
            ],
            Table::Products => &[
                "id",
                "tenant_id",
                "name",
                "description",
                "price",
                "image_url",
                "created_at",
                "updated_at",
            ],
            Table::Orders => &["id", "tenant_id", "user_id", "status", "total", "created_at", "updated_at"],
            Table::OrderItems => &["id", "order_id", "product_id", "quantity", "price", "created_at"],
            Table::Payments => &[
                "id",
                "tenant_id",
                "order_id",
                "amount",
                "status",
                "payment_intent_id",
                "created_at",
                "updated_at",
            ],
            Table::PaymentMethods => &[
                "id",
                "user_id",
                "type",
                "last_four",
                "expires",
                "is_default",
                "billing_method_id",
                "created_at",
                "updated_at",
            ],
            Table::AuditLogs => &[
                "id",
                "user_id",
                "tenant_id",
                "action",
                "resource",
                "resource_id",
                "created_at",
            ],
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    pub fn isolation(&self) -> Isolation {
        match self {
            Table::Tenants => Isolation::SelfId,
            Table::Users | Table::Products | Table::Orders | Table::Payments | Table::AuditLogs => {
                Isolation::Column("tenant_id")
            }
            Table::OrderItems => Isolation::Parent {
                column: "order_id",
                parent: Table::Orders,
                parent_tenant_column: "tenant_id",
            },
            Table::PaymentMethods => Isolation::Parent {
                column: "user_id",
                parent: Table::Users,
                parent_tenant_column: "tenant_id",
            },
        }
    }
}
