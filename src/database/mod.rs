pub mod gateway;
pub mod manager;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;
pub mod schema;

pub use gateway::{AttachedCustomer, DataGateway};
pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgGateway;
pub use query_builder::{Param, QueryError, Scope, ScopedQuery, SortDirection};
pub use repository::Repository;
pub use schema::Table;
