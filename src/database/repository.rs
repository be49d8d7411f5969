use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::database::gateway::DataGateway;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::ScopedQuery;

/// Typed view over the gateway: rows are decoded into `T` here, so a row
/// that does not match the schema fails loudly instead of flowing onwards.
pub struct Repository<T> {
    gateway: Arc<dyn DataGateway>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: DeserializeOwned + Send,
{
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, query: &ScopedQuery) -> Result<Vec<T>, DatabaseError> {
        let rows = self.gateway.fetch(query).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| DatabaseError::Decode {
                    table: query.table().name(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    pub async fn select_one(&self, query: &ScopedQuery) -> Result<Option<T>, DatabaseError> {
        let limited = query.capped(1);
        Ok(self.select_any(&limited).await?.into_iter().next())
    }

    pub async fn count(&self, query: &ScopedQuery) -> Result<i64, DatabaseError> {
        self.gateway.count(query).await
    }
}
