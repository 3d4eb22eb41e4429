use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::query::{Query, Row};

/// A data store that holds named collections of records (e.g. `tasks` and `time_slots`).
///
/// This is usually a hosted database reached through a [`Client`](crate::client::Client),
/// but a local [`Cache`](crate::cache::Cache) can stand in for it (this is what the tests do).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the records of `collection` that match every filter of `query`, in the order it requests
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<Row>, Box<dyn Error>>;

    /// Inserts a record, and returns it as it has been stored (with its issued `id` and timestamps)
    async fn insert(&self, collection: &str, row: Row) -> Result<Row, Box<dyn Error>>;

    /// Overwrites the given fields of the record `id`, and returns the whole stored record.
    ///
    /// Fields that are not in `changes` are left untouched.
    async fn update(&self, collection: &str, id: &str, changes: Row) -> Result<Row, Box<dyn Error>>;

    /// Deletes the record `id`
    async fn delete(&self, collection: &str, id: &str) -> Result<(), Box<dyn Error>>;
}

/// Several services usually share the same store
#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<Row>, Box<dyn Error>> {
        (**self).select(collection, query).await
    }

    async fn insert(&self, collection: &str, row: Row) -> Result<Row, Box<dyn Error>> {
        (**self).insert(collection, row).await
    }

    async fn update(&self, collection: &str, id: &str, changes: Row) -> Result<Row, Box<dyn Error>> {
        (**self).update(collection, id, changes).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), Box<dyn Error>> {
        (**self).delete(collection, id).await
    }
}
