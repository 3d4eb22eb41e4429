//! This module provides a local store, that can be used offline or to mock the hosted store in tests

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mock_behaviour::{MockBehaviour, StoreOperation};
use crate::query::{Query, Row};
use crate::traits::RemoteStore;

/// Columns the store fills in itself. Clients cannot overwrite them.
const ISSUED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A store that keeps its collections in memory, and optionally in a local JSON file.
///
/// Just like the hosted store, it issues record ids and creation/modification timestamps.
#[derive(Debug)]
pub struct Cache {
    backing_file: Option<PathBuf>,
    data: Mutex<CachedData>,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedData {
    collections: HashMap<String, Vec<Row>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Cache {
    /// Initialize an empty cache, that is not backed by any file
    pub fn new() -> Self {
        Self {
            backing_file: None,
            data: Mutex::new(CachedData::default()),
            mock_behaviour: None,
        }
    }

    /// Initialize an empty cache, that will be saved to `path` after every change
    pub fn with_backing_file(path: &Path) -> Self {
        Self {
            backing_file: Some(PathBuf::from(path)),
            ..Self::new()
        }
    }

    /// Initialize a cache from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self {
            backing_file: Some(PathBuf::from(path)),
            data: Mutex::new(data),
            mock_behaviour: None,
        })
    }

    /// Make this cache fail some of its operations, as described by a [`MockBehaviour`]
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    /// Store the current content to the backing file (if any)
    pub fn save_to_file(&self) -> Result<(), Box<dyn Error>> {
        let data = self.lock_data()?;
        self.save_data(&data)
    }

    /// The number of records in a collection
    pub fn len(&self, collection: &str) -> usize {
        match self.lock_data() {
            Err(_) => 0,
            Ok(data) => data.collections.get(collection).map(|rows| rows.len()).unwrap_or(0),
        }
    }

    fn save_data(&self, data: &CachedData) -> Result<(), Box<dyn Error>> {
        let path = match &self.backing_file {
            None => return Ok(()),
            Some(p) => p,
        };
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, data)?;
        Ok(())
    }

    /// Save after a change. A failure is only logged, the in-memory data remains the reference
    fn persist(&self, data: &CachedData) {
        if let Err(err) = self.save_data(data) {
            log::warn!("Unable to save the cache to {:?}: {}", self.backing_file, err);
        }
    }

    fn lock_data(&self) -> Result<MutexGuard<'_, CachedData>, Box<dyn Error>> {
        self.data.lock()
            .map_err(|_| "The cache data is poisoned".into())
    }

    fn check_mock(&self, op: StoreOperation) -> Result<(), Box<dyn Error>> {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(mock) => {
                let mut mock = mock.lock().map_err(|_| "The mock behaviour is poisoned")?;
                mock.check(op)
            },
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl CachedData {
    /// A timestamp for a new change. Timestamps are strictly increasing, so that changes can be ordered
    fn next_timestamp(&mut self) -> Value {
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(|id| id.as_str())
}

#[async_trait]
impl RemoteStore for Cache {
    async fn select(&self, collection: &str, query: &Query) -> Result<Vec<Row>, Box<dyn Error>> {
        self.check_mock(StoreOperation::Select)?;

        let data = self.lock_data()?;
        let mut rows: Vec<Row> = data.collections.get(collection)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        query.sort(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, collection: &str, row: Row) -> Result<Row, Box<dyn Error>> {
        self.check_mock(StoreOperation::Insert)?;

        let mut data = self.lock_data()?;
        let mut row = row;
        let id = match row_id(&row) {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_hyphenated().to_string(),
        };
        let already_exists = data.collections.get(collection)
            .map(|rows| rows.iter().any(|r| row_id(r) == Some(id.as_str())))
            .unwrap_or(false);
        if already_exists {
            return Err(format!("Duplicate key: {} already exists in {}", id, collection).into());
        }

        let timestamp = data.next_timestamp();
        row.insert("id".to_string(), Value::String(id));
        row.insert("created_at".to_string(), timestamp.clone());
        row.insert("updated_at".to_string(), timestamp);

        data.collections.entry(collection.to_string())
            .or_default()
            .push(row.clone());
        self.persist(&data);
        Ok(row)
    }

    async fn update(&self, collection: &str, id: &str, changes: Row) -> Result<Row, Box<dyn Error>> {
        self.check_mock(StoreOperation::Update)?;

        let mut data = self.lock_data()?;
        let timestamp = data.next_timestamp();
        let updated = {
            let stored = data.collections.get_mut(collection)
                .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
                .ok_or_else(|| format!("No record {} in {}", id, collection))?;

            for (column, value) in changes {
                if ISSUED_COLUMNS.contains(&column.as_str()) {
                    log::debug!("Ignoring a change to the store-issued column {}", column);
                    continue;
                }
                stored.insert(column, value);
            }
            stored.insert("updated_at".to_string(), timestamp);
            stored.clone()
        };
        self.persist(&data);
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), Box<dyn Error>> {
        self.check_mock(StoreOperation::Delete)?;

        let mut data = self.lock_data()?;
        if let Some(rows) = data.collections.get_mut(collection) {
            let len_before = rows.len();
            rows.retain(|r| row_id(r) != Some(id));
            if rows.len() == len_before {
                // Just like the hosted store, deleting nothing is not an error
                log::debug!("No record {} to delete in {}", id, collection);
            }
        }
        self.persist(&data);
        Ok(())
    }
}
