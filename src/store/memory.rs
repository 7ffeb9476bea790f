//! In-memory store with a simulated access latency.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Record;
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct InMemoryStore<R> {
    records: HashMap<String, R>,
    latency: Duration,
}

impl<R: Record> InMemoryStore<R> {
    /// Index `records` by id. A later record with a duplicate id replaces
    /// the earlier one.
    pub fn new(records: impl IntoIterator<Item = R>, latency: Duration) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id().to_string(), record))
            .collect();
        Self { records, latency }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn lookup(&self, id: &str) -> Option<R> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.records.get(id).cloned()
    }
}
