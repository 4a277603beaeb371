//! Item Store
//!
//! In-memory catalogue of uploaded items. Each row of an uploaded item
//! sheet becomes one item with a sequential id; the fields are whatever
//! columns the sheet carried.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::table::Table;

/// A stored item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: u64,
    pub fields: Map<String, Value>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    items: BTreeMap<u64, Item>,
}

/// Thread-safe item store
#[derive(Debug)]
pub struct ItemStore {
    inner: RwLock<Inner>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                items: BTreeMap::new(),
            }),
        }
    }

    /// Store every row of `table` as an item; returns the new ids
    pub async fn import_table(&self, table: &Table) -> Vec<u64> {
        let uploaded_at = Utc::now();
        let mut inner = self.inner.write().await;

        let mut ids = Vec::with_capacity(table.len());
        for row in table.rows() {
            let fields = table
                .columns()
                .iter()
                .zip(row)
                .map(|(column, cell)| {
                    let value = cell.clone().map(Value::String).unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect();

            let id = inner.next_id;
            inner.next_id += 1;
            inner.items.insert(
                id,
                Item {
                    id,
                    fields,
                    uploaded_at,
                },
            );
            ids.push(id);
        }

        tracing::info!(imported = ids.len(), total = inner.items.len(), "Items imported");
        ids
    }

    /// All items ordered by id
    pub async fn list(&self) -> Vec<Item> {
        self.inner.read().await.items.values().cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Option<Item> {
        self.inner.read().await.items.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_assigns_sequential_ids() {
        let store = ItemStore::new();
        let table = Table::from_csv_bytes(b"name,weight\nring,3g\nchain,\n").unwrap();

        let ids = store.import_table(&table).await;
        assert_eq!(ids, vec![1, 2]);

        let more = store.import_table(&table).await;
        assert_eq!(more, vec![3, 4]);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let store = ItemStore::new();
        assert!(store.is_empty().await);

        let table = Table::from_csv_bytes(b"name,weight\nring,3g\nchain,\n").unwrap();
        store.import_table(&table).await;

        let item = store.get(2).await.unwrap();
        assert_eq!(item.fields["name"], "chain");
        assert_eq!(item.fields["weight"], Value::Null);

        assert!(store.get(99).await.is_none());

        let ids: Vec<u64> = store.list().await.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
