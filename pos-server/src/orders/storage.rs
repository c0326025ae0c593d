//! redb-based order storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `OrderSnapshot` | Current order state |
//! | `updated_index` | `(updated_at, order_id)` | `()` | "changed since T" sync queries |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `counters` | `&str` | `u64` | Order/item id and daily number counters |
//!
//! The `updated_index` keeps exactly one entry per order; `store_order`
//! replaces the old `(updated_at, id)` key inside the same write
//! transaction, so the index can never disagree with the order row.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: copy-on-write
//! with an atomic pointer swap, so the file stays consistent across
//! power loss. POS terminals get unplugged; this matters.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use shared::order::OrderSnapshot;

/// Current order state: key = order id, value = JSON-serialized OrderSnapshot
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Sync index: key = (updated_at millis, order id), value = empty
const UPDATED_INDEX_TABLE: TableDefinition<(i64, u64), ()> = TableDefinition::new("updated_index");

/// Active order index: key = order id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<u64, ()> = TableDefinition::new("active_orders");

/// Monotonic counters: key = counter name, value = current value
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_ID_KEY: &str = "order_id";
const ITEM_ID_KEY: &str = "item_id";
const DAY_COUNT_KEY: &str = "day_count";
const DAY_KEY: &str = "day";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(u64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::initialize(db)
    }

    /// Open an in-memory database (tests and demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> StorageResult<Self> {
        // Create all tables up front so readers never see a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(UPDATED_INDEX_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Counters ==========

    fn increment_counter(&self, txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let next = table.get(key)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Allocate the next order id (within the caller's transaction)
    pub fn next_order_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.increment_counter(txn, ORDER_ID_KEY)
    }

    /// Allocate the next item id (within the caller's transaction)
    pub fn next_item_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.increment_counter(txn, ITEM_ID_KEY)
    }

    /// Allocate the next per-day order count for the receipt number.
    ///
    /// `day` is the compact date (yyyymmdd as a number); the counter
    /// resets when the day changes.
    pub fn next_daily_count(&self, txn: &WriteTransaction, day: u64) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let stored_day = table.get(DAY_KEY)?.map(|g| g.value()).unwrap_or(0);
        let current = if stored_day == day {
            table.get(DAY_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0)
        } else {
            table.insert(DAY_KEY, day)?;
            0
        };
        let next = current + 1;
        table.insert(DAY_COUNT_KEY, next)?;
        Ok(next)
    }

    // ========== Orders ==========

    /// Persist an order and maintain both indexes, all within the
    /// caller's transaction.
    pub fn store_order(&self, txn: &WriteTransaction, order: &OrderSnapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec(order)?;

        let old_updated_at = {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let old = table.get(order.id)?.map(|g| g.value().to_vec());
            table.insert(order.id, bytes.as_slice())?;
            match old {
                Some(raw) => Some(serde_json::from_slice::<OrderSnapshot>(&raw)?.updated_at),
                None => None,
            }
        };

        {
            let mut index = txn.open_table(UPDATED_INDEX_TABLE)?;
            if let Some(old) = old_updated_at {
                index.remove((old, order.id))?;
            }
            index.insert((order.updated_at, order.id), ())?;
        }

        {
            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            if !order.status.is_terminal() && order.lifecycle.is_active() {
                active.insert(order.id, ())?;
            } else {
                active.remove(order.id)?;
            }
        }

        Ok(())
    }

    /// Load an order by id
    pub fn get_order(&self, order_id: u64) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order within a write transaction (read-your-own-writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders currently in the active index
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let active = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in active.iter()? {
            let (key, _) = entry?;
            if let Some(guard) = orders.get(key.value())? {
                result.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(result)
    }

    /// Orders with `updated_at` strictly greater than `cursor`,
    /// ascending by `updated_at`. The page holds at most `limit` rows
    /// but always extends through every row sharing the final
    /// timestamp: the sync cursor is that timestamp, and a page cut
    /// inside an equal-timestamp group would make the strictly-greater
    /// follow-up poll skip the rest of the group forever.
    pub fn get_updated_since(&self, cursor: i64, limit: usize) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(UPDATED_INDEX_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let start = (cursor.saturating_add(1), 0u64);
        let mut result = Vec::new();
        let mut last_ts = None;
        for entry in index.range(start..)? {
            let (key, _) = entry?;
            let (ts, order_id) = key.value();
            if result.len() >= limit && last_ts != Some(ts) {
                break;
            }
            if let Some(guard) = orders.get(order_id)? {
                result.push(serde_json::from_slice(guard.value())?);
            }
            last_ts = Some(ts);
        }
        Ok(result)
    }

    /// Full order scan, ascending by id, at most `limit` (reporting)
    pub fn get_all_orders(&self, limit: usize) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in table.iter()? {
            if result.len() >= limit {
                break;
            }
            let (_, guard) = entry?;
            result.push(serde_json::from_slice(guard.value())?);
        }
        Ok(result)
    }
}
