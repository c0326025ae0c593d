//! redb-based user storage
//!
//! Lives in its own database file so staff admin never contends with
//! the order write path. Rows are never removed; a soft delete flips
//! the lifecycle flag and the record keeps serving old order history.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;

use shared::models::UserRecord;

use crate::orders::storage::StorageResult;

/// Staff records: key = user id, value = JSON-serialized UserRecord
const USERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Monotonic counters: key = counter name, value = current value
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const USER_ID_KEY: &str = "user_id";

/// User storage backed by redb
#[derive(Clone)]
pub struct UserStore {
    db: Arc<Database>,
}

impl UserStore {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::initialize(db)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub fn next_user_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let next = table.get(USER_ID_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(USER_ID_KEY, next)?;
        Ok(next)
    }

    pub fn store_user(&self, txn: &WriteTransaction, user: &UserRecord) -> StorageResult<()> {
        let bytes = serde_json::to_vec(user)?;
        let mut table = txn.open_table(USERS_TABLE)?;
        table.insert(user.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn get_user(&self, user_id: u64) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All records, ascending by id, soft-deleted ones included
    pub fn list_users(&self) -> StorageResult<Vec<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_, guard) = entry?;
            result.push(serde_json::from_slice(guard.value())?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Lifecycle;

    fn user(id: u64, name: &str) -> UserRecord {
        UserRecord {
            id,
            name: name.to_string(),
            role: "waiter".to_string(),
            lifecycle: Lifecycle::Active,
            updated_at: 100,
        }
    }

    #[test]
    fn test_store_and_list() {
        let store = UserStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let id = store.next_user_id(&txn).unwrap();
        store.store_user(&txn, &user(id, "Ana")).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_user(id).unwrap().unwrap().name, "Ana");
        assert_eq!(store.list_users().unwrap().len(), 1);
        assert!(store.get_user(99).unwrap().is_none());
    }
}
