//! redb-based storage layer for order documents
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_no` | `Order` (JSON) | Order documents |
//! | `meta` | `&str` | `u64` | Counters |
//!
//! # Concurrency
//!
//! redb allows a single write transaction at a time. Every mutation reads,
//! validates and writes its order inside one write transaction, so writes to
//! an order are serialized and store-credit usage is an atomic
//! read-check-append.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::order::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = order_no, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// key = counter name, value = u64
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const ORDER_COUNT_KEY: &str = "order_count";

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
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: a commit is
    /// persistent once `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let mut meta = write_txn.open_table(META_TABLE)?;
            if meta.get(ORDER_COUNT_KEY)?.is_none() {
                meta.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// Blocks while another write transaction is open.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Orders ==========

    /// Get an order by number
    pub fn get_order(&self, order_no: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_no)? {
            Some(value) => Ok(Some(Order::from_json_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by number (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_no: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        match table.get(order_no)? {
            Some(value) => Ok(Some(Order::from_json_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace an order
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_no.as_str(), value.as_slice())?;
        Ok(())
    }

    /// All orders, in order-number order
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(Order::from_json_slice(value.value())?);
        }
        Ok(orders)
    }

    /// All order numbers, without decoding documents
    pub fn list_order_nos(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut order_nos = Vec::with_capacity(table.len()? as usize);
        for result in table.iter()? {
            let (key, _value) = result?;
            order_nos.push(key.value().to_string());
        }
        Ok(order_nos)
    }

    // ========== Counters ==========

    /// Increment the created-orders counter inside `txn`, returning the new count
    pub fn increment_order_count(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(META_TABLE)?;
        let current = table
            .get(ORDER_COUNT_KEY)?
            .map(|g| g.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(ORDER_COUNT_KEY, next)?;
        Ok(next)
    }

    /// Number of orders created through this store
    pub fn order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META_TABLE)?;
        Ok(table
            .get(ORDER_COUNT_KEY)?
            .map(|g| g.value())
            .unwrap_or(0))
    }
}
