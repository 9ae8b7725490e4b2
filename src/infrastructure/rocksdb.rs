use crate::domain::ledger::LedgerState;
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the ledger snapshot.
pub const CF_LEDGER: &str = "ledger";
const STATE_KEY: &[u8] = b"state";

/// A persistent ledger store backed by RocksDB.
///
/// The whole `LedgerState` is kept as one JSON value, so every save replaces
/// the snapshot atomically. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "ledger" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_ledger])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_LEDGER).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(
                "Ledger column family not found",
            )))
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn load(&self) -> Result<Option<LedgerState>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, STATE_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: LedgerState) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(&state)?;
        self.db.put_cf(cf, STATE_KEY, value)?;
        Ok(())
    }
}
