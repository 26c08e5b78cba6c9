use std::sync::Mutex;

use crate::store::StoreError;

const SNAPSHOT_TREE: &str = "snapshots";
const SNAPSHOT_KEY: &str = "current";

/// The durable-storage boundary: one opaque snapshot blob, load-at-open and
/// write-at-save. Implementations must tolerate concurrent reads but writes
/// arrive strictly serialized from the gateway's single lane.
pub trait SnapshotStorage: Send + Sync {
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError>;
    fn write_snapshot(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// sled-backed storage holding the snapshot under a single key, flushed to
/// disk after every write.
#[derive(Debug)]
pub struct SledStorage {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStorage {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(SNAPSHOT_TREE)?;
        Ok(Self { db, tree })
    }
}

impl SnapshotStorage for SledStorage {
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tree.get(SNAPSHOT_KEY)?.map(|raw| raw.to_vec()))
    }

    fn write_snapshot(&self, bytes: &[u8]) -> Result<(), StoreError> {
        self.tree.insert(SNAPSHOT_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory storage for tests: counts writes and can fail the next one.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Option<Vec<u8>>,
    write_count: u64,
    fail_next_write: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.inner.lock().expect("storage lock").snapshot.clone()
    }

    pub fn write_count(&self) -> u64 {
        self.inner.lock().expect("storage lock").write_count
    }

    pub fn fail_next_write(&self) {
        self.inner.lock().expect("storage lock").fail_next_write = true;
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().expect("storage lock").snapshot.clone())
    }

    fn write_snapshot(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("storage lock");
        if inner.fail_next_write {
            inner.fail_next_write = false;
            return Err(StoreError::Validation("injected write failure".to_string()));
        }
        inner.snapshot = Some(bytes.to_vec());
        inner.write_count += 1;
        Ok(())
    }
}
