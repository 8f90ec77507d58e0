//! State Store Adapters
//!
//! - [`InMemoryStateStore`]: volatile, for tests
//! - [`FileStateStore`]: one bincode snapshot per directory, replaced
//!   atomically by write-then-rename, guarded by an exclusive `LOCK` file

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::BridgeState;
use crate::ports::outbound::{StateStore, StoreError};

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Default)]
struct MemoryInner {
    state: Option<BridgeState>,
    commits: usize,
    failing: bool,
    fail_after: Option<usize>,
}

/// Volatile state store.
#[derive(Default)]
pub struct InMemoryStateStore {
    inner: Mutex<MemoryInner>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.inner.lock().commits
    }

    /// Make every subsequent commit fail, simulating a full disk.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    /// Let `allowed` more commits through, then fail every later one.
    pub fn fail_after(&self, allowed: usize) {
        let mut inner = self.inner.lock();
        inner.fail_after = Some(inner.commits + allowed);
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<BridgeState>, StoreError> {
        Ok(self.inner.lock().state.clone())
    }

    fn commit(&self, state: &BridgeState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let exhausted = inner.fail_after.is_some_and(|limit| inner.commits >= limit);
        if inner.failing || exhausted {
            return Err(StoreError::Io(std::io::Error::other("store unavailable")));
        }
        inner.state = Some(state.clone());
        inner.commits += 1;
        Ok(())
    }
}

// =============================================================================
// FILE-BACKED
// =============================================================================

/// File-backed state store.
///
/// Holds an exclusive lock on `<dir>/LOCK` for its whole lifetime, so two
/// bridge instances can never commit to the same directory.
pub struct FileStateStore {
    dir: PathBuf,
    lock: File,
}

impl FileStateStore {
    const LOCK_FILE: &'static str = "LOCK";
    const SNAPSHOT_FILE: &'static str = "state.bin";
    const TEMP_FILE: &'static str = "state.bin.tmp";

    /// Open (creating if needed) the store in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let lock_path = dir.join(Self::LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(lock_path.display().to_string()))?;

        info!("[pg-04] Opened state store at {}", dir.display());
        Ok(Self { dir, lock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(Self::SNAPSHOT_FILE)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<BridgeState>, StoreError> {
        let bytes = match fs::read(self.snapshot_path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = bincode::deserialize(&bytes)?;
        debug!("[pg-04] Loaded {} byte snapshot", bytes.len());
        Ok(Some(state))
    }

    fn commit(&self, state: &BridgeState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(state)?;
        let temp_path = self.dir.join(Self::TEMP_FILE);

        let mut temp = File::create(&temp_path)?;
        temp.write_all(&bytes)?;
        temp.sync_all()?;
        drop(temp);

        fs::rename(&temp_path, self.snapshot_path())?;
        debug!("[pg-04] Committed {} byte snapshot", bytes.len());
        Ok(())
    }
}

impl Drop for FileStateStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock);
    }
}
