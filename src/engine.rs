//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate requests before touching locks or disk
//! - Serialize operations on the same name through the lock registry
//! - Write containers atomically (temp file + rename)
//! - Enumerate stored files from container headers
//! - Clean up temp files left behind by a crash

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::container::{self, Container, ContainerHeader, Payload, MAX_NAME_LEN};
use crate::error::{FsStoreError, Result};
use crate::lock::LockRegistry;
use crate::naming::{self, PhysicalName};

/// Metadata of one stored file, as recorded in its container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Logical name stored inside the container
    pub name: String,
    /// Payload size in bytes
    pub size: u64,
    /// Epoch milliseconds at write time
    pub created_at_ms: i64,
}

impl From<&ContainerHeader> for FileRecord {
    fn from(header: &ContainerHeader) -> Self {
        Self {
            name: header.name.clone(),
            size: header.data_size,
            created_at_ms: header.created_at_ms,
        }
    }
}

/// The main storage engine
///
/// ## Concurrency Model: Per-name Exclusive Locks
///
/// - **create / delete / read**: hold the lock of their name for the whole
///   operation, including file I/O
/// - **list**: takes each entry's lock only while reading that entry's header
/// - Operations on different names run fully in parallel
///
/// There is no cancellation: a slow payload source keeps its name locked, and
/// a listing that reaches the same name waits for the write to finish.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Per-name locks, keyed by physical name
    locks: LockRegistry,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the configuration
    /// 2. Create the data directory if it doesn't exist
    /// 3. Remove temp files left by interrupted writes
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Validate config
        config.validate()?;

        // Step 2: Create data directory
        fs::create_dir_all(&config.data_dir)?;

        // Step 3: Purge stale temp files
        let purged = Self::purge_temp_files(&config.data_dir)?;
        if purged > 0 {
            info!(purged, dir = %config.data_dir.display(), "Removed interrupted writes");
        }

        Ok(Self {
            config,
            locks: LockRegistry::new(),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Store `size` bytes from `payload` under `name`
    ///
    /// Steps:
    /// 1. Validate name length and size
    /// 2. Acquire the name's lock
    /// 3. Re-check existence now that the lock is held
    /// 4. Stream a fresh container into a temp file and rename it into place
    ///
    /// With `overwrite == false` an existing file is left untouched and
    /// `AlreadyExists` is returned. On failure any previous content survives.
    ///
    /// The lock is held while `payload` is read; a stalled source blocks
    /// every other operation on this name, including listings that reach it.
    /// A failed create of a name that had no file leaves no registry entry.
    pub fn create<R: Read>(&self, name: &str, size: u64, payload: R, overwrite: bool) -> Result<()> {
        // Step 1: Validation (no lock, no I/O)
        self.validate(name, size)?;

        // Step 2: Exclusive access to the name
        let physical = PhysicalName::from_logical(name);
        let guard = self.locks.acquire(&physical);

        // Step 3: Existence check under the lock
        let path = self.physical_path(&physical);
        let existed = path.try_exists()?;
        if existed && !overwrite {
            debug!(name, "Create rejected, file already exists");
            return Err(FsStoreError::AlreadyExists(name.to_string()));
        }

        // Step 4: Atomic write
        let container = Container::new(name, size, payload);
        if let Err(e) = self.write_container(&physical, container) {
            // Nothing was published, so a fresh name must not keep an entry
            if !existed {
                self.locks.release_and_forget(guard);
            }
            debug!(name, error = %e, "Create failed");
            return Err(e);
        }
        drop(guard);

        debug!(name, size, replaced = existed, physical = %physical, "File stored");
        Ok(())
    }

    /// Delete the file stored under `name`
    ///
    /// The name's lock is taken first so the delete cannot interleave with a
    /// create, read, or listing of the same name. Its registry entry is then
    /// removed whatever the outcome, and waiters move to a fresh lock.
    pub fn delete(&self, name: &str) -> Result<()> {
        let physical = PhysicalName::from_logical(name);
        let guard = self.locks.acquire(&physical);

        let result = match fs::remove_file(self.physical_path(&physical)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FsStoreError::DoesNotExist(name.to_string()))
            }
            Err(e) => Err(FsStoreError::Io(e)),
        };

        self.locks.release_and_forget(guard);

        match &result {
            Ok(()) => debug!(name, physical = %physical, "File deleted"),
            Err(e) => debug!(name, error = %e, "Delete failed"),
        }
        result
    }

    /// List up to `limit` stored files (capped at `max_list_size`)
    ///
    /// Records come from the container headers, in directory order. Files
    /// deleted between the scan and the read are skipped; any other failure
    /// aborts the listing.
    pub fn list(&self, limit: usize) -> Result<Vec<FileRecord>> {
        let limit = limit.min(self.config.max_list_size);
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.config.data_dir)? {
            if records.len() >= limit {
                break;
            }

            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(physical) = file_name.to_str().and_then(PhysicalName::from_file_name) else {
                continue;
            };

            let guard = self.locks.acquire(&physical);
            match self.read_record(&physical, entry.path())? {
                Some(record) => records.push(record),
                None => {
                    debug!(physical = %physical, "File vanished during listing, skipping");
                    self.locks.release_and_forget(guard);
                }
            }
        }

        Ok(records)
    }

    /// Run `f` over the stored container of `name` while its lock is held
    ///
    /// `f` receives the decoded header and the unread payload stream. The
    /// lock is held for as long as `f` runs; a slow sink inside `f` blocks
    /// every other operation on this name, including listings that reach it.
    pub fn read<F, T>(&self, name: &str, f: F) -> Result<T>
    where
        F: FnOnce(&ContainerHeader, &mut Payload<BufReader<File>>) -> Result<T>,
    {
        let physical = PhysicalName::from_logical(name);
        let guard = self.locks.acquire(&physical);

        let file = match File::open(self.physical_path(&physical)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.locks.release_and_forget(guard);
                return Err(FsStoreError::DoesNotExist(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut container = container::decode(BufReader::new(file))?;
        if container.header.name != name {
            warn!(name, stored = %container.header.name, physical = %physical, "Physical name collision");
            return Err(FsStoreError::InvalidFormat(format!(
                "{} holds '{}', not '{}'",
                physical, container.header.name, name
            )));
        }

        let result = f(&container.header, &mut container.payload);
        drop(guard);
        result
    }

    /// Copy the payload of `name` into `sink`, verifying its length
    pub fn read_to<W: Write + ?Sized>(&self, name: &str, sink: &mut W) -> Result<FileRecord> {
        self.read(name, |header, payload| {
            payload.copy_to(sink)?;
            Ok(FileRecord::from(header))
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of names with a live lock entry
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Path of the container that stores (or would store) `name`
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.physical_path(&PhysicalName::from_logical(name))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn validate(&self, name: &str, size: u64) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(FsStoreError::NameTooLong { len: name.len() });
        }
        if size > self.config.max_file_size {
            return Err(FsStoreError::TooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        if size == 0 {
            return Err(FsStoreError::EmptyPayload);
        }
        Ok(())
    }

    fn physical_path(&self, physical: &PhysicalName) -> PathBuf {
        self.config.data_dir.join(physical.as_str())
    }

    /// Encode into `<physical>.tmp`, then rename over the physical path
    ///
    /// Caller must hold the name's lock.
    fn write_container<R: Read>(&self, physical: &PhysicalName, container: Container<R>) -> Result<()> {
        let temp_path = self.config.data_dir.join(physical.temp_file_name());
        let final_path = self.physical_path(physical);

        let result = (|| -> Result<()> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp_path)?;

            let mut writer = BufWriter::new(file);
            container::encode(container, &mut writer)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;

            if self.config.sync_writes {
                file.sync_all()?;
            }
            drop(file);

            fs::rename(&temp_path, &final_path)?;
            Ok(())
        })();

        if result.is_err() {
            if let Err(e) = fs::remove_file(&temp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
                }
            }
        }
        result
    }

    /// Decode one header for listing
    ///
    /// Caller must hold the entry's lock. Returns `None` if the file is gone.
    fn read_record(&self, physical: &PhysicalName, path: PathBuf) -> Result<Option<FileRecord>> {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header = container::decode_header(&mut BufReader::new(file))?;
        if PhysicalName::from_logical(&header.name) != *physical {
            return Err(FsStoreError::InvalidFormat(format!(
                "{} holds '{}', which belongs under another name",
                physical, header.name
            )));
        }

        Ok(Some(FileRecord::from(&header)))
    }

    /// Remove `*.fs.tmp` files; returns how many were removed
    fn purge_temp_files(dir: &Path) -> Result<usize> {
        let mut removed = 0;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(naming::is_temp);
            if !is_temp || !entry.file_type()?.is_file() {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file"),
            }
        }

        Ok(removed)
    }
}
