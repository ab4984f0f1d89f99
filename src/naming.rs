//! Physical naming
//!
//! Maps a logical file name to the name of the container file that holds it.
//! The mapping depends on the logical name only, so a file keeps its physical
//! name across overwrites.
//!
//! Physical names are `<sha256-hex>.fs`. Distinct logical names can collide in
//! principle; the engine detects this on read by comparing the logical name
//! stored inside the container.

use std::fmt;

use sha2::{Digest, Sha256};

/// Suffix marking a managed container file
pub const MANAGED_SUFFIX: &str = ".fs";

/// Suffix appended to a physical name while its container is being written
pub const TEMP_SUFFIX: &str = ".tmp";

/// Length of the hex digest part of a physical name
pub const DIGEST_HEX_LEN: usize = 64;

/// Name of a container file inside the data directory
///
/// Also the key of the lock registry, so operations that start from a logical
/// name and listings that start from a directory entry share one lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalName(String);

impl PhysicalName {
    /// Derive the physical name of a logical name
    pub fn from_logical(logical: &str) -> Self {
        let digest = Sha256::digest(logical.as_bytes());
        Self(format!("{}{}", hex::encode(digest), MANAGED_SUFFIX))
    }

    /// Accept a directory entry name if it carries the managed suffix
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if is_managed(file_name) {
            Some(Self(file_name.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used while the container is being written
    pub fn temp_file_name(&self) -> String {
        format!("{}{}", self.0, TEMP_SUFFIX)
    }
}

impl fmt::Display for PhysicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the physical name of a logical name
pub fn physical_name(logical: &str) -> PhysicalName {
    PhysicalName::from_logical(logical)
}

/// Whether a directory entry name denotes a managed container
pub fn is_managed(file_name: &str) -> bool {
    file_name.len() > MANAGED_SUFFIX.len() && file_name.ends_with(MANAGED_SUFFIX)
}

/// Whether a directory entry name is a leftover in-progress write
pub fn is_temp(file_name: &str) -> bool {
    file_name
        .strip_suffix(TEMP_SUFFIX)
        .is_some_and(is_managed)
}
