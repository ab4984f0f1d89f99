//! # fsstore
//!
//! A single-node file storage service with:
//! - Self-describing binary containers, one per stored file
//! - Per-name exclusive locking (unrelated names never block each other)
//! - Atomic create/overwrite via temp file + rename
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Worker pool, one thread per client)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Storage Engine                             │
//! │              (create / delete / list / read)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌──────────────┐ ┌─────────────┐
//!   │Lock Registry│ │Physical Namer│ │  Container  │
//!   │  (RwLock)   │ │  (SHA-256)   │ │   Codec     │
//!   └─────────────┘ └──────────────┘ └──────┬──────┘
//!                                           │
//!                                           ▼
//!                                    ┌─────────────┐
//!                                    │  data_dir/  │
//!                                    │  <hex>.fs   │
//!                                    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod container;
pub mod naming;
pub mod lock;
pub mod engine;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FsStoreError, Result};
pub use config::Config;
pub use engine::{Engine, FileRecord};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fsstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
