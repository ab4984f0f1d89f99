//! Lock Module
//!
//! Per-name exclusive locks for the storage engine.
//!
//! ## Responsibilities
//! - At most one holder per name at a time
//! - No contention between unrelated names (beyond the brief registry lock)
//! - Lazy lock creation, removal on delete
//!
//! ## Concurrency Model
//! ```text
//!   acquire(name)
//!        │
//!        ▼
//!   ┌──────────────┐  hit   ┌─────────────────────┐
//!   │ map.read()   │───────►│ block on name lock  │──► NameGuard
//!   └──────┬───────┘        └──────────┬──────────┘
//!          │ miss                      │ retired while waiting
//!          ▼                           ▼
//!   ┌──────────────┐              retry from the top
//!   │ map.write()  │── re-check ──► insert lock already held ──► NameGuard
//!   └──────────────┘
//! ```

mod registry;

pub use registry::{LockRegistry, NameGuard};
