//! Key-value storage for client-side state.
//!
//! - [`RedbStore`]: durable, file-backed (survives restarts).
//! - [`MemoryStore`]: in-process, for tests and ephemeral servers.
//! - [`ScopedKV`]: namespaces another store under a fixed prefix, used to
//!   keep session keys apart per API origin.

pub mod error;
pub mod memory;
pub mod redb;
pub mod scoped;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use scoped::ScopedKV;
pub use traits::KVStore;
