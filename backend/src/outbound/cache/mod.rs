//! Key/value cache adapters.
//!
//! - [`FileCache`]: one JSON file per key under a directory, named by the
//!   SHA-256 digest of the key. Survives restarts and is shared between
//!   worker processes on one host.
//! - [`MemoryCache`]: a concurrent map, for tests and single-process runs.
//!
//! Both treat an expired entry as absent. Neither bounds its size.

mod file_cache;
mod memory_cache;

pub use file_cache::FileCache;
pub use memory_cache::MemoryCache;
