// # Marker Stores
//
// Implementations of the `MarkerStore` trait: a file-backed store for
// production (one timestamp file per domain, survives restarts) and an
// in-memory store for tests.

pub mod file;
pub mod memory;

pub use file::FileMarkerStore;
pub use memory::MemoryMarkerStore;
