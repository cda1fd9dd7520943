//! Adapter implementations
//!
//! Adapters implement the repository ports with concrete storage:
//! - DuckDB for on-disk persistence
//! - In-memory maps for tests and embedding

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbRepository;
pub use self::memory::MemoryRepository;
