//! Durable embedding store on LanceDB.
//!
//! Owns a single directory: passages are persisted as vectors + text +
//! metadata via Arrow record batches. Builds are destructive full rebuilds;
//! reads reconnect without recomputation. Single writer (ingest),
//! multiple readers (queries); no concurrent writers assumed.

pub mod schema;
pub mod store;

pub use store::{store_exists, VectorStore};
