//! Database layer for Hearth
//!
//! A [`DocumentStore`] is injected into the services at startup: MongoDB in
//! production, an in-memory store in dev mode and tests.

#[cfg(test)]
pub(crate) mod interleave;
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{IntoIndexes, MongoStore};
pub use store::{new_id, Collection, DocumentStore, Schema};
