//! Session collection implementations

mod memory;
mod traits;

pub use memory::MemoryCollection;
pub use traits::SessionCollection;

#[cfg(feature = "mongodb-store")]
mod mongo_store;

#[cfg(feature = "mongodb-store")]
pub use mongo_store::MongoCollection;
