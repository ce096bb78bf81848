pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{Collection, Document, EntityStore, Patch, Query, from_document, to_document};
