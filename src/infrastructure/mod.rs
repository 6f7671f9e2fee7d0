pub mod memory_store;
pub mod store;

pub use memory_store::MemoryStore;
pub use store::{AttemptStore, LoadedAttempt, TestCatalog};
