//! Storage abstraction layer
//!
//! Trait seams for the atomic writer and checkpoint storage, plus the factory
//! that wires the configured implementations.

pub mod factory;
pub mod traits;

pub use factory::{create_state_storage, create_storage, StorageHandles};
pub use traits::{AtomicWriter, StateStorage, WriteBatchBounds};
