//! Storage infrastructure - DB adapter implementations

mod in_memory;

pub use in_memory::InMemoryCollectionStore;

#[cfg(test)]
pub(crate) use in_memory::fixtures;
