//! Response cache adapters

mod in_memory;

pub use in_memory::InMemoryResponseCache;
