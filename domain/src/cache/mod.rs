//! Response cache domain

mod key;

pub use key::CacheKey;
