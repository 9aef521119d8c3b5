pub mod cache;

pub use cache::{CacheOptions, EntryStatus, ResourceCache, ResourceState, Subscription};
