pub mod matching;
pub mod store;

pub use matching::{normalize, search_in, similarity, DEFAULT_MATCH_THRESHOLD};
pub use store::{upsert, ContactStore, InMemoryContactStore};
