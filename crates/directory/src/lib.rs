//! Flat-file contact directory for Courier.
//!
//! Persists contacts as a JSON list-of-records document with whole-file
//! atomic rewrites, and exposes them through `courier_core`'s
//! `ContactStore` trait. Matching semantics (exact-then-fuzzy) live in
//! `courier_core::contacts::matching` so every store behaves identically.

pub mod file_store;

pub use file_store::FileContactStore;
