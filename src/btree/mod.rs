//! Fixed fan-out B+-tree over `i32` keys and `i32` payloads.

mod node;
mod tree;

pub use tree::Tree;
