#![forbid(unsafe_code)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", env!("CARGO_PKG_README")))]

mod trace;
mod node;
pub mod trie;

pub use trie::{PatriciaTrie, Insertion, Entries, Values};
