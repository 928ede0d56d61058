//! BTree-based priority multimap indexed both by value and by key.
//!
//! [`DualIndexMultiMap`] keeps every `(key, value)` entry in two sorted
//! indexes sharing the same records: one ordered by value, giving the
//! minimum and maximum entries, the other ordered by key, used to find and
//! replace the value associated to a key.
//!
//! ```
//! use btree_dual_index::{DualIndexMultiMap, Error};
//!
//! let mut tasks = DualIndexMultiMap::new();
//! tasks.insert("build", 3);
//! tasks.insert("test", 1);
//! tasks.insert("deploy", 7);
//!
//! assert_eq!(tasks.min_key(), Ok(&"test"));
//! tasks.change_value("deploy", 0).unwrap();
//! assert_eq!(tasks.min_key(), Ok(&"deploy"));
//!
//! tasks.delete_min();
//! assert_eq!(tasks.max_value(), Ok(&3));
//! assert_eq!(tasks.change_value("release", 2), Err(Error::KeyNotFound));
//! ```
mod arena;
mod error;
mod link;
mod order;

mod multi_map;
pub use error::*;
pub use multi_map::*;

mod r#impl;
#[allow(unused_imports)]
pub use r#impl::*;
