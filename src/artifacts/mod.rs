//! Data structures and algorithms
//!
//! - `objects`: object types (blob, tree, commit) and their on-disk encoding
//! - `merge`: merge base search and three-way tree merging
//! - `diff`: line-oriented diff engine
//! - `blame`: per-line commit attribution
//! - `log`: commit history traversal
//! - `ignore`: ignore-rule matching

pub mod blame;
pub mod diff;
pub mod ignore;
pub mod log;
pub mod merge;
pub mod objects;
