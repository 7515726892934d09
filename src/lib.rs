//! twig - a small content-addressable version control engine
//!
//! The crate is split into three layers:
//!
//! - `areas`: the persistent storage areas (object database, staging index,
//!   refs, working tree) and the repository facade that wires them together
//! - `artifacts`: data structures and algorithms (objects, merge, diff,
//!   blame, history traversal, ignore rules)
//! - `commands`: porcelain commands, one file per user-facing operation

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod error;
