//! Merge algorithms: merge base search and three-way tree merging.

pub mod merge_base;
pub mod tree_merge;
