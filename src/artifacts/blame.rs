//! Per-line commit attribution.
//!
//! Walks the linear history from HEAD and, for every line of the file's
//! current version, pushes the attribution to the oldest commit whose
//! snapshot still holds the identical text at the same line index. A line
//! is finalized the first time the text at its index differs (or the file
//! is absent or shorter there).
//!
//! This is a position heuristic, not content tracking: a line that moves to
//! a different index appears modified even when its text is unchanged.

use crate::areas::database::Database;
use crate::artifacts::log;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::TwigError;
use std::collections::HashMap;

/// One attributed line of the file's current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    pub oid: ObjectId,
    pub author: String,
    pub line: String,
}

/// Attribute every line of `path` as of `head`.
///
/// Errors with `NotFound` when the HEAD snapshot does not contain the path.
pub fn blame(database: &Database, head: &ObjectId, path: &str) -> anyhow::Result<Vec<BlameLine>> {
    let history = log::history(database, head)?;

    let head_snapshot = database.flatten_commit_tree(head)?;
    let blob_oid = head_snapshot
        .get(path)
        .ok_or_else(|| TwigError::NotFound(format!("file {path} in HEAD snapshot")))?;

    let blob = database.load_blob(blob_oid)?;
    let current_lines = blob
        .lines()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut attributions = vec![head.clone(); current_lines.len()];
    let mut finalized = vec![false; current_lines.len()];

    for commit_oid in history.iter().skip(1) {
        if finalized.iter().all(|done| *done) {
            break;
        }

        let snapshot = database.flatten_commit_tree(commit_oid)?;
        let Some(blob_oid) = snapshot.get(path) else {
            // the file does not exist this far back; every still-open line
            // keeps its current (newer) attribution
            break;
        };

        let blob = database.load_blob(blob_oid)?;
        let lines = blob.lines();

        for (index, current_line) in current_lines.iter().enumerate() {
            if finalized[index] {
                continue;
            }
            if lines.get(index) == Some(&current_line.as_str()) {
                attributions[index] = commit_oid.clone();
            } else {
                finalized[index] = true;
            }
        }
    }

    let mut authors = HashMap::<ObjectId, String>::new();
    attributions
        .into_iter()
        .zip(current_lines)
        .map(|(oid, line)| {
            let author = match authors.get(&oid) {
                Some(author) => author.clone(),
                None => {
                    let author = database.load_commit(&oid)?.author().name().to_string();
                    authors.insert(oid.clone(), author.clone());
                    author
                }
            };

            Ok(BlameLine { oid, author, line })
        })
        .collect()
}
