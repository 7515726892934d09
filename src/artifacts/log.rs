//! Commit history traversal.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;

/// Linear history of a commit, newest first, following first parents only.
///
/// Second parents are deliberately not traversed: after a merge the walk
/// keeps to the first-parent line, so the merged-in side's ancestry is not
/// visible here. Log, blame and the rebase pick list all share this walk;
/// the merge base search does its own full-DAG traversal instead.
pub fn history(database: &Database, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut history = Vec::new();
    let mut current = Some(start.clone());

    while let Some(oid) = current {
        let commit = database.load_commit(&oid)?;
        history.push(oid);
        current = commit.parent().cloned();
    }

    Ok(history)
}
