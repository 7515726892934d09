//! Three-way tree merge.
//!
//! Operates on flattened `path -> blob id` snapshots of the two sides and
//! their merge base. The per-path policy:
//!
//! - unchanged from base on both sides: keep the base entry
//! - changed on exactly one side (including deletion): take that side
//! - changed identically on both sides: take the shared entry
//! - changed differently on both sides (including delete-vs-modify):
//!   record a conflict; the merged snapshot keeps one side's entry as a
//!   placeholder until the conflict is resolved and re-staged
//!
//! Conflicts carry the full text of both sides so the caller can
//! materialize conflict markers into the working tree and the index.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

/// A path whose content diverged irreconcilably between the merge sides.
/// `None` content means that side deleted the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub path: String,
    pub ours: Option<String>,
    pub theirs: Option<String>,
}

/// Outcome of a three-way merge: the merged snapshot plus any conflicts.
#[derive(Debug, Clone)]
pub struct MergedTree {
    pub entries: BTreeMap<String, ObjectId>,
    pub conflicts: Vec<Conflict>,
}

impl MergedTree {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Merge `ours` and `theirs` against their common `base`.
pub fn merge_trees(
    database: &Database,
    ours: &BTreeMap<String, ObjectId>,
    theirs: &BTreeMap<String, ObjectId>,
    base: &BTreeMap<String, ObjectId>,
) -> anyhow::Result<MergedTree> {
    let mut entries = BTreeMap::new();
    let mut conflicts = Vec::new();

    let paths: BTreeSet<&String> = ours.keys().chain(theirs.keys()).chain(base.keys()).collect();

    for path in paths {
        let base_entry = base.get(path);
        let our_entry = ours.get(path);
        let their_entry = theirs.get(path);

        let ours_changed = our_entry != base_entry;
        let theirs_changed = their_entry != base_entry;

        let merged = match (ours_changed, theirs_changed) {
            (false, false) => base_entry,
            (true, false) => our_entry,
            (false, true) => their_entry,
            (true, true) if our_entry == their_entry => our_entry,
            (true, true) => {
                conflicts.push(Conflict {
                    path: path.clone(),
                    ours: load_content(database, our_entry)?,
                    theirs: load_content(database, their_entry)?,
                });
                // placeholder entry, pending conflict resolution
                our_entry.or(their_entry)
            }
        };

        if let Some(oid) = merged {
            entries.insert(path.clone(), oid.clone());
        }
    }

    Ok(MergedTree { entries, conflicts })
}

fn load_content(database: &Database, entry: Option<&ObjectId>) -> anyhow::Result<Option<String>> {
    entry
        .map(|oid| Ok(database.load_blob(oid)?.content().to_string()))
        .transpose()
}

/// Render conflict markers for a conflicted path, ready to be written into
/// the working tree.
pub fn conflict_markers(conflict: &Conflict, theirs_label: &str) -> String {
    let mut marked = String::from("<<<<<<< HEAD\n");
    if let Some(ours) = &conflict.ours {
        marked.push_str(ours);
        if !ours.is_empty() && !ours.ends_with('\n') {
            marked.push('\n');
        }
    }
    marked.push_str("=======\n");
    if let Some(theirs) = &conflict.theirs {
        marked.push_str(theirs);
        if !theirs.is_empty() && !theirs.ends_with('\n') {
            marked.push('\n');
        }
    }
    marked.push_str(&format!(">>>>>>> {theirs_label}\n"));

    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use pretty_assertions::assert_eq;

    fn temp_database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().expect("failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    fn snapshot(database: &Database, files: &[(&str, &str)]) -> BTreeMap<String, ObjectId> {
        files
            .iter()
            .map(|(path, content)| {
                let oid = database.store(&Blob::new(content.to_string())).unwrap();
                (path.to_string(), oid)
            })
            .collect()
    }

    #[test]
    fn disjoint_additions_merge_cleanly() {
        let (_dir, database) = temp_database();
        let base = snapshot(&database, &[("f1", "x")]);
        let ours = snapshot(&database, &[("f1", "x"), ("f2", "y")]);
        let theirs = snapshot(&database, &[("f1", "x"), ("f3", "z")]);

        let merged = merge_trees(&database, &ours, &theirs, &base).unwrap();

        assert!(merged.is_clean());
        assert_eq!(
            merged.entries.keys().collect::<Vec<_>>(),
            vec!["f1", "f2", "f3"]
        );
    }

    #[test]
    fn both_sides_changing_one_path_conflicts() {
        let (_dir, database) = temp_database();
        let base = snapshot(&database, &[("f1", "x")]);
        let ours = snapshot(&database, &[("f1", "a")]);
        let theirs = snapshot(&database, &[("f1", "b")]);

        let merged = merge_trees(&database, &ours, &theirs, &base).unwrap();

        assert_eq!(
            merged.conflicts,
            vec![Conflict {
                path: "f1".to_string(),
                ours: Some("a".to_string()),
                theirs: Some("b".to_string()),
            }]
        );
        // a placeholder entry survives for the conflicted path
        assert_eq!(merged.entries.get("f1"), ours.get("f1"));
    }

    #[test]
    fn single_sided_deletion_wins() {
        let (_dir, database) = temp_database();
        let base = snapshot(&database, &[("f1", "x"), ("f2", "y")]);
        let ours = snapshot(&database, &[("f1", "x")]);
        let theirs = snapshot(&database, &[("f1", "x"), ("f2", "y")]);

        let merged = merge_trees(&database, &ours, &theirs, &base).unwrap();

        assert!(merged.is_clean());
        assert!(!merged.entries.contains_key("f2"));
    }

    #[test]
    fn deletion_against_modification_conflicts() {
        let (_dir, database) = temp_database();
        let base = snapshot(&database, &[("f1", "x")]);
        let ours = snapshot(&database, &[]);
        let theirs = snapshot(&database, &[("f1", "changed")]);

        let merged = merge_trees(&database, &ours, &theirs, &base).unwrap();

        assert_eq!(
            merged.conflicts,
            vec![Conflict {
                path: "f1".to_string(),
                ours: None,
                theirs: Some("changed".to_string()),
            }]
        );
        // with ours deleted, theirs' entry is kept as the placeholder
        assert_eq!(merged.entries.get("f1"), theirs.get("f1"));
    }

    #[test]
    fn identical_changes_on_both_sides_agree() {
        let (_dir, database) = temp_database();
        let base = snapshot(&database, &[("f1", "x")]);
        let ours = snapshot(&database, &[("f1", "same")]);
        let theirs = snapshot(&database, &[("f1", "same")]);

        let merged = merge_trees(&database, &ours, &theirs, &base).unwrap();

        assert!(merged.is_clean());
        assert_eq!(merged.entries.get("f1"), ours.get("f1"));
    }

    #[test]
    fn conflict_markers_frame_both_sides() {
        let conflict = Conflict {
            path: "f1".to_string(),
            ours: Some("mine\n".to_string()),
            theirs: Some("yours".to_string()),
        };

        assert_eq!(
            conflict_markers(&conflict, "topic"),
            "<<<<<<< HEAD\nmine\n=======\nyours\n>>>>>>> topic\n"
        );
    }
}
