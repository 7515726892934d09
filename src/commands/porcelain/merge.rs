use crate::areas::repository::Repository;
use crate::artifacts::merge::merge_base::MergeBaseFinder;
use crate::artifacts::merge::tree_merge::{conflict_markers, merge_trees};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::error::TwigError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Merge a branch into the current HEAD.
    ///
    /// Conflicts are a normal outcome, not a failure: the markers are
    /// already written and staged when they are reported here.
    pub fn merge(&self, branch: &str) -> anyhow::Result<()> {
        match self.try_merge(branch) {
            Err(err) => match err.downcast::<TwigError>() {
                Ok(TwigError::MergeConflict { conflicts }) => {
                    writeln!(
                        self.writer(),
                        "Merge conflict detected. Resolve the conflicts, stage the results and commit."
                    )?;
                    for conflict in &conflicts {
                        writeln!(
                            self.writer(),
                            "{}",
                            format!("CONFLICT (content): {}", conflict.path).red()
                        )?;
                    }
                    Ok(())
                }
                Ok(other) => Err(other.into()),
                Err(err) => Err(err),
            },
            result => result,
        }
    }

    fn try_merge(&self, branch: &str) -> anyhow::Result<()> {
        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| TwigError::NotFound("HEAD commit (no commits yet)".to_string()))?;
        let target_oid = self.refs().branch_commit(branch)?;

        if head_oid == target_oid {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let finder = MergeBaseFinder::new(|oid: &ObjectId| {
            Ok(self.database().load_commit(oid)?.parents().to_vec())
        });
        let base_oid = finder.find(&head_oid, &target_oid)?.ok_or_else(|| {
            TwigError::NotFound(format!("common ancestor of HEAD and {branch}"))
        })?;

        let ours = self.database().flatten_commit_tree(&head_oid)?;
        let theirs = self.database().flatten_commit_tree(&target_oid)?;
        let base = self.database().flatten_commit_tree(&base_oid)?;

        let merged = merge_trees(self.database(), &ours, &theirs, &base)?;

        if !merged.is_clean() {
            // materialize the markers into the working tree and the index,
            // then stop short of committing
            let mut index = self.index();
            for conflict in &merged.conflicts {
                let marked = conflict_markers(conflict, branch);
                self.workspace().write_file(&conflict.path, &marked)?;

                let blob_oid = self.database().store(&Blob::new(marked))?;
                index.add(&conflict.path, blob_oid);
            }
            index.write_updates()?;

            return Err(TwigError::MergeConflict {
                conflicts: merged.conflicts,
            }
            .into());
        }

        let identity = self.identity()?;

        let tree = Tree::build(merged.entries.iter())?;
        tree.traverse(&|subtree| self.database().store(subtree).map(|_| ()))?;

        let commit = Commit::new(
            vec![head_oid, target_oid],
            tree.object_id()?,
            Author::new(identity.name, identity.email),
            format!("Merge branch '{branch}'"),
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_head(&commit_oid)?;
        self.reset_worktree_to(&commit_oid)?;

        let current = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        writeln!(self.writer(), "Merged branch '{branch}' into {current}")?;

        Ok(())
    }
}
