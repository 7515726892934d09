use crate::areas::repository::Repository;
use crate::artifacts::log;
use crate::artifacts::merge::merge_base::MergeBaseFinder;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::error::TwigError;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Replay the current branch's commits on top of another branch.
    ///
    /// Replay overlays each commit's tree entries onto the tree it lands on
    /// (last write wins per path), it does not compute a patch: a commit
    /// replayed over a branch that touched the same file takes the replayed
    /// version silently.
    pub fn rebase(&self, branch: &str) -> anyhow::Result<()> {
        let current_branch = self
            .refs()
            .current_branch()?
            .context("cannot rebase with a detached HEAD")?;
        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| TwigError::NotFound("HEAD commit (no commits yet)".to_string()))?;
        let target_oid = self.refs().branch_commit(branch)?;

        if head_oid == target_oid {
            writeln!(self.writer(), "Already up to date. Nothing to rebase.")?;
            return Ok(());
        }

        let finder = MergeBaseFinder::new(|oid: &ObjectId| {
            Ok(self.database().load_commit(oid)?.parents().to_vec())
        });
        let base_oid = finder.find(&head_oid, &target_oid)?.ok_or_else(|| {
            TwigError::NotFound(format!("common ancestor of HEAD and {branch}"))
        })?;

        if base_oid == target_oid {
            writeln!(
                self.writer(),
                "{current_branch} is already based on {branch}. Nothing to do."
            )?;
            return Ok(());
        }

        let pending = self.commits_since(&head_oid, &base_oid)?;
        let identity = self.identity()?;

        // move onto the target commit (detached, so the target branch
        // pointer stays put while HEAD advances through the replay)
        self.reset_worktree_to(&target_oid)?;
        self.refs().set_head_detached(&target_oid)?;

        for oid in &pending {
            self.replay_commit(oid, &identity.name, &identity.email)
                .with_context(|| format!("rebase aborted: failed to replay commit {oid}"))?;
        }

        let new_tip = self
            .refs()
            .read_head()?
            .context("rebase lost track of HEAD")?;
        self.refs().update_branch(&current_branch, &new_tip)?;
        self.checkout(&current_branch)?;

        writeln!(
            self.writer(),
            "Successfully rebased {current_branch} onto {branch}."
        )?;

        Ok(())
    }

    /// Commits unique to `head` since `base`, oldest first.
    fn commits_since(&self, head: &ObjectId, base: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        let mut pending = Vec::new();
        let mut found_base = false;

        for oid in log::history(self.database(), head)? {
            if &oid == base {
                found_base = true;
                break;
            }
            pending.push(oid);
        }

        if !found_base {
            anyhow::bail!("merge base {base} is not in the linear history of {head}");
        }

        pending.reverse();
        Ok(pending)
    }

    fn replay_commit(&self, oid: &ObjectId, name: &str, email: &str) -> anyhow::Result<()> {
        let original = self.database().load_commit(oid)?;
        let head_oid = self
            .refs()
            .read_head()?
            .context("rebase lost track of HEAD")?;

        // overlay the replayed commit's entries onto the current tree
        let mut entries = self.database().flatten_commit_tree(&head_oid)?;
        entries.extend(self.database().flatten_commit_tree(oid)?);

        let tree = Tree::build(entries.iter())?;
        tree.traverse(&|subtree| self.database().store(subtree).map(|_| ()))?;

        let replayed = Commit::new(
            vec![head_oid],
            tree.object_id()?,
            Author::new(name.to_string(), email.to_string()),
            original.message().to_string(),
        );
        let replayed_oid = self.database().store(&replayed)?;
        self.refs().update_head(&replayed_oid)?;

        Ok(())
    }
}
