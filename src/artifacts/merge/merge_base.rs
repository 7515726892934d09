//! Merge base search.
//!
//! Finds a lowest common ancestor of two commits over the full commit DAG.
//! Unlike the linear history walk in `artifacts::log`, this traversal
//! follows *both* parent links, so ancestry on either side of past merges
//! stays visible.
//!
//! The search runs in two phases:
//!
//! 1. breadth-first reachability from each input commit, marking every
//!    visited commit with the side(s) it was reached from; commits marked
//!    from both sides are common ancestors
//! 2. elimination: a common ancestor that is a proper ancestor of another
//!    common ancestor is redundant and dropped
//!
//! With criss-cross histories more than one best candidate can survive
//! phase 2; the one discovered first from the source side is returned so
//! the result is deterministic.

use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};

/// Debug logging for the search, enabled with the `debug_merge` feature.
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Reach: u8 {
        const FROM_SOURCE = 0b01;
        const FROM_TARGET = 0b10;
        const FROM_BOTH = Self::FROM_SOURCE.bits() | Self::FROM_TARGET.bits();
    }
}

/// Merge base finder, generic over how parents are loaded so it works
/// against the object database or an in-memory graph in tests.
pub struct MergeBaseFinder<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parents_of: ParentsFn,
}

impl<ParentsFn> MergeBaseFinder<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_of: ParentsFn) -> Self {
        Self { parents_of }
    }

    /// Find a lowest common ancestor of `source` and `target`, or None when
    /// their histories are disjoint.
    pub fn find(&self, source: &ObjectId, target: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let mut reach = HashMap::<ObjectId, Reach>::new();
        let mut discovery_order = Vec::new();

        self.mark_reachable(source, Reach::FROM_SOURCE, &mut reach, &mut discovery_order)?;
        self.mark_reachable(target, Reach::FROM_TARGET, &mut reach, &mut discovery_order)?;

        let common = discovery_order
            .iter()
            .filter(|oid| reach[*oid].contains(Reach::FROM_BOTH))
            .cloned()
            .collect::<Vec<_>>();

        debug_log!(
            "common ancestors of {} and {}: [{}]",
            source.to_short_oid(),
            target.to_short_oid(),
            common
                .iter()
                .map(|oid| oid.to_short_oid().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        if common.is_empty() {
            return Ok(None);
        }

        // Phase 2: drop every common ancestor that another common ancestor
        // can reach through its parents.
        let candidates = common.iter().cloned().collect::<HashSet<_>>();
        let mut redundant = HashSet::<ObjectId>::new();
        for commit in &common {
            if redundant.contains(commit) {
                continue;
            }
            self.mark_proper_ancestors(commit, &candidates, &mut redundant)?;
        }

        debug_log!(
            "redundant ancestors: [{}]",
            redundant
                .iter()
                .map(|oid| oid.to_short_oid().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(common.into_iter().find(|oid| !redundant.contains(oid)))
    }

    /// Breadth-first walk over both parent links, or-ing `side` into the
    /// reach state of every visited commit.
    fn mark_reachable(
        &self,
        start: &ObjectId,
        side: Reach,
        reach: &mut HashMap<ObjectId, Reach>,
        discovery_order: &mut Vec<ObjectId>,
    ) -> anyhow::Result<()> {
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(oid) = queue.pop_front() {
            let state = reach.entry(oid.clone()).or_insert(Reach::empty());
            if state.contains(side) {
                continue;
            }
            if state.is_empty() {
                discovery_order.push(oid.clone());
            }
            *state |= side;

            for parent in (self.parents_of)(&oid)? {
                queue.push_back(parent);
            }
        }

        Ok(())
    }

    /// Mark every proper ancestor of `start` that is also a candidate.
    fn mark_proper_ancestors(
        &self,
        start: &ObjectId,
        candidates: &HashSet<ObjectId>,
        marked: &mut HashSet<ObjectId>,
    ) -> anyhow::Result<()> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from((self.parents_of)(start)?);

        while let Some(oid) = queue.pop_front() {
            if !visited.insert(oid.clone()) {
                continue;
            }
            if candidates.contains(&oid) {
                marked.insert(oid.clone());
            }
            for parent in (self.parents_of)(&oid)? {
                queue.push_back(parent);
            }
        }

        Ok(())
    }
}
