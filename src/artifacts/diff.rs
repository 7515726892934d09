//! Line-oriented diff engine.
//!
//! The algorithm is a greedy alignment, not a minimal-edit-distance search:
//! both sequences advance together while lines are equal; on a mismatch the
//! left side is scanned forward collecting lines absent from the right
//! sequence as deletions and the right side collecting lines absent from
//! the left as insertions, then synchronized scanning resumes. Unmatched
//! tails are flushed as pure deletions/insertions. The produced script
//! always reconciles the left sequence into the right one, but it is not
//! guaranteed minimal - that is the defined behavior of this engine, not a
//! defect.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Line present on both sides.
    Equal(String),
    /// Line removed from the left sequence.
    Delete(String),
    /// Line added by the right sequence.
    Insert(String),
}

/// Compute the edit script turning `a` into `b`.
pub fn compute(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let in_a: HashSet<&str> = a.iter().copied().collect();
    let in_b: HashSet<&str> = b.iter().copied().collect();

    let mut script = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            script.push(Edit::Equal(a[i].to_string()));
            i += 1;
            j += 1;
            continue;
        }

        let mut advanced = false;
        while i < a.len() && !in_b.contains(a[i]) {
            script.push(Edit::Delete(a[i].to_string()));
            i += 1;
            advanced = true;
        }
        while j < b.len() && !in_a.contains(b[j]) {
            script.push(Edit::Insert(b[j].to_string()));
            j += 1;
            advanced = true;
        }

        // Both current lines occur somewhere on the other side (crossed
        // lines). Treat the left line as deleted so the scan advances; the
        // right line is emitted later, either as an equality or through the
        // insertion tail.
        if !advanced && i < a.len() && j < b.len() && a[i] != b[j] {
            script.push(Edit::Delete(a[i].to_string()));
            i += 1;
        }
    }

    while i < a.len() {
        script.push(Edit::Delete(a[i].to_string()));
        i += 1;
    }
    while j < b.len() {
        script.push(Edit::Insert(b[j].to_string()));
        j += 1;
    }

    script
}
