//! Set reconciliation for replace-all association updates.
//!
//! A request's labels and customer links are replaced wholesale on update:
//! the final set must equal the supplied set. Rather than deleting every row
//! and re-inserting, callers compute the delta with [`reconcile`] and only
//! write what changed.

use std::collections::BTreeSet;

/// The rows to insert and delete to turn `current` into `desired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<T> {
    /// Present in `desired` but not in `current`, in ascending order.
    pub to_add: Vec<T>,
    /// Present in `current` but not in `desired`, in ascending order.
    pub to_remove: Vec<T>,
}

impl<T> Reconciliation<T> {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the difference between the stored and the supplied association set.
///
/// Duplicates on either side collapse, so `["auth", "auth"]` is the same set
/// as `["auth"]`.
pub fn reconcile<T: Ord + Clone>(current: &[T], desired: &[T]) -> Reconciliation<T> {
    let current: BTreeSet<&T> = current.iter().collect();
    let desired: BTreeSet<&T> = desired.iter().collect();

    Reconciliation {
        to_add: desired.difference(&current).map(|v| (*v).clone()).collect(),
        to_remove: current.difference(&desired).map(|v| (*v).clone()).collect(),
    }
}

/// Trim labels, drop blanks, and remove duplicates while keeping first-seen order.
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}
