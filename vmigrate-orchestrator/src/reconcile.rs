//! Storage reconciliation
//!
//! Decides how a migration's selected mount points map onto the source
//! workload's storage. Pure set computation with no I/O.

use std::collections::BTreeSet;

/// How the requested selection relates to the source workload's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Selection and source storage are the same set; the source workload is
    /// provisioned as-is.
    FullMatch,
    /// Only these mount points are shared; a derived workload holding exactly
    /// them must be created.
    PartialMatch(BTreeSet<String>),
    /// Nothing selected belongs to the source.
    Impossible,
}

/// Compare `source_storage` with `selected` as sets.
///
/// Order and duplicates in either input do not affect the result.
pub fn reconcile<S, T>(source_storage: S, selected: T) -> Reconciliation
where
    S: IntoIterator,
    S::Item: AsRef<str>,
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let source: BTreeSet<String> = source_storage
        .into_iter()
        .map(|id| id.as_ref().to_owned())
        .collect();
    let selected: BTreeSet<String> = selected
        .into_iter()
        .map(|id| id.as_ref().to_owned())
        .collect();

    if source == selected {
        return Reconciliation::FullMatch;
    }

    let overlap: BTreeSet<String> = source.intersection(&selected).cloned().collect();
    if overlap.is_empty() {
        Reconciliation::Impossible
    } else {
        Reconciliation::PartialMatch(overlap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn same_members_in_any_order_is_full_match() {
        assert_eq!(reconcile(["a", "b"], ["b", "a"]), Reconciliation::FullMatch);
        assert_eq!(reconcile(["a", "b"], ["a", "b", "a"]), Reconciliation::FullMatch);
    }

    #[test]
    fn subset_selection_is_partial_match() {
        assert_eq!(
            reconcile(["a", "b"], ["b"]),
            Reconciliation::PartialMatch(set(&["b"]))
        );
    }

    #[test]
    fn selection_exceeding_source_keeps_only_overlap() {
        assert_eq!(
            reconcile(["a", "b"], ["b", "c"]),
            Reconciliation::PartialMatch(set(&["b"]))
        );
    }

    #[test]
    fn disjoint_selection_is_impossible() {
        assert_eq!(reconcile(["a", "b"], ["c"]), Reconciliation::Impossible);
    }

    #[test]
    fn empty_source_is_impossible() {
        let source: Vec<String> = Vec::new();
        assert_eq!(reconcile(&source, ["a"]), Reconciliation::Impossible);
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let forward = reconcile(["c", "a", "b"], ["b", "c", "d"]);
        let backward = reconcile(["b", "a", "c"], ["d", "c", "b"]);
        assert_eq!(forward, backward);
        assert_eq!(forward, Reconciliation::PartialMatch(set(&["b", "c"])));
    }
}
