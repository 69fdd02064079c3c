//! Deterministic ordering and local filtering of document lists.
//!
//! # Invariants
//! - Pinned documents precede unpinned ones; within each group the most
//!   recently updated comes first.
//! - Sorting is stable: equal keys keep input order, so ordering is idempotent.
//! - The local text filter preserves the order of its input.
//! - Text matching folds case with [`fold_case`], the same folding the store
//!   registers for its SQL searches.

use crate::model::document::Document;
use std::cmp::Reverse;

/// Orders documents pinned-first, then by `updated_at` descending.
pub fn order_documents<D: Document>(mut documents: Vec<D>) -> Vec<D> {
    sort_documents(&mut documents);
    documents
}

/// In-place variant of [`order_documents`].
pub fn sort_documents<D: Document>(documents: &mut [D]) {
    // slice::sort_by_key is stable.
    documents.sort_by_key(|document| (!document.is_pinned(), Reverse(document.updated_at())));
}

/// Unicode lowercase used for every case-insensitive comparison.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Case-insensitive substring match on title or body.
///
/// A blank query matches everything.
pub fn filter_by_text<D: Document>(documents: &[D], query: &str) -> Vec<D> {
    let needle = fold_case(query.trim());
    if needle.is_empty() {
        return documents.to_vec();
    }
    documents
        .iter()
        .filter(|document| {
            fold_case(document.title()).contains(&needle)
                || fold_case(document.body()).contains(&needle)
        })
        .cloned()
        .collect()
}

/// Drops archived documents unless `show_archived` is set.
pub fn filter_archived<D: Document>(documents: Vec<D>, show_archived: bool) -> Vec<D> {
    if show_archived {
        return documents;
    }
    documents
        .into_iter()
        .filter(|document| !document.is_archived())
        .collect()
}
