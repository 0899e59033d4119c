//! Parent-child queries over any [`RecordStore`].
//!
//! - How deep is a record (how many ancestors does it have)?
//! - Would placing a record under a given parent create a cycle?
//! - What does the whole tree of a content type look like, in display order?
//!
//! Cycles should never exist in a store the resequencer maintains, but
//! external edits can introduce them. Every walk carries a visited set and
//! stops at the first repeat instead of looping.

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};

use crate::model::{Record, RecordId, Status};
use crate::store::{RecordStore, SiblingQuery, SortOrder};

/// A record with its depth in the tree (0 for top-level records).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub record: Record,
    pub depth: usize,
}

/// Ancestor chain of `id`, from immediate parent up to the root.
///
/// Returns an empty vec for top-level or unknown records. The chain is
/// truncated at the first repeated id.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn ancestors<S>(store: &S, id: RecordId) -> Result<Vec<RecordId>>
where
    S: RecordStore + ?Sized,
{
    let mut chain = Vec::new();
    let mut visited = HashSet::from([id]);
    let mut current = store
        .get_parent_id(id)
        .with_context(|| format!("get_parent_id '{id}'"))?;

    while let Some(parent_id) = current {
        if !visited.insert(parent_id) {
            break;
        }
        chain.push(parent_id);
        current = store
            .get_parent_id(parent_id)
            .with_context(|| format!("get_parent_id '{parent_id}'"))?;
    }

    Ok(chain)
}

/// Number of ancestor records of `id`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn depth_of<S>(store: &S, id: RecordId) -> Result<usize>
where
    S: RecordStore + ?Sized,
{
    Ok(ancestors(store, id)?.len())
}

/// Whether making `candidate_parent` the parent of `id` would create a cycle
/// (the candidate is `id` itself or one of its descendants).
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn would_create_cycle<S>(store: &S, id: RecordId, candidate_parent: RecordId) -> Result<bool>
where
    S: RecordStore + ?Sized,
{
    if candidate_parent == id {
        return Ok(true);
    }
    Ok(ancestors(store, candidate_parent)?.contains(&id))
}

/// Every record of `record_type` with one of `statuses`, depth-first, each
/// sibling group in `(position, title)` order.
///
/// Records whose parent is filtered out by `statuses` are not reachable and
/// are omitted.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn flatten_tree<S>(store: &S, record_type: &str, statuses: &[Status]) -> Result<Vec<TreeRow>>
where
    S: RecordStore + ?Sized,
{
    let excluded = BTreeSet::new();
    let mut output = Vec::new();
    let mut visited = HashSet::new();

    // Pushed in reverse so the stack pops each sibling group in order.
    let mut pending: Vec<TreeRow> = children(store, record_type, None, statuses, &excluded)?
        .into_iter()
        .rev()
        .map(|record| TreeRow { record, depth: 0 })
        .collect();

    while let Some(row) = pending.pop() {
        if !visited.insert(row.record.id) {
            continue;
        }
        let depth = row.depth;
        let id = row.record.id;
        output.push(row);

        let kids = children(store, record_type, Some(id), statuses, &excluded)?;
        for record in kids.into_iter().rev() {
            pending.push(TreeRow {
                record,
                depth: depth + 1,
            });
        }
    }

    Ok(output)
}

fn children<S>(
    store: &S,
    record_type: &str,
    parent_id: Option<RecordId>,
    statuses: &[Status],
    excluded: &BTreeSet<RecordId>,
) -> Result<Vec<Record>>
where
    S: RecordStore + ?Sized,
{
    let page = store
        .query_siblings(&SiblingQuery {
            record_type,
            parent_id,
            statuses,
            excluded,
            order: SortOrder::Position,
            limit: None,
            offset: 0,
        })
        .with_context(|| format!("list children of {parent_id:?}"))?;
    Ok(page.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn page(id: i64, position: i64, parent: Option<i64>) -> Record {
        Record {
            id: RecordId::new(id),
            record_type: "page".into(),
            title: format!("Page {id}"),
            status: Status::Publish,
            position,
            parent_id: parent.map(RecordId::new),
        }
    }

    fn tree() -> MemoryStore {
        // 1
        // ├── 3
        // │   └── 5
        // └── 4
        // 2
        [
            page(1, 1, None),
            page(2, 2, None),
            page(3, 1, Some(1)),
            page(4, 2, Some(1)),
            page(5, 1, Some(3)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ancestors_walk_to_root() {
        let store = tree();
        assert_eq!(
            ancestors(&store, RecordId::new(5)).expect("ancestors"),
            vec![RecordId::new(3), RecordId::new(1)]
        );
        assert!(ancestors(&store, RecordId::new(2)).expect("ancestors").is_empty());
        assert_eq!(depth_of(&store, RecordId::new(5)).expect("depth"), 2);
        assert_eq!(depth_of(&store, RecordId::new(99)).expect("depth"), 0);
    }

    #[test]
    fn ancestors_stop_at_cycles() {
        let mut store = tree();
        store.insert(page(1, 1, Some(5)));
        let chain = ancestors(&store, RecordId::new(5)).expect("ancestors");
        assert_eq!(chain, vec![RecordId::new(3), RecordId::new(1)]);
    }

    #[test]
    fn cycle_detection() {
        let store = tree();
        assert!(would_create_cycle(&store, RecordId::new(1), RecordId::new(1)).expect("check"));
        assert!(would_create_cycle(&store, RecordId::new(1), RecordId::new(5)).expect("check"));
        assert!(!would_create_cycle(&store, RecordId::new(3), RecordId::new(4)).expect("check"));
        assert!(!would_create_cycle(&store, RecordId::new(5), RecordId::new(2)).expect("check"));
    }

    #[test]
    fn flatten_tree_is_depth_first_in_position_order() {
        let store = tree();
        let active = Status::active_set::<_, &str>([]);
        let rows = flatten_tree(&store, "page", &active).expect("flatten");
        let shape: Vec<(i64, usize)> = rows.iter().map(|r| (r.record.id.get(), r.depth)).collect();
        assert_eq!(shape, vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]);
    }

    #[test]
    fn flatten_tree_hides_children_of_filtered_parents() {
        let mut store = tree();
        store.insert(Record {
            status: Status::Trash,
            ..page(3, 1, Some(1))
        });
        let active = Status::active_set::<_, &str>([]);
        let rows = flatten_tree(&store, "page", &active).expect("flatten");
        let ids: Vec<i64> = rows.iter().map(|r| r.record.id.get()).collect();
        assert_eq!(ids, vec![1, 4, 2]);
    }
}
