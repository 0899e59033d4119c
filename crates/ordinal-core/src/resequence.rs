//! Drag-and-drop resequencing.
//!
//! A user drags one record to a new place in a sibling list. The client only
//! knows which rows ended up directly before (`prev_id`) and after
//! (`next_id`) it. From that the [`Resequencer`]:
//!
//! 1. decides which parent the record now belongs to (a drop directly under
//!    a parent row means "first child", a drop next to rows of another
//!    parent means "join that group"),
//! 2. walks the target sibling group in `(position, title)` order, assigning
//!    contiguous positions from `start` and slotting the moved record in,
//! 3. stops early once the remaining siblings are already ordered, and
//! 4. hands back a continuation request when the group is larger than one
//!    batch.
//!
//! Writes are skipped whenever a record already holds the computed value, so
//! dropping a record back where it was touches nothing.
//!
//! The function is re-entrant: all state lives in the store and in the
//! continuation request threaded through the caller.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_BATCH_SIZE, ProjectConfig, effective_batch_size};
use crate::error::OrderingError;
use crate::hierarchy;
use crate::model::{MoveRequest, MoveResult, Placement, Record, RecordId, Status};
use crate::store::{FieldUpdate, RecordStore, SiblingQuery, SortOrder};

/// Recomputes sibling positions for a moved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resequencer {
    batch_size: usize,
    statuses: Vec<Status>,
}

impl Default for Resequencer {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            statuses: Status::active_set::<_, &str>([]),
        }
    }
}

impl Resequencer {
    /// Build a resequencer. `batch_size` below the minimum falls back to the
    /// default.
    #[must_use]
    pub fn new(batch_size: i64, statuses: Vec<Status>) -> Self {
        Self {
            batch_size: effective_batch_size(batch_size),
            statuses,
        }
    }

    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.ordering.batch_size, config.statuses.active())
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Statuses whose records take part in ordering.
    #[must_use]
    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    /// Run one resequencing step.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::NotFound`] before any write if the moved
    /// record does not exist, [`OrderingError::PositionOverflow`] before any
    /// write if the batch would run positions past `i64::MAX`, or
    /// [`OrderingError::Store`] if the store fails.
    pub fn resequence<S>(
        &self,
        store: &mut S,
        request: &MoveRequest,
    ) -> Result<MoveResult, OrderingError>
    where
        S: RecordStore + ?Sized,
    {
        let moved = store
            .get_record(request.moved_id)?
            .ok_or(OrderingError::NotFound(request.moved_id))?;

        let excluded = request.effective_excluded();
        let prev_id = request.prev_id;
        let Resolution { parent_id, next_id } =
            resolve_parent(&*store, &moved, prev_id, request.next_id)?;

        let page = store.query_siblings(&SiblingQuery {
            record_type: &moved.record_type,
            parent_id,
            statuses: &self.statuses,
            excluded: &excluded,
            order: SortOrder::Position,
            limit: Some(self.batch_size),
            offset: 0,
        })?;

        // The walk advances once per sibling plus once for the moved record.
        let start = request.effective_start();
        let needed = page.records.len() + 1;
        let fits = i64::try_from(needed)
            .ok()
            .and_then(|n| start.checked_add(n))
            .is_some();
        if !fits {
            return Err(OrderingError::PositionOverflow { start, needed });
        }

        let mut walk = Walk {
            cursor: start,
            positions: BTreeMap::new(),
            written: 0,
        };
        let mut cut_short = false;

        for sibling in &page.records {
            if sibling.id == moved.id {
                continue;
            }

            if next_id == Some(sibling.id) {
                walk.place(store, &moved, parent_id)?;
            }

            // Once the moved record is in, a sibling already at or past the
            // cursor means the rest of the group is in order.
            if walk.positions.contains_key(&moved.id) && sibling.position >= walk.cursor {
                cut_short = true;
                break;
            }

            if sibling.position != walk.cursor {
                store.update_record_fields(sibling.id, &FieldUpdate::position(walk.cursor))?;
                debug!(
                    record = %sibling.id,
                    from = sibling.position,
                    to = walk.cursor,
                    "sibling position written"
                );
                walk.written += 1;
            }
            walk.positions.insert(sibling.id, Placement::Sibling(walk.cursor));
            walk.cursor += 1;

            if next_id.is_none() && prev_id == Some(sibling.id) {
                walk.place(store, &moved, parent_id)?;
            }
        }

        let next = if !cut_short && page.has_more {
            let mut excluded = excluded;
            excluded.extend(walk.positions.keys().copied());
            Some(MoveRequest {
                moved_id: moved.id,
                prev_id,
                next_id,
                start: Some(walk.cursor),
                excluded,
            })
        } else {
            None
        };

        let children_detected = next.is_none()
            && store.has_descendants(&moved.record_type, moved.id, &self.statuses)?;

        info!(
            moved = %moved.id,
            record_type = %moved.record_type,
            walked = walk.positions.len(),
            written = walk.written,
            settled = next.is_none(),
            children_detected,
            "resequence step complete"
        );

        Ok(MoveResult {
            positions: walk.positions,
            next,
            children_detected,
        })
    }
}

struct Walk {
    cursor: i64,
    positions: BTreeMap<RecordId, Placement>,
    written: usize,
}

impl Walk {
    /// Put the moved record at the cursor under `parent_id`.
    fn place<S>(
        &mut self,
        store: &mut S,
        moved: &Record,
        parent_id: Option<RecordId>,
    ) -> Result<(), OrderingError>
    where
        S: RecordStore + ?Sized,
    {
        let position = self.cursor;
        if moved.position != position || moved.parent_id != parent_id {
            store.update_record_fields(moved.id, &FieldUpdate::placement(position, parent_id))?;
            debug!(
                record = %moved.id,
                from = moved.position,
                to = position,
                parent = ?parent_id,
                "moved record written"
            );
            self.written += 1;
        }
        let depth = hierarchy::depth_of(&*store, moved.id)?;
        self.positions.insert(
            moved.id,
            Placement::Moved {
                position,
                parent_id,
                depth,
            },
        );
        self.cursor += 1;
        Ok(())
    }
}

/// Parent chosen for the moved record, and the `next_id` still relevant to
/// this sibling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub parent_id: Option<RecordId>,
    pub next_id: Option<RecordId>,
}

/// Infer the intended parent from the drop neighbours.
///
/// A neighbour's parent is `None` when the neighbour itself is absent and
/// `Some(None)` when it is a top-level record; the two are different drop
/// situations.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn resolve_parent<S>(
    store: &S,
    moved: &Record,
    prev_id: Option<RecordId>,
    next_id: Option<RecordId>,
) -> anyhow::Result<Resolution>
where
    S: RecordStore + ?Sized,
{
    let current = moved.parent_id;
    let next_parent = next_id.map(|id| store.get_parent_id(id)).transpose()?;

    let mut parent_id = current;
    match (prev_id, next_parent) {
        // Dropped directly below the parent of the following row: become its
        // first child. With no neighbours at all the record goes top level.
        (Some(prev), Some(Some(next_parent))) if prev == next_parent => {
            parent_id = Some(next_parent);
        }
        (None, None) => parent_id = None,
        _ if next_parent != Some(current) => {
            let prev_parent = prev_id.map(|id| store.get_parent_id(id)).transpose()?;
            if prev_parent != Some(current) {
                parent_id = prev_parent.or(next_parent).flatten();
            }
        }
        _ => {}
    }

    if let Some(candidate) = parent_id.filter(|_| parent_id != current) {
        if hierarchy::would_create_cycle(store, moved.id, candidate)? {
            warn!(
                record = %moved.id,
                candidate = %candidate,
                "drop would nest record under itself, keeping current parent"
            );
            parent_id = current;
        }
    }

    let next_id = if next_parent == Some(parent_id) {
        next_id
    } else {
        None
    };

    Ok(Resolution { parent_id, next_id })
}
