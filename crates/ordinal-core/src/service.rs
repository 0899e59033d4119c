//! Transport-facing entry points.
//!
//! [`OrderingService`] is what a CLI or request handler talks to. It loads
//! the record, asks the [`CapabilityGate`] whether the caller may touch its
//! content type, and only then hands the request to the [`Resequencer`] or
//! the store's bulk operations.

use tracing::{info, instrument};

use crate::capabilities::CapabilityGate;
use crate::error::OrderingError;
use crate::model::{MoveRequest, MoveResult};
use crate::resequence::Resequencer;
use crate::store::RecordStore;

pub struct OrderingService<S, G> {
    store: S,
    gate: G,
    resequencer: Resequencer,
}

impl<S, G> OrderingService<S, G>
where
    S: RecordStore,
    G: CapabilityGate,
{
    pub const fn new(store: S, gate: G, resequencer: Resequencer) -> Self {
        Self {
            store,
            gate,
            resequencer,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub const fn resequencer(&self) -> &Resequencer {
        &self.resequencer
    }

    /// Run one resequencing step for a drag-and-drop move.
    ///
    /// # Errors
    ///
    /// - [`OrderingError::NotFound`] if the moved record does not exist.
    /// - [`OrderingError::PermissionDenied`] if its type may not be reordered.
    /// - [`OrderingError::Store`] if the store fails mid-walk. Writes already
    ///   made stay in place.
    #[instrument(skip(self, request), fields(moved = %request.moved_id))]
    pub fn move_record(&mut self, request: &MoveRequest) -> Result<MoveResult, OrderingError> {
        let record = self
            .store
            .get_record(request.moved_id)?
            .ok_or(OrderingError::NotFound(request.moved_id))?;

        if !self.gate.can_reorder(&record.record_type) {
            return Err(OrderingError::PermissionDenied {
                action: "reorder",
                record_type: record.record_type,
            });
        }

        self.resequencer.resequence(&mut self.store, request)
    }

    /// Follow continuations until the move is settled.
    ///
    /// The returned result carries every position touched across all steps.
    ///
    /// # Errors
    ///
    /// Same as [`Self::move_record`], for any step.
    pub fn settle(&mut self, request: &MoveRequest) -> Result<MoveResult, OrderingError> {
        let mut merged = MoveResult::default();
        let mut steps = 0_usize;
        let mut current = request.clone();

        loop {
            let step = self.move_record(&current)?;
            steps += 1;
            merged.positions.extend(step.positions);
            merged.children_detected = step.children_detected;
            match step.next {
                Some(next) => current = next,
                None => break,
            }
        }

        info!(moved = %request.moved_id, steps, "move settled");
        Ok(merged)
    }

    /// Set every record of `record_type` back to position 0.
    ///
    /// # Errors
    ///
    /// [`OrderingError::PermissionDenied`] if the type may not be reordered,
    /// or [`OrderingError::Store`] on write failure.
    pub fn reset_order(&mut self, record_type: &str) -> Result<usize, OrderingError> {
        if !self.gate.can_reorder(record_type) {
            return Err(OrderingError::PermissionDenied {
                action: "reorder",
                record_type: record_type.to_string(),
            });
        }
        let touched = self.store.reset_positions(record_type)?;
        info!(record_type, touched, "order reset");
        Ok(touched)
    }

    /// Permanently delete trashed records of `record_type`.
    ///
    /// # Errors
    ///
    /// [`OrderingError::PermissionDenied`] if bulk deletion is not allowed
    /// for the type, or [`OrderingError::Store`] on write failure.
    pub fn purge_trash(&mut self, record_type: &str) -> Result<usize, OrderingError> {
        if !self.gate.can_bulk_delete(record_type) {
            return Err(OrderingError::PermissionDenied {
                action: "bulk delete",
                record_type: record_type.to_string(),
            });
        }
        let deleted = self.store.purge_trash(record_type)?;
        info!(record_type, deleted, "trash purged");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::StaticGate;
    use crate::model::{Placement, Record, RecordId, Status};
    use crate::store::memory::MemoryStore;

    fn page(id: i64, position: i64) -> Record {
        Record {
            id: RecordId::new(id),
            record_type: "page".into(),
            title: format!("Page {id:03}"),
            status: Status::Publish,
            position,
            parent_id: None,
        }
    }

    fn service(count: i64, gate: StaticGate) -> OrderingService<MemoryStore, StaticGate> {
        let store = (1..=count).map(|i| page(i, i)).collect();
        OrderingService::new(
            store,
            gate,
            Resequencer::new(5, Status::active_set::<_, &str>([])),
        )
    }

    #[test]
    fn reorder_denied_before_any_write() {
        let mut svc = service(
            3,
            StaticGate {
                reorder: false,
                bulk_delete: true,
            },
        );
        let err = svc
            .move_record(&MoveRequest::new(RecordId::new(3), None, Some(RecordId::new(1))))
            .expect_err("must be denied");
        assert!(matches!(
            err,
            OrderingError::PermissionDenied { action: "reorder", ref record_type } if record_type == "page"
        ));
        assert_eq!(svc.store().writes(), 0);
    }

    #[test]
    fn missing_record_is_not_found() {
        let mut svc = service(3, StaticGate::allow_all());
        let err = svc
            .move_record(&MoveRequest::new(RecordId::new(42), None, None))
            .expect_err("unknown record");
        assert!(matches!(err, OrderingError::NotFound(id) if id == RecordId::new(42)));
    }

    #[test]
    fn settle_merges_every_batch() {
        let mut svc = service(12, StaticGate::allow_all());
        let result = svc
            .settle(&MoveRequest::new(
                RecordId::new(12),
                None,
                Some(RecordId::new(1)),
            ))
            .expect("settle");

        assert!(result.is_settled());
        assert_eq!(result.positions.len(), 12);
        assert!(matches!(
            result.positions[&RecordId::new(12)],
            Placement::Moved { position: 1, .. }
        ));
        assert_eq!(result.positions[&RecordId::new(11)], Placement::Sibling(12));
    }

    #[test]
    fn bulk_operations_are_gated_separately() {
        let mut svc = service(
            3,
            StaticGate {
                reorder: true,
                bulk_delete: false,
            },
        );
        assert_eq!(svc.reset_order("page").expect("reset"), 3);
        assert!(svc.store().records().all(|r| r.position == 0));

        let err = svc.purge_trash("page").expect_err("purge denied");
        assert!(matches!(
            err,
            OrderingError::PermissionDenied {
                action: "bulk delete",
                ..
            }
        ));
    }

    #[test]
    fn purge_counts_only_trash() {
        let mut svc = service(3, StaticGate::allow_all());
        svc.store_mut().insert(Record {
            status: Status::Trash,
            ..page(9, 4)
        });
        assert_eq!(svc.purge_trash("page").expect("purge"), 1);
        assert_eq!(svc.into_store().records().count(), 3);
    }
}
