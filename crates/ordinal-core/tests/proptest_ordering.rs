use ordinal_core::model::{MoveRequest, Record, RecordId, Status};
use ordinal_core::resequence::Resequencer;
use ordinal_core::store::memory::MemoryStore;
use ordinal_core::store::{RecordStore, SiblingQuery, SortOrder};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn siblings(count: usize) -> MemoryStore {
    (1..=count)
        .map(|i| {
            let raw = i64::try_from(i).expect("small count");
            Record {
                id: RecordId::new(raw),
                record_type: "page".into(),
                title: format!("Page {raw:03}"),
                status: Status::Publish,
                position: raw,
                parent_id: None,
            }
        })
        .collect()
}

/// The order a client expects after dragging `moved` into `slot` of the list
/// without it, plus the neighbour ids it would send.
fn target(count: usize, moved: usize, slot: usize) -> (Vec<RecordId>, MoveRequest) {
    let ids: Vec<RecordId> = (1..=count)
        .map(|i| RecordId::new(i64::try_from(i).expect("small count")))
        .collect();
    let moved_id = ids[moved];
    let mut order: Vec<RecordId> = ids.into_iter().filter(|id| *id != moved_id).collect();
    order.insert(slot, moved_id);

    let prev = slot.checked_sub(1).map(|i| order[i]);
    let next = order.get(slot + 1).copied();
    (order, MoveRequest::new(moved_id, prev, next))
}

/// Run a move to completion, asserting every continuation grows `excluded`.
fn settle(store: &mut MemoryStore, batch: i64, request: MoveRequest) {
    let sequencer = Resequencer::new(batch, Status::active_set::<_, &str>([]));
    let mut request = request;
    loop {
        let result = sequencer
            .resequence(store, &request)
            .expect("resequence must succeed");
        match result.next {
            Some(next) => {
                assert!(next.excluded.len() > request.excluded.len());
                request = next;
            }
            None => break,
        }
    }
}

fn listed(store: &MemoryStore) -> Vec<(RecordId, i64)> {
    let statuses = Status::active_set::<_, &str>([]);
    let excluded = BTreeSet::new();
    store
        .query_siblings(&SiblingQuery {
            record_type: "page",
            parent_id: None,
            statuses: &statuses,
            excluded: &excluded,
            order: SortOrder::Position,
            limit: None,
            offset: 0,
        })
        .expect("list siblings")
        .records
        .into_iter()
        .map(|r| (r.id, r.position))
        .collect()
}

fn positions(store: &MemoryStore) -> BTreeMap<RecordId, i64> {
    store.records().map(|r| (r.id, r.position)).collect()
}

fn arb_move() -> impl Strategy<Value = (usize, usize, usize, i64)> {
    (2_usize..80).prop_flat_map(|count| (Just(count), 0..count, 0..count, 5_i64..20))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn settled_order_matches_drop_target((count, moved, slot, batch) in arb_move()) {
        let mut store = siblings(count);
        let (expected, request) = target(count, moved, slot);

        settle(&mut store, batch, request);

        let listing = listed(&store);
        let order: Vec<RecordId> = listing.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(order, expected);

        let assigned: Vec<i64> = listing.iter().map(|(_, position)| *position).collect();
        let contiguous: Vec<i64> = (1..=i64::try_from(count).expect("small count")).collect();
        prop_assert_eq!(assigned, contiguous);
    }

    #[test]
    fn batching_does_not_change_the_outcome((count, moved, slot, batch) in arb_move()) {
        let (_, request) = target(count, moved, slot);

        let mut batched = siblings(count);
        settle(&mut batched, batch, request.clone());

        let mut single = siblings(count);
        settle(&mut single, 1_000, request);

        prop_assert_eq!(positions(&batched), positions(&single));
    }

    #[test]
    fn dropping_in_place_writes_nothing((count, moved, _slot, batch) in arb_move()) {
        let mut store = siblings(count);
        let (_, request) = target(count, moved, moved);

        settle(&mut store, batch, request);

        prop_assert_eq!(store.writes(), 0);
    }
}
