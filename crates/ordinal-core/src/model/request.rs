use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::RecordId;

/// A single drag-and-drop move, or the continuation of one.
///
/// `prev_id` and `next_id` name the siblings the moved record should end up
/// between. Either may be absent when the record lands at an end of the list;
/// payloads send `0` for that, which deserializes as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub moved_id: RecordId,
    #[serde(default, deserialize_with = "neighbour_id")]
    pub prev_id: Option<RecordId>,
    #[serde(default, deserialize_with = "neighbour_id")]
    pub next_id: Option<RecordId>,
    /// Position given to the first record processed. `None` or non-positive
    /// values mean `1`.
    #[serde(default)]
    pub start: Option<i64>,
    /// Ids already handled by an earlier batch of the same move.
    #[serde(default)]
    pub excluded: BTreeSet<RecordId>,
}

fn neighbour_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.and_then(RecordId::from_request))
}

impl MoveRequest {
    #[must_use]
    pub fn new(moved_id: RecordId, prev_id: Option<RecordId>, next_id: Option<RecordId>) -> Self {
        Self {
            moved_id,
            prev_id,
            next_id,
            start: None,
            excluded: BTreeSet::new(),
        }
    }

    /// The effective starting position.
    #[must_use]
    pub fn effective_start(&self) -> i64 {
        match self.start {
            Some(start) if start > 0 => start,
            _ => 1,
        }
    }

    /// The effective exclusion set, which always contains the moved record.
    #[must_use]
    pub fn effective_excluded(&self) -> BTreeSet<RecordId> {
        let mut excluded = self.excluded.clone();
        excluded.insert(self.moved_id);
        excluded
    }
}

/// Where a record ended up after a resequencing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    /// The moved record: position, resolved parent, and tree depth.
    Moved {
        position: i64,
        parent_id: Option<RecordId>,
        depth: usize,
    },
    /// A sibling that was walked over, with its (possibly unchanged) position.
    Sibling(i64),
}

impl Placement {
    #[must_use]
    pub const fn position(&self) -> i64 {
        match self {
            Self::Moved { position, .. } | Self::Sibling(position) => *position,
        }
    }
}

/// Outcome of one resequencing step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveResult {
    /// Every record the step walked over, keyed by id.
    pub positions: BTreeMap<RecordId, Placement>,
    /// Request to issue next, or `None` once the move is fully settled.
    pub next: Option<MoveRequest>,
    /// The settled record has active descendants; incremental patching of the
    /// view is not possible and the caller should reload it.
    pub children_detected: bool,
}

impl MoveResult {
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_defaults_to_one() {
        let mut request = MoveRequest::new(RecordId::new(3), None, None);
        assert_eq!(request.effective_start(), 1);
        request.start = Some(0);
        assert_eq!(request.effective_start(), 1);
        request.start = Some(-4);
        assert_eq!(request.effective_start(), 1);
        request.start = Some(51);
        assert_eq!(request.effective_start(), 51);
    }

    #[test]
    fn excluded_always_contains_moved_record() {
        let mut request = MoveRequest::new(RecordId::new(3), None, None);
        request.excluded.insert(RecordId::new(8));
        let excluded = request.effective_excluded();
        assert!(excluded.contains(&RecordId::new(3)));
        assert!(excluded.contains(&RecordId::new(8)));
    }

    #[test]
    fn request_accepts_sparse_json() {
        let request: MoveRequest =
            serde_json::from_str(r#"{"moved_id": 5, "next_id": 9}"#).expect("parse request");
        assert_eq!(request.moved_id, RecordId::new(5));
        assert_eq!(request.prev_id, None);
        assert_eq!(request.next_id, Some(RecordId::new(9)));
        assert!(request.excluded.is_empty());
    }

    #[test]
    fn zero_neighbour_ids_mean_absent() {
        let request: MoveRequest =
            serde_json::from_str(r#"{"moved_id": 3, "prev_id": 0, "next_id": 2}"#)
                .expect("parse request");
        assert_eq!(request.prev_id, None);
        assert_eq!(request.next_id, Some(RecordId::new(2)));

        let request: MoveRequest =
            serde_json::from_str(r#"{"moved_id": 3, "prev_id": null, "next_id": -1}"#)
                .expect("parse request");
        assert_eq!(request.prev_id, None);
        assert_eq!(request.next_id, None);
    }

    #[test]
    fn result_serializes_positions_by_id() {
        let mut result = MoveResult::default();
        result.positions.insert(RecordId::new(2), Placement::Sibling(3));
        result.positions.insert(
            RecordId::new(7),
            Placement::Moved {
                position: 2,
                parent_id: None,
                depth: 0,
            },
        );
        let value = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(value["positions"]["2"], 3);
        assert_eq!(value["positions"]["7"]["position"], 2);
        assert_eq!(value["positions"]["7"]["depth"], 0);
        assert!(value["next"].is_null());
        assert_eq!(value["children_detected"], false);
    }
}
