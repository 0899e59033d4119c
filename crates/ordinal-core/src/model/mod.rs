//! Records and the move request/result shapes exchanged with callers.

mod record;
mod request;

pub use record::{InvalidRecordId, InvalidStatus, Record, RecordId, Status};
pub use request::{MoveRequest, MoveResult, Placement};
