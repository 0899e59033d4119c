//! The record store capability consumed by the resequencer.
//!
//! The resequencer never talks to a database directly. It receives a
//! [`RecordStore`] and only uses the operations below, so hosts can plug in
//! whatever persistence they already own. Two implementations ship with the
//! crate: [`memory::MemoryStore`] and [`crate::db::SqliteStore`].

pub mod memory;

use anyhow::{Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::model::{Record, RecordId, Status};

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort order for sibling listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// `position ASC, title ASC`, then id for a total order.
    #[default]
    Position,
    /// `title ASC`, then id.
    Title,
    /// `id ASC`.
    Id,
}

impl SortOrder {
    pub(crate) const fn sql_clause(self) -> &'static str {
        match self {
            Self::Position => "ORDER BY menu_order ASC, title ASC, record_id ASC",
            Self::Title => "ORDER BY title ASC, record_id ASC",
            Self::Id => "ORDER BY record_id ASC",
        }
    }

    /// Compare two records under this order.
    #[must_use]
    pub fn compare(self, a: &Record, b: &Record) -> std::cmp::Ordering {
        match self {
            Self::Position => a
                .position
                .cmp(&b.position)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.id.cmp(&b.id)),
            Self::Title => a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)),
            Self::Id => a.id.cmp(&b.id),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::Title => f.write_str("title"),
            Self::Id => f.write_str("id"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" | "menu_order" | "menu-order" | "manual" => Ok(Self::Position),
            "title" | "alpha" => Ok(Self::Title),
            "id" => Ok(Self::Id),
            other => bail!("unknown sort order '{other}': expected one of position, title, id"),
        }
    }
}

// ---------------------------------------------------------------------------
// Query and update shapes
// ---------------------------------------------------------------------------

/// Sibling enumeration criteria.
#[derive(Debug, Clone)]
pub struct SiblingQuery<'a> {
    pub record_type: &'a str,
    /// `None` selects top-level records.
    pub parent_id: Option<RecordId>,
    pub statuses: &'a [Status],
    pub excluded: &'a BTreeSet<RecordId>,
    pub order: SortOrder,
    /// Page size; `None` returns every match.
    pub limit: Option<usize>,
    pub offset: usize,
}

/// One page of siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingPage {
    pub records: Vec<Record>,
    /// More matching records exist beyond this page.
    pub has_more: bool,
}

/// Fields to write on a record. `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub position: Option<i64>,
    /// `Some(None)` moves the record to the top level.
    pub parent_id: Option<Option<RecordId>>,
}

impl FieldUpdate {
    #[must_use]
    pub const fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            parent_id: None,
        }
    }

    #[must_use]
    pub const fn placement(position: i64, parent_id: Option<RecordId>) -> Self {
        Self {
            position: Some(position),
            parent_id: Some(parent_id),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position.is_none() && self.parent_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistence operations the ordering engine needs from its host.
pub trait RecordStore {
    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn get_record(&self, id: RecordId) -> Result<Option<Record>>;

    /// Parent of a record; `None` for top-level or unknown records.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn get_parent_id(&self, id: RecordId) -> Result<Option<RecordId>>;

    /// Enumerate one page of siblings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn query_siblings(&self, query: &SiblingQuery<'_>) -> Result<SiblingPage>;

    /// Write position and/or parent of a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write fails.
    fn update_record_fields(&mut self, id: RecordId, update: &FieldUpdate) -> Result<()>;

    /// Whether any record of `record_type` with one of `statuses` lists
    /// `parent_id` as its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn has_descendants(
        &self,
        record_type: &str,
        parent_id: RecordId,
        statuses: &[Status],
    ) -> Result<bool>;

    /// Set every record of `record_type` to position 0. Returns rows touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn reset_positions(&mut self, record_type: &str) -> Result<usize>;

    /// Delete every trashed record of `record_type`, reattaching their
    /// children to the nearest ancestor that is not purged. Returns rows
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn purge_trash(&mut self, record_type: &str) -> Result<usize>;
}

/// Nearest ancestor of a child of `parent` that survives a purge.
///
/// `purged` maps each purged id to its parent. Walks up through purged
/// records and returns the first id not in the map, or `None` when the chain
/// ends at the top level.
pub(crate) fn surviving_ancestor<K>(purged: &BTreeMap<K, Option<K>>, parent: K) -> Option<K>
where
    K: Ord + Copy,
{
    let mut current = parent;
    // Bounded by the map size so a parent cycle among purged rows terminates.
    for _ in 0..=purged.len() {
        match purged.get(&current) {
            None => return Some(current),
            Some(Some(up)) => current = *up,
            Some(None) => return None,
        }
    }
    None
}
