use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique integer identifier of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Treat `0` (and negatives) as "no record", the way request payloads
    /// encode a missing neighbour.
    #[must_use]
    pub const fn from_request(raw: i64) -> Option<Self> {
        if raw > 0 { Some(Self(raw)) } else { None }
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::from_request)
            .ok_or_else(|| InvalidRecordId(s.to_string()))
    }
}

/// Error returned when a string is not a positive integer id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record id '{0}': expected a positive integer")]
pub struct InvalidRecordId(pub String);

/// Lifecycle state of a record.
///
/// The built-in states mirror a typical publishing workflow. Anything else is
/// carried as [`Status::Custom`] and only counts as active when configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Custom(String),
}

impl Status {
    /// Built-in statuses shown in the "all" admin list (everything except
    /// trashed and auto-draft records).
    pub const BUILTIN_ACTIVE: [Self; 5] = [
        Self::Publish,
        Self::Future,
        Self::Draft,
        Self::Pending,
        Self::Private,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Publish => "publish",
            Self::Future => "future",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
            Self::AutoDraft => "auto-draft",
            Self::Custom(name) => name,
        }
    }

    /// Build the active status set: the built-ins plus configured customs.
    #[must_use]
    pub fn active_set<I, S>(custom: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut statuses = Self::BUILTIN_ACTIVE.to_vec();
        for name in custom {
            let Ok(status) = name.as_ref().parse::<Self>() else {
                continue;
            };
            if matches!(status, Self::Custom(_)) && !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        statuses
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "publish" | "published" => Ok(Self::Publish),
            "future" | "scheduled" => Ok(Self::Future),
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "trash" | "trashed" => Ok(Self::Trash),
            "auto-draft" | "auto_draft" => Ok(Self::AutoDraft),
            "" => Err(InvalidStatus(s.to_string())),
            other if other.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => {
                Ok(Self::Custom(other.to_string()))
            }
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned for an unusable status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{0}': use a built-in status or a lowercase slug")]
pub struct InvalidStatus(pub String);

/// A record as read from the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub record_type: String,
    pub title: String,
    pub status: Status,
    /// Ordinal among siblings (`menu_order`). Not required to be unique.
    pub position: i64,
    /// `None` for top-level records.
    pub parent_id: Option<RecordId>,
}
