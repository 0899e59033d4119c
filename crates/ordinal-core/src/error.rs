use std::fmt;

use crate::model::RecordId;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    RecordNotFound,
    PermissionDenied,
    InvalidStatus,
    PositionOutOfRange,
    StoreFailure,
    CorruptStore,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::RecordNotFound => "E2001",
            Self::PermissionDenied => "E2002",
            Self::InvalidStatus => "E2003",
            Self::PositionOutOfRange => "E2004",
            Self::StoreFailure => "E5001",
            Self::CorruptStore => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::RecordNotFound => "Record not found",
            Self::PermissionDenied => "Operation not permitted for this content type",
            Self::InvalidStatus => "Invalid record status",
            Self::PositionOutOfRange => "Start position out of range",
            Self::StoreFailure => "Record store operation failed",
            Self::CorruptStore => "Corrupt SQLite record store",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `ord init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .ordinal/config.toml and retry."),
            Self::RecordNotFound => None,
            Self::PermissionDenied => {
                Some("Enable the operation under [types.<name>] in .ordinal/config.toml.")
            }
            Self::InvalidStatus => Some(
                "Use publish, future, draft, pending, private, trash, or a configured custom status.",
            ),
            Self::PositionOutOfRange => {
                Some("Pass the `start` from the previous continuation, or omit it.")
            }
            Self::StoreFailure => Some("Check disk space and write permissions, then retry."),
            Self::CorruptStore => Some("Move .ordinal/ordinal.db aside and run `ord init --force`."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the resequencer and the ordering service.
#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    /// The moved record does not resolve to an existing record.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The capability gate refused the operation for this content type.
    #[error("{action} is not permitted for content type '{record_type}'")]
    PermissionDenied {
        action: &'static str,
        record_type: String,
    },

    /// Positions from `start` would not fit in an `i64` for this batch.
    #[error("start position {start} leaves no room for {needed} positions")]
    PositionOverflow { start: i64, needed: usize },

    /// Opaque passthrough of a record store failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl OrderingError {
    /// The stable [`ErrorCode`] classifying this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::RecordNotFound,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::PositionOverflow { .. } => ErrorCode::PositionOutOfRange,
            Self::Store(_) => ErrorCode::StoreFailure,
        }
    }

    /// Remediation text for operators, falling back to the code's message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::NotFound(id) => format!("Check the id with `ord list`; record {id} does not exist."),
            other => {
                let code = other.error_code();
                code.hint().unwrap_or_else(|| code.message()).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, OrderingError};
    use crate::model::RecordId;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NotInitialized,
            ErrorCode::ConfigParseError,
            ErrorCode::RecordNotFound,
            ErrorCode::PermissionDenied,
            ErrorCode::InvalidStatus,
            ErrorCode::PositionOutOfRange,
            ErrorCode::StoreFailure,
            ErrorCode::CorruptStore,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::PermissionDenied.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn ordering_errors_map_to_codes() {
        assert_eq!(
            OrderingError::NotFound(RecordId::new(7)).error_code(),
            ErrorCode::RecordNotFound
        );
        let denied = OrderingError::PermissionDenied {
            action: "reorder",
            record_type: "post".into(),
        };
        assert_eq!(denied.error_code(), ErrorCode::PermissionDenied);
        assert_eq!(
            denied.to_string(),
            "reorder is not permitted for content type 'post'"
        );
        let store = OrderingError::from(anyhow::anyhow!("disk full"));
        assert_eq!(store.error_code(), ErrorCode::StoreFailure);
        assert_eq!(store.to_string(), "disk full");
    }

    #[test]
    fn not_found_suggestion_names_the_record() {
        let err = OrderingError::NotFound(RecordId::new(42));
        assert!(err.suggestion().contains("42"));
    }
}
