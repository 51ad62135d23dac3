use itertools::Itertools;
use thiserror::Error;

// Error message prefixes
const MSG_CANNOT_PREFIX: &str = "Cannot";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Boxed failure returned by converter functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for the `struct_copier` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Failures produced while describing or copying values
///
/// `Shape` is fatal and returned as soon as it is detected. Every other variant is collected
/// per member and handed back at the end of the call inside `Aggregate`.
#[derive(Debug, Error)]
pub enum Error {
    /// A converter function failed
    #[error("Conversion failed at '{path}' from {source_type} to {destination_type}: {source}")]
    Conversion {
        /// Member path of the failing member
        path:             String,
        /// Name of the source type
        source_type:      String,
        /// Name of the requested destination type
        destination_type: String,
        /// Underlying converter failure
        source:           BoxError,
    },

    /// Every per-member failure of one copy call
    #[error("{} member(s) failed to copy: {}", .0.len(), .0.iter().join("; "))]
    Aggregate(Vec<Self>),

    /// A destination field tagged `must` was not populated
    #[error("Required field '{path}' was not populated")]
    MissingRequired {
        /// Member path of the unpopulated field
        path: String,
    },

    /// Nesting went deeper than the configured limit
    #[error("Recursion limit of {limit} exceeded at '{path}'")]
    RecursionLimit {
        /// Member path where the branch was aborted
        path:  String,
        /// The limit in effect
        limit: usize,
    },

    /// The destination cannot be introspected or written
    #[error("Shape error: {0}")]
    Shape(String),

    /// No assignment or conversion path exists for one member
    #[error("Type mismatch at '{path}': cannot assign {source_type} to {destination_type}")]
    TypeMismatch {
        /// Member path of the failing member
        path:             String,
        /// Name of the source type
        source_type:      String,
        /// Name of the destination type
        destination_type: String,
    },
}

impl Error {
    // Builder methods for common patterns

    /// Create a "Cannot X" shape error
    pub fn cannot(action: &str, reason: impl std::fmt::Display) -> Self {
        Self::Shape(format!("{MSG_CANNOT_PREFIX} {action}: {reason}"))
    }

    /// Create an "Invalid X" shape error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::Shape(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create a type mismatch error
    pub fn mismatch(
        path: impl Into<String>,
        source_type: impl Into<String>,
        destination_type: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path:             path.into(),
            source_type:      source_type.into(),
            destination_type: destination_type.into(),
        }
    }

    /// Create a conversion error wrapping the converter's own failure
    pub fn conversion(
        path: impl Into<String>,
        source_type: impl Into<String>,
        destination_type: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Self::Conversion {
            path: path.into(),
            source_type: source_type.into(),
            destination_type: destination_type.into(),
            source,
        }
    }

    /// Create a recursion limit error
    pub fn recursion_limit(path: impl Into<String>, limit: usize) -> Self {
        Self::RecursionLimit {
            path: path.into(),
            limit,
        }
    }

    /// Create a missing required field error
    pub fn missing_required(path: impl Into<String>) -> Self {
        Self::MissingRequired { path: path.into() }
    }

    /// The individual failures carried by this error
    ///
    /// An `Aggregate` yields its members, any other variant yields itself.
    pub fn members(&self) -> &[Self] {
        match self {
            Self::Aggregate(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// Whether this error aborts a copy immediately
    pub const fn is_fatal(&self) -> bool { matches!(self, Self::Shape(_)) }

    /// Member path of a per-member failure
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Conversion { path, .. }
            | Self::MissingRequired { path }
            | Self::RecursionLimit { path, .. }
            | Self::TypeMismatch { path, .. } => Some(path),
            Self::Aggregate(_) | Self::Shape(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_lists_every_member() {
        let error = Error::Aggregate(vec![
            Error::mismatch(".field_int", "alloc::string::String", "i64"),
            Error::missing_required(".id"),
        ]);

        let message = error.to_string();
        assert!(message.starts_with("2 member(s) failed to copy"));
        assert!(message.contains("Type mismatch at '.field_int'"));
        assert!(message.contains("Required field '.id'"));
        assert_eq!(error.members().len(), 2);
    }

    #[test]
    fn single_error_is_its_own_member() {
        let error = Error::recursion_limit(".node.next", 4);
        assert_eq!(error.members().len(), 1);
        assert_eq!(error.path(), Some(".node.next"));
        assert!(!error.is_fatal());
        assert!(Error::cannot("copy", "destination is a plain value").is_fatal());
    }

    #[test]
    fn conversion_keeps_underlying_failure() {
        let source: BoxError = "invalid digit found in string".into();
        let error = Error::conversion(".field_int", "String", "i64", source);

        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().contains("invalid digit"));
    }
}
