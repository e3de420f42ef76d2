use thiserror::Error;
use tokio::task::JoinError;

/// Rejected profile or executor configuration.
///
/// Returned before any worker is spawned, so a failing configuration never
/// produces a partial run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A field holds a value outside its accepted range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// A field required by the selected profile kind was not provided.
    #[error("missing `{field}` for {kind} profile")]
    Missing {
        /// Name of the absent field.
        field: &'static str,
        /// Profile kind that requires it.
        kind: &'static str,
    },
}

impl ConfigurationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field this error is about.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Invalid { field, .. } | Self::Missing { field, .. } => field,
        }
    }
}

/// Failure of a load run as a whole.
///
/// Scenario errors are not represented here: they are samples and end up in
/// [`crate::LoadResult::errors`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The pool manager or a sample collector task panicked.
    #[error("engine task failed: {0}")]
    Task(#[from] JoinError),
}
