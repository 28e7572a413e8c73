//! Unified error handling for weft.
//!
//! Construction-time failures (unknown keys, faulting factories, empty
//! key lists) are fail-fast and surface immediately to the caller.
//! Chain exhaustion is deliberately *not* here: it is reported as
//! [`Outcome::Unhandled`](crate::chain::Outcome) so each consumer can
//! decide whether an unclaimed request is an error at all.

use thiserror::Error;

/// Boxed error type carried by fallible factories and interceptors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or driving a composition.
#[derive(Debug, Error)]
pub enum WeftError {
    /// The key was never registered.
    #[error("unknown key: {key}")]
    UnknownKey { key: String },

    /// The registered factory faulted while constructing an instance.
    #[error("construction failed for {key}: {source}")]
    ConstructionFailed { key: String, source: BoxError },

    /// A chain cannot be built from an empty key list.
    #[error("cannot build a chain from an empty key list")]
    EmptyChain,

    /// The interceptor itself faulted. A failure returned by the real
    /// call passes through `proceed()` untouched and is never wrapped
    /// in this variant.
    #[error("interceptor failed in {method}: {source}")]
    InterceptionFailed {
        method: &'static str,
        source: BoxError,
    },

    /// A transition run exceeded its step limit (cycle guard).
    #[error("transition run exceeded {limit} steps")]
    TransitionLimit { limit: usize },
}

impl WeftError {
    /// Get a static error code string for log field labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKey { .. } => "unknown_key",
            Self::ConstructionFailed { .. } => "construction_failed",
            Self::EmptyChain => "empty_chain",
            Self::InterceptionFailed { .. } => "interception_failed",
            Self::TransitionLimit { .. } => "transition_limit",
        }
    }
}

/// Result type for composition operations.
pub type WeftResult<T> = Result<T, WeftError>;
