/// Convenience result type used across softfilter.
pub type FilterResult<T> = Result<T, FilterError>;

/// Top-level error taxonomy for filter creation and host-side dispatch.
///
/// Pixel work itself never fails: buffer geometry is a caller precondition checked by the host
/// before packets are built.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// Invalid host-provided geometry, buffers or negotiation input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A filter instance could not allocate its per-activation state.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A filter parameter is present but has the wrong type or range.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FilterError {
    /// Build a [`FilterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FilterError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`FilterError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
