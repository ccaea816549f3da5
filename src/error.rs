//! Error types for warp setup and gradient propagation.
//!
//! All of these are configuration or lifecycle errors. The sampling math itself
//! has no failure modes: coordinates that leave the grid are handled by the
//! boundary policy.

use thiserror::Error;

/// Main error type for warp operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarpError {
    /// A tensor does not have the `[N, C, H, W]` rank.
    #[error("{name} must be rank 4 [N, C, H, W], got shape {shape:?}")]
    RankMismatch { name: &'static str, shape: Vec<usize> },

    /// Flow and source disagree on batch or spatial extent.
    #[error("Optical flow dimensions need to match input: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The flow field does not carry exactly two displacement channels.
    #[error("flow must have exactly 2 channels, got {0}")]
    FlowChannels(usize),

    /// Backward was handed a cache or gradient that does not belong to the
    /// current forward shape.
    #[error("cache mismatch: {0}")]
    CacheMismatch(String),

    /// A cache failed its internal consistency check.
    #[error("invalid warp cache")]
    InvalidCache,

    /// A boundary policy name or discriminant could not be parsed.
    #[error("invalid boundary policy: {0}")]
    InvalidPolicy(String),

    /// A layer parameter line could not be understood.
    #[error("invalid warp parameter: {0}")]
    InvalidParam(String),

    /// Inputs no longer have the shape the layer was set up or reshaped for.
    #[error("input shape changed since reshape: expected {expected:?}, got {actual:?}")]
    ShapeChanged {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The layer was used before `setup`.
    #[error("warp layer used before setup")]
    NotSetUp,
}

/// Result type for warp operations.
pub type Result<T> = core::result::Result<T, WarpError>;

impl WarpError {
    /// Create a cache mismatch error.
    pub fn cache_mismatch(msg: impl Into<String>) -> Self {
        Self::CacheMismatch(msg.into())
    }

    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParam(msg.into())
    }

    /// Create an invalid policy error.
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_display() {
        let err = WarpError::ShapeMismatch {
            expected: vec![1, 2, 4, 5],
            actual: vec![1, 2, 4, 4],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Optical flow dimensions need to match input"));
        assert!(msg.contains("[1, 2, 4, 4]"));
    }

    #[test]
    fn constructors() {
        assert!(matches!(
            WarpError::cache_mismatch("stale"),
            WarpError::CacheMismatch(_)
        ));
        assert_eq!(
            WarpError::invalid_policy("bicubic").to_string(),
            "invalid boundary policy: bicubic"
        );
    }
}
