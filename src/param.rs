//! Layer configuration.
//!
//! A warp layer has a single option, the boundary policy (`outliers`). It is
//! read once when the layer is built and never changes afterwards.
//!
//! Parameters can be built in code or parsed from the `key: VALUE` text form
//! used by network definition files:
//!
//! ```rust
//! use briny_warp::param::WarpParam;
//! use briny_warp::warp::BoundaryPolicy;
//!
//! let param: WarpParam = "outliers: TRUNCATE".parse()?;
//! assert_eq!(param.outliers, BoundaryPolicy::Truncate);
//! # Ok::<(), briny_warp::error::WarpError>(())
//! ```

use crate::error::{Result, WarpError};
use crate::warp::BoundaryPolicy;
use core::str::FromStr;

/// Configuration of a [`crate::layer::WarpLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WarpParam {
    /// How coordinates outside the grid are handled.
    pub outliers: BoundaryPolicy,
}

impl WarpParam {
    /// Parameters with the given boundary policy.
    #[must_use]
    pub const fn new(outliers: BoundaryPolicy) -> Self {
        Self { outliers }
    }
}

impl From<BoundaryPolicy> for WarpParam {
    fn from(outliers: BoundaryPolicy) -> Self {
        Self::new(outliers)
    }
}

impl FromStr for WarpParam {
    type Err = WarpError;

    /// Parses `outliers: NEAREST`-style text. Blank input and `#` comments
    /// yield the defaults; unknown keys are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let mut param = Self::default();
        for line in s.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| WarpError::invalid_param(format!("expected `key: VALUE`, got `{line}`")))?;
            match key.trim() {
                "outliers" => param.outliers = value.parse()?,
                other => {
                    return Err(WarpError::invalid_param(format!("unknown option `{other}`")));
                }
            }
        }
        Ok(param)
    }
}
