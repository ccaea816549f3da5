use crate::error::WarpError;
use crate::scalar::{coord_of, index_of, WarpFloat};
use core::fmt;
use core::str::FromStr;

/// Rule applied when a warped coordinate leaves the valid index range.
///
/// Selected once when a layer is configured; every axis of every site is
/// resolved with the same policy in the forward and backward passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BoundaryPolicy {
    /// Clamp both neighbours to the nearest edge index.
    ///
    /// The interpolation weight is *not* clamped: below the grid it is the
    /// raw coordinate, past the last index it is `coord - extent`. Because both
    /// neighbours coincide the blend still reduces to the edge pixel along that
    /// axis.
    #[default]
    Nearest = 0,
    /// Zero every channel of a site whose coordinate leaves `[0, extent - 1]`
    /// on either axis.
    Truncate = 1,
}

impl BoundaryPolicy {
    /// Integer neighbours `[floor, ceil]` sampled for `coord` along an axis of
    /// length `extent`, or `None` when the site is truncated.
    #[inline]
    pub fn taps<T: WarpFloat>(self, coord: T, extent: usize) -> Option<[usize; 2]> {
        let last = extent.saturating_sub(1);
        match self {
            Self::Nearest => {
                if coord >= coord_of::<T>(last) {
                    Some([last; 2])
                } else if coord < T::zero() {
                    Some([0; 2])
                } else {
                    Some([index_of(coord.floor()), index_of(coord.ceil())])
                }
            }
            Self::Truncate => {
                if coord >= T::zero() && coord <= coord_of::<T>(last) {
                    Some([index_of(coord.floor()), index_of(coord.ceil())])
                } else {
                    None
                }
            }
        }
    }

    /// Weight of the `ceil` neighbour for `coord` along an axis of length
    /// `extent`. The `floor` neighbour gets `1 - weight`.
    #[inline]
    pub fn weight<T: WarpFloat>(self, coord: T, extent: usize) -> T {
        let frac = coord - coord.floor();
        match self {
            Self::Nearest => {
                if coord >= coord_of::<T>(extent.saturating_sub(1)) {
                    coord - coord_of::<T>(extent)
                } else if coord < T::zero() {
                    coord
                } else {
                    frac
                }
            }
            Self::Truncate => frac,
        }
    }

    /// Upper-case name, as spelled in layer parameter files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "NEAREST",
            Self::Truncate => "TRUNCATE",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryPolicy {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "truncate" => Ok(Self::Truncate),
            _ => Err(WarpError::invalid_policy(s)),
        }
    }
}

impl TryFrom<u8> for BoundaryPolicy {
    type Error = WarpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Truncate),
            other => Err(WarpError::invalid_policy(format!("discriminant {other}"))),
        }
    }
}
