//! Element types accepted by the warp kernels.
//!
//! The kernels are written once over [`WarpFloat`], which every thread-safe
//! [`num_traits::Float`] implements. In practice that means `f32` and `f64`.

use core::fmt::Debug;
use core::ops::AddAssign;
use num_traits::{Float, FromPrimitive};

/// Floating point element of a warp tensor.
pub trait WarpFloat: Float + FromPrimitive + AddAssign + Debug + Send + Sync + 'static {}

impl<T> WarpFloat for T where T: Float + FromPrimitive + AddAssign + Debug + Send + Sync + 'static {}

/// Grid index `i` as a coordinate.
#[inline]
pub(crate) fn coord_of<T: WarpFloat>(i: usize) -> T {
    T::from_usize(i).unwrap_or_else(T::infinity)
}

/// Grid index of an integral coordinate. Negative or NaN coordinates map to `0`.
#[inline]
pub(crate) fn index_of<T: WarpFloat>(coord: T) -> usize {
    coord.to_usize().unwrap_or(0)
}

/// Lossy conversion from `f64`, used for step sizes.
#[inline]
pub(crate) fn from_f64<T: WarpFloat>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::nan)
}

/// Widening conversion to `f64`, used for error measures.
#[inline]
pub(crate) fn to_f64<T: WarpFloat>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
