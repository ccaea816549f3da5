//! Operation Dispatch Layer
//!
//! This module validates warp inputs once and then selects the kernel set
//! (parallel CPU or serial) for each call, based on the global `Backend`.
//!
//! # Design Highlights
//! - **Validation up front**: shape errors surface before any sampling
//! - **Minimal overhead**: a single atomic load per call
//! - **Deterministic**: every backend returns identical tensors
//!
//! # Example
//! ```rust
//! use briny_warp::ops::dispatch::{warp_backward, warp_forward};
//! use briny_warp::tensors::Tensor;
//! use briny_warp::warp::BoundaryPolicy;
//!
//! let source = Tensor::<f64>::new(vec![1, 1, 2, 2], vec![0.5, 0.6, 0.7, 0.8]);
//! let flow = Tensor::new(vec![1, 2, 2, 2], vec![0.2, -0.2, 0.2, -0.2, 0.3, 0.3, -0.3, -0.3]);
//!
//! let (out, cache) = warp_forward(&source, &flow, BoundaryPolicy::Nearest)?;
//! assert!((out.data[0] - 0.58).abs() < 1e-12);
//!
//! let grad_out = Tensor::new(vec![1, 1, 2, 2], vec![1.0; 4]);
//! let (grad_source, grad_flow) = warp_backward(&grad_out, &source, &cache)?;
//! assert_eq!(grad_source.shape, source.shape);
//! assert_eq!(grad_flow.shape, flow.shape);
//! # Ok::<(), briny_warp::error::WarpError>(())
//! ```

use crate::backend::{get_backend, Backend};
use crate::error::{Result, WarpError};
use crate::scalar::WarpFloat;
use crate::tensors::Tensor;
use crate::warp::{BoundaryPolicy, WarpCache, WarpShape};

/// Warps `source` `[N, C, H, W]` along `flow` `[N, 2, H, W]`.
///
/// # Returns
/// - Output tensor shaped like `source`
/// - The cache required by [`warp_backward`]
///
/// # Errors
/// Fails with a shape error if `flow` does not match `source`.
pub fn warp_forward<T: WarpFloat>(
    source: &Tensor<T>,
    flow: &Tensor<T>,
    policy: BoundaryPolicy,
) -> Result<(Tensor<T>, WarpCache<T>)> {
    let shape = WarpShape::from_inputs(&source.shape, &flow.shape)?;
    Ok(forward_with_shape(&shape, policy, source, flow))
}

/// Computes `(∂L/∂source, ∂L/∂flow)` from `∂L/∂out` and a forward cache.
///
/// `source` must be the tensor the cache was computed from.
///
/// # Errors
/// Fails with [`WarpError::CacheMismatch`] if `source` or `out_grad` do not
/// have the shape the cache was filled for, or [`WarpError::InvalidCache`] if
/// the cache itself is inconsistent.
pub fn warp_backward<T: WarpFloat>(
    out_grad: &Tensor<T>,
    source: &Tensor<T>,
    cache: &WarpCache<T>,
) -> Result<(Tensor<T>, Tensor<T>)> {
    let shape = WarpShape::from_inputs(&source.shape, &cache.shape().flow_shape())
        .map_err(|e| WarpError::cache_mismatch(format!("source does not fit the cache: {e}")))?;
    cache.ensure_matches(&shape)?;
    if out_grad.shape != source.shape {
        return Err(WarpError::cache_mismatch(format!(
            "output gradient has shape {:?}, expected {:?}",
            out_grad.shape, source.shape
        )));
    }
    Ok(backward_with_shape(&shape, out_grad, source, cache))
}

/// Runs the forward kernels of the active backend on pre-validated shapes.
pub(crate) fn forward_with_shape<T: WarpFloat>(
    shape: &WarpShape,
    policy: BoundaryPolicy,
    source: &Tensor<T>,
    flow: &Tensor<T>,
) -> (Tensor<T>, WarpCache<T>) {
    let backend = get_backend();
    log::trace!("warp forward {:?} policy={policy} backend={backend:?}", shape.source_shape());
    match backend {
        Backend::Serial => super::serial::warp_forward(shape, policy, source, flow),
        Backend::Cpu => super::cpu::warp_forward(shape, policy, source, flow),
    }
}

/// Runs the backward kernels of the active backend on pre-validated shapes.
pub(crate) fn backward_with_shape<T: WarpFloat>(
    shape: &WarpShape,
    out_grad: &Tensor<T>,
    source: &Tensor<T>,
    cache: &WarpCache<T>,
) -> (Tensor<T>, Tensor<T>) {
    let backend = get_backend();
    log::trace!(
        "warp backward {:?} policy={} backend={backend:?}",
        shape.source_shape(),
        cache.policy()
    );
    match backend {
        Backend::Serial => super::serial::warp_backward(shape, out_grad, source, cache),
        Backend::Cpu => super::cpu::warp_backward(shape, out_grad, source, cache),
    }
}
