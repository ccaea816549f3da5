//! Parallel CPU backend warp kernels
//!
//! # CPU Backend
//!
//! These are the default kernels behind [`crate::ops::dispatch`] and
//! [`crate::backprop::warp`].
//!
//! ## Partitioning
//!
//! - Cache fill: one task per batch entry (`2×H×W` coordinates and weights)
//! - Forward sampling: one task per `(n, c)` output plane; planes never overlap
//! - Backward: one task per `(n, c)` plane. The plane owns its slice of the
//!   source gradient, since all four neighbours of a site lie in the same plane.
//!   Flow gradients sum over channels, so every task writes into its own
//!   partial buffer and the partials are merged per batch entry afterwards in
//!   channel order.
//!
//! The merge order matches the serial kernels exactly, so both backends return
//! bit-identical tensors.

use crate::scalar::WarpFloat;
use crate::tensors::Tensor;
use crate::warp::kernel::{backprop_plane, sample_plane};
use crate::warp::{fill_batch, BoundaryPolicy, WarpCache, WarpShape};
use rayon::prelude::*;

/// Resamples `source` along `flow`, returning the output and its cache.
///
/// Shapes must already have been validated into `shape`.
///
/// # Panics
/// Panics if `source` or `flow` does not have the length `shape` describes.
pub fn warp_forward<T: WarpFloat>(
    shape: &WarpShape,
    policy: BoundaryPolicy,
    source: &Tensor<T>,
    flow: &Tensor<T>,
) -> (Tensor<T>, WarpCache<T>) {
    assert_eq!(source.len(), shape.source_len(), "source does not match warp shape");
    assert_eq!(flow.len(), shape.flow_len(), "flow does not match warp shape");
    let mut cache = WarpCache::zeros(*shape, policy);
    let mut out = Tensor::zeros(shape.source_shape());
    let (height, width, channels) = (shape.height, shape.width, shape.channels);
    let plane = shape.plane();
    if plane == 0 {
        return (out, cache);
    }

    let batch = shape.flow_batch();
    let (coord, frac, inv) = cache.buffers_mut();
    coord
        .par_chunks_mut(batch)
        .zip(frac.par_chunks_mut(batch))
        .zip(inv.par_chunks_mut(batch))
        .zip(flow.data.par_chunks(batch))
        .for_each(|(((coord, frac), inv), flow)| {
            fill_batch(policy, height, width, flow, coord, frac, inv);
        });

    let cache_ref = &cache;
    out.data
        .par_chunks_mut(plane)
        .zip(source.data.par_chunks(plane))
        .enumerate()
        .for_each(|(i, (out, src))| {
            sample_plane(&cache_ref.batch(i / channels), width, src, out);
        });

    (out, cache)
}

/// Propagates `out_grad` back to the source and the flow.
///
/// Returns `(source_grad, flow_grad)`.
///
/// # Panics
/// Panics if `out_grad` or `source` does not match `shape`, or if `cache`
/// was filled for another shape.
pub fn warp_backward<T: WarpFloat>(
    shape: &WarpShape,
    out_grad: &Tensor<T>,
    source: &Tensor<T>,
    cache: &WarpCache<T>,
) -> (Tensor<T>, Tensor<T>) {
    assert_eq!(out_grad.len(), shape.source_len(), "output gradient does not match warp shape");
    assert_eq!(source.len(), shape.source_len(), "source does not match warp shape");
    assert_eq!(cache.shape(), *shape, "cache was filled for another shape");
    let mut source_grad = Tensor::zeros(shape.source_shape());
    let mut flow_grad = Tensor::zeros(shape.flow_shape());
    let (width, channels) = (shape.width, shape.channels);
    let plane = shape.plane();
    if plane == 0 || channels == 0 {
        return (source_grad, flow_grad);
    }

    let batch = shape.flow_batch();
    let partials: Vec<Vec<T>> = source_grad
        .data
        .par_chunks_mut(plane)
        .zip(source.data.par_chunks(plane))
        .zip(out_grad.data.par_chunks(plane))
        .enumerate()
        .map(|(i, ((grad, src), dy))| {
            let mut partial = vec![T::zero(); batch];
            backprop_plane(&cache.batch(i / channels), width, src, dy, grad, &mut partial);
            partial
        })
        .collect();

    // reduce: one batch entry per task, channels in order
    flow_grad
        .data
        .par_chunks_mut(batch)
        .zip(partials.par_chunks(channels))
        .for_each(|(dst, parts)| {
            for part in parts {
                for (d, &p) in dst.iter_mut().zip(part) {
                    *d += p;
                }
            }
        });

    (source_grad, flow_grad)
}
