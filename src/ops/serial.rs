//! Single-threaded reference kernels.
//!
//! Loops run batch, then channel, then row and column. Used when [`crate::backend::Backend::Serial`] is selected.

use crate::scalar::WarpFloat;
use crate::tensors::Tensor;
use crate::warp::kernel::{backprop_plane, sample_plane};
use crate::warp::{fill_batch, BoundaryPolicy, WarpCache, WarpShape};

/// Resamples `source` along `flow`, returning the output and its cache.
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
    let (plane, batch) = (shape.plane(), shape.flow_batch());

    let (coord, frac, inv) = cache.buffers_mut();
    for n in 0..shape.num {
        let r = n * batch..(n + 1) * batch;
        fill_batch(
            policy,
            shape.height,
            shape.width,
            &flow.data[r.clone()],
            &mut coord[r.clone()],
            &mut frac[r.clone()],
            &mut inv[r],
        );
    }

    for n in 0..shape.num {
        let view = cache.batch(n);
        for c in 0..shape.channels {
            let r = (n * shape.channels + c) * plane..(n * shape.channels + c + 1) * plane;
            sample_plane(&view, shape.width, &source.data[r.clone()], &mut out.data[r]);
        }
    }

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
    let (plane, batch) = (shape.plane(), shape.flow_batch());

    for n in 0..shape.num {
        let view = cache.batch(n);
        let flow_batch = &mut flow_grad.data[n * batch..(n + 1) * batch];
        for c in 0..shape.channels {
            let r = (n * shape.channels + c) * plane..(n * shape.channels + c + 1) * plane;
            backprop_plane(
                &view,
                shape.width,
                &source.data[r.clone()],
                &out_grad.data[r.clone()],
                &mut source_grad.data[r],
                flow_batch,
            );
        }
    }

    (source_grad, flow_grad)
}
