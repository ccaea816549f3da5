//! Per-plane forward and backward kernels shared by every backend.

use super::cache::CacheView;
use super::{COL_CHANNEL, ROW_CHANNEL};
use crate::scalar::WarpFloat;

/// Resamples one `H×W` source plane into `out`.
///
/// Every element of `out` is overwritten; truncated sites become zero.
pub(crate) fn sample_plane<T: WarpFloat>(
    view: &CacheView<'_, T>,
    width: usize,
    source: &[T],
    out: &mut [T],
) {
    for (site, y) in out.iter_mut().enumerate() {
        let (h, w) = (site / width, site % width);
        *y = view
            .site(h, w)
            .map_or(T::zero(), |bilinear| bilinear.blend(source));
    }
}

/// Backpropagates one `H×W` plane of the output gradient.
///
/// `source_grad` is the matching plane of the source gradient; `flow_grad` is a
/// whole batch entry (`2×H×W`) of the flow gradient. Both are accumulated into,
/// since several sites may share a neighbour.
pub(crate) fn backprop_plane<T: WarpFloat>(
    view: &CacheView<'_, T>,
    width: usize,
    source: &[T],
    out_grad: &[T],
    source_grad: &mut [T],
    flow_grad: &mut [T],
) {
    let plane = source.len();
    for (site, &dy) in out_grad.iter().enumerate() {
        let (h, w) = (site / width, site % width);
        let Some(bilinear) = view.site(h, w) else {
            continue;
        };

        let (d_row, d_col) = bilinear.slopes(source);
        flow_grad[ROW_CHANNEL * plane + site] += d_row * dy;
        flow_grad[COL_CHANNEL * plane + site] += d_col * dy;

        for (&tap, &weight) in bilinear.taps.iter().zip(&bilinear.weights) {
            source_grad[tap] += weight * dy;
        }
    }
}
