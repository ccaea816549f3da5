//! Differentiable warp operation.
//!
//! # Autograd Pattern
//!
//! Like every differentiable op in this crate family, [`warp`] follows a simple
//! pattern:
//! 1. **Inputs** are references to `WithGrad<Tensor<T>>`.
//! 2. **Forward Pass** computes the output tensor and a [`WarpCache`].
//! 3. **Backward Pass** is a closure that owns the cache and a copy of the
//!    source, mapping `dL/d(out)` to `(dL/d(source), dL/d(flow))`.
//! 4. **Gradient Application** is left to the caller ([`accumulate`] helps).
//!
//! Because the closure owns the cache it cannot outlive or precede the forward
//! call that produced it; use [`crate::ops::dispatch`] directly when the cache
//! has to be inspected or stored.
//!
//! [`WarpCache`]: crate::warp::WarpCache

use crate::error::Result;
use crate::ops::dispatch::{backward_with_shape, forward_with_shape};
use crate::scalar::WarpFloat;
use crate::tensors::{Tensor, WithGrad};
use crate::warp::{BoundaryPolicy, WarpShape};

/// Warps `source` along `flow` with bilinear sampling.
///
/// # Returns
/// - `out`: the warped tensor, shaped like `source`
/// - `back`: closure mapping `dL/d(out)` to `(dL/d(source), dL/d(flow))`
///
/// # Errors
/// Fails if the flow does not have shape `[N, 2, H, W]` matching the source.
///
/// # Panics
/// `back` panics if handed a gradient whose shape differs from `out`.
///
/// # Example
/// ```rust
/// use briny_warp::backprop::warp;
/// use briny_warp::tensors::{Tensor, WithGrad};
/// use briny_warp::warp::BoundaryPolicy;
///
/// let source = WithGrad::new(Tensor::new(vec![1, 1, 1, 3], vec![1.0, 2.0, 4.0]));
/// let flow = WithGrad::new(Tensor::new(vec![1, 2, 1, 3], vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0]));
///
/// let (out, back) = warp(&source, &flow, BoundaryPolicy::Truncate)?;
/// assert_eq!(out.data, vec![1.5, 3.0, 4.0]);
///
/// let (grad_source, grad_flow) = back(&Tensor::new(vec![1, 1, 1, 3], vec![1.0; 3]));
/// assert_eq!(grad_source.data, vec![0.5, 1.0, 1.5]);
/// assert_eq!(&grad_flow.data[..3], &[1.0, 2.0, 0.0]);
/// # Ok::<(), briny_warp::error::WarpError>(())
/// ```
pub fn warp<T: WarpFloat>(
    source: &WithGrad<Tensor<T>>,
    flow: &WithGrad<Tensor<T>>,
    policy: BoundaryPolicy,
) -> Result<(Tensor<T>, impl Fn(&Tensor<T>) -> (Tensor<T>, Tensor<T>) + use<T>)> {
    let shape = WarpShape::from_inputs(&source.value.shape, &flow.value.shape)?;
    let (out, cache) = forward_with_shape(&shape, policy, &source.value, &flow.value);

    let source_val = source.value.clone();
    let back = move |grad_output: &Tensor<T>| {
        assert_eq!(
            grad_output.shape, source_val.shape,
            "output gradient shape mismatch"
        );
        backward_with_shape(&shape, grad_output, &source_val, &cache)
    };

    Ok((out, back))
}

/// Adds `grad` into the gradient buffer of `target`.
///
/// # Panics
/// Panics if shapes do not match.
pub fn accumulate<T: WarpFloat>(target: &mut WithGrad<Tensor<T>>, grad: &Tensor<T>) {
    assert_eq!(target.grad.shape, grad.shape, "gradient shape mismatch");
    for (g, &d) in target.grad.data.iter_mut().zip(&grad.data) {
        *g += d;
    }
}
