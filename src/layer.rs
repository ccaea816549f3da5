//! Host-side warp layer.
//!
//! [`WarpLayer`] wraps the warp kernels in the lifecycle a network runtime
//! drives: `setup` once, `reshape` whenever input shapes change, then any
//! number of `forward`/`backward` calls on that shape.
//!
//! The layer takes exactly two inputs (bottoms), the source `[N, C, H, W]`
//! and the flow `[N, 2, H, W]`, and produces one output (top) shaped like the
//! source.
//!
//! # Example
//! ```rust
//! use briny_warp::layer::WarpLayer;
//! use briny_warp::param::WarpParam;
//! use briny_warp::tensors::{Tensor, WithGrad};
//!
//! let mut source = WithGrad::new(Tensor::new(vec![1, 1, 2, 2], vec![0.5, 0.6, 0.7, 0.8]));
//! let mut flow = WithGrad::new(Tensor::zeros(vec![1, 2, 2, 2]));
//!
//! let mut layer = WarpLayer::new(WarpParam::default());
//! layer.setup(&source.value, &flow.value)?;
//!
//! let (top, cache) = layer.forward(&source.value, &flow.value)?;
//! assert_eq!(top.data, source.value.data);
//!
//! let top_grad = Tensor::new(vec![1, 1, 2, 2], vec![1.0; 4]);
//! layer.backward(&top_grad, &cache, &mut source, &mut flow, [true, false])?;
//! assert_eq!(source.grad.data, vec![1.0; 4]);
//! assert_eq!(flow.grad.data, vec![0.0; 8]);
//! # Ok::<(), briny_warp::error::WarpError>(())
//! ```

use crate::error::{Result, WarpError};
use crate::ops::dispatch::{backward_with_shape, forward_with_shape};
use crate::param::WarpParam;
use crate::scalar::WarpFloat;
use crate::tensors::{Tensor, WithGrad};
use crate::warp::{BoundaryPolicy, WarpCache, WarpShape};

/// Bilinear warp layer with a fixed boundary policy.
#[derive(Debug, Clone, Default)]
pub struct WarpLayer {
    param: WarpParam,
    shape: Option<WarpShape>,
}

impl WarpLayer {
    /// Number of inputs the layer consumes.
    pub const NUM_BOTTOMS: usize = 2;
    /// Number of outputs the layer produces.
    pub const NUM_TOPS: usize = 1;

    /// Creates a layer that has not been set up yet.
    #[must_use]
    pub const fn new(param: WarpParam) -> Self {
        Self { param, shape: None }
    }

    /// Layer type name, as it appears in network definitions.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        "Warp"
    }

    /// Parameters the layer was built with.
    #[must_use]
    pub const fn param(&self) -> WarpParam {
        self.param
    }

    /// Boundary policy applied to out-of-range coordinates.
    #[must_use]
    pub const fn policy(&self) -> BoundaryPolicy {
        self.param.outliers
    }

    /// Shape recorded by the last `setup`/`reshape`, if any.
    #[must_use]
    pub const fn shape(&self) -> Option<WarpShape> {
        self.shape
    }

    /// Validates the inputs and records their shape.
    ///
    /// # Errors
    /// Fails if `flow` is not `[N, 2, H, W]` for a source `[N, C, H, W]`.
    pub fn setup<T>(&mut self, source: &Tensor<T>, flow: &Tensor<T>) -> Result<()> {
        let shape = WarpShape::from_inputs(&source.shape, &flow.shape)?;
        log::debug!(
            "warp layer setup: source {:?}, flow {:?}, outliers {}",
            shape.source_shape(),
            shape.flow_shape(),
            self.policy()
        );
        self.shape = Some(shape);
        Ok(())
    }

    /// Re-validates the inputs after a shape change and returns the output
    /// shape.
    ///
    /// # Errors
    /// [`WarpError::NotSetUp`] before `setup`, or a shape error as in
    /// [`Self::setup`]. On error the previously recorded shape is kept.
    pub fn reshape<T>(&mut self, source: &Tensor<T>, flow: &Tensor<T>) -> Result<[usize; 4]> {
        let previous = self.shape.ok_or(WarpError::NotSetUp)?;
        let shape = WarpShape::from_inputs(&source.shape, &flow.shape)?;
        if shape != previous {
            log::debug!(
                "warp layer reshape: {:?} -> {:?}",
                previous.source_shape(),
                shape.source_shape()
            );
        }
        self.shape = Some(shape);
        Ok(shape.source_shape())
    }

    /// Warps `source` along `flow`.
    ///
    /// # Errors
    /// [`WarpError::NotSetUp`] before `setup`, [`WarpError::ShapeChanged`] if
    /// the inputs differ from the recorded shape.
    pub fn forward<T: WarpFloat>(
        &self,
        source: &Tensor<T>,
        flow: &Tensor<T>,
    ) -> Result<(Tensor<T>, WarpCache<T>)> {
        let shape = self.check_inputs(source, flow)?;
        Ok(forward_with_shape(&shape, self.policy(), source, flow))
    }

    /// Backpropagates `top_grad` into the gradient buffers of the inputs.
    ///
    /// `propagate_down[0]` selects the source, `propagate_down[1]` the flow.
    /// Requested gradients overwrite the `grad` buffer; the others are left
    /// untouched. With neither flag set nothing is computed.
    ///
    /// # Errors
    /// - [`WarpError::NotSetUp`] / [`WarpError::ShapeChanged`] as in [`Self::forward`]
    /// - [`WarpError::CacheMismatch`] if `cache` or `top_grad` belong to another shape
    /// - [`WarpError::InvalidCache`] if the cache is internally inconsistent
    pub fn backward<T: WarpFloat>(
        &self,
        top_grad: &Tensor<T>,
        cache: &WarpCache<T>,
        source: &mut WithGrad<Tensor<T>>,
        flow: &mut WithGrad<Tensor<T>>,
        propagate_down: [bool; 2],
    ) -> Result<()> {
        let [to_source, to_flow] = propagate_down;
        if !to_source && !to_flow {
            return Ok(());
        }

        let shape = self.check_inputs(&source.value, &flow.value)?;
        cache.ensure_matches(&shape)?;
        if top_grad.shape != source.value.shape {
            return Err(WarpError::cache_mismatch(format!(
                "top gradient has shape {:?}, expected {:?}",
                top_grad.shape, source.value.shape
            )));
        }

        let (source_grad, flow_grad) = backward_with_shape(&shape, top_grad, &source.value, cache);
        if to_source {
            source.grad.update(source_grad);
        }
        if to_flow {
            flow.grad.update(flow_grad);
        }
        Ok(())
    }

    fn check_inputs<T>(&self, source: &Tensor<T>, flow: &Tensor<T>) -> Result<WarpShape> {
        let expected = self.shape.ok_or(WarpError::NotSetUp)?;
        let drifted = |actual: &[usize], expected: [usize; 4]| WarpError::ShapeChanged {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        };
        if source.shape != expected.source_shape() {
            return Err(drifted(&source.shape, expected.source_shape()));
        }
        if flow.shape != expected.flow_shape() {
            return Err(drifted(&flow.shape, expected.flow_shape()));
        }
        Ok(expected)
    }
}
