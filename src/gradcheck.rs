//! Finite-difference gradient checking.
//!
//! [`GradientChecker`] compares the analytic Jacobian produced by the backward
//! kernels against central differences of the forward kernels, one input
//! element and one output element at a time. It is exhaustive and therefore
//! only meant for small tensors.
//!
//! The warp is piecewise bilinear: it has kinks wherever a sampling coordinate
//! crosses an integer. Inputs whose coordinates lie within `stepsize` of an
//! integer produce meaningless numeric derivatives and should not be checked.
//!
//! ```rust
//! use briny_warp::gradcheck::{GradientChecker, Input};
//! use briny_warp::tensors::Tensor;
//! use briny_warp::warp::BoundaryPolicy;
//!
//! let source = Tensor::new(vec![1, 1, 2, 2], vec![0.5, 0.6, 0.7, 0.8]);
//! let flow = Tensor::new(vec![1, 2, 2, 2], vec![0.2, -0.2, 0.2, -0.2, 0.3, 0.3, -0.3, -0.3]);
//!
//! let checker = GradientChecker::new(1e-6, 1e-4);
//! checker.check_exhaustive(BoundaryPolicy::Nearest, &source, &flow, Input::Flow)?;
//! # Ok::<(), briny_warp::gradcheck::GradientError>(())
//! ```

use crate::error::WarpError;
use crate::ops::dispatch::{backward_with_shape, forward_with_shape};
use crate::scalar::{from_f64, to_f64, WarpFloat};
use crate::tensors::Tensor;
use crate::warp::{BoundaryPolicy, WarpShape};
use core::fmt;
use thiserror::Error;

/// Which warp input a check differentiates with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The sampled tensor `[N, C, H, W]`.
    Source,
    /// The displacement field `[N, 2, H, W]`.
    Flow,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Flow => "flow",
        })
    }
}

/// First Jacobian entry whose analytic and numeric values disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientMismatch {
    pub input: Input,
    /// Flat index into the checked input.
    pub input_index: usize,
    /// Flat index into the output.
    pub output_index: usize,
    pub analytic: f64,
    pub numeric: f64,
}

impl fmt::Display for GradientMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d out[{}] / d {}[{}]: analytic {} vs numeric {}",
            self.output_index, self.input, self.input_index, self.analytic, self.numeric
        )
    }
}

/// Failure of a gradient check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradientError {
    /// The inputs could not be warped at all.
    #[error(transparent)]
    Warp(#[from] WarpError),

    /// Analytic and numeric gradients disagree.
    #[error("gradient mismatch: {0}")]
    Mismatch(GradientMismatch),
}

/// Exhaustive central-difference gradient checker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientChecker {
    stepsize: f64,
    threshold: f64,
}

impl Default for GradientChecker {
    /// `stepsize = 1e-2`, `threshold = 1e-2`; coarse enough for `f32`.
    fn default() -> Self {
        Self::new(1e-2, 1e-2)
    }
}

impl GradientChecker {
    /// Creates a checker perturbing inputs by `±stepsize` and accepting a
    /// relative error of `threshold`.
    #[must_use]
    pub const fn new(stepsize: f64, threshold: f64) -> Self {
        Self { stepsize, threshold }
    }

    /// Perturbation applied on each side of an input element.
    #[must_use]
    pub const fn stepsize(&self) -> f64 {
        self.stepsize
    }

    /// Accepted error relative to `max(|analytic|, |numeric|, 1)`.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Checks every `∂out_j / ∂input_i` of one warp input.
    ///
    /// Analytic entries come from backward passes with one-hot output
    /// gradients; numeric entries from `(out_j(x_i + ε) - out_j(x_i - ε)) / 2ε`.
    ///
    /// # Errors
    /// [`GradientError::Warp`] if the shapes are invalid, otherwise
    /// [`GradientError::Mismatch`] with the first entry (by input index, then
    /// output index) that exceeds the threshold.
    pub fn check_exhaustive<T: WarpFloat>(
        &self,
        policy: BoundaryPolicy,
        source: &Tensor<T>,
        flow: &Tensor<T>,
        input: Input,
    ) -> Result<(), GradientError> {
        let shape = WarpShape::from_inputs(&source.shape, &flow.shape)?;
        let (out, cache) = forward_with_shape(&shape, policy, source, flow);

        // jacobian[j][i] = d out_j / d input_i
        let mut one_hot = out.zeros_like();
        let mut jacobian = Vec::with_capacity(out.len());
        for j in 0..out.len() {
            one_hot.data[j] = T::one();
            let (source_grad, flow_grad) = backward_with_shape(&shape, &one_hot, source, &cache);
            one_hot.data[j] = T::zero();
            let row = match input {
                Input::Source => source_grad,
                Input::Flow => flow_grad,
            };
            jacobian.push(row.data);
        }

        let output_at = |src: &Tensor<T>, fl: &Tensor<T>| forward_with_shape(&shape, policy, src, fl).0;
        let mut src = source.clone();
        let mut fl = flow.clone();
        let checked_len = match input {
            Input::Source => source.len(),
            Input::Flow => flow.len(),
        };

        for i in 0..checked_len {
            let target = match input {
                Input::Source => &mut src.data[i],
                Input::Flow => &mut fl.data[i],
            };
            let original = *target;
            let plus = original + from_f64::<T>(self.stepsize);
            let minus = original - from_f64::<T>(self.stepsize);
            let step = to_f64(plus) - to_f64(minus);

            *target = plus;
            let out_plus = output_at(&src, &fl);
            Self::restore(input, &mut src, &mut fl, i, minus);
            let out_minus = output_at(&src, &fl);
            Self::restore(input, &mut src, &mut fl, i, original);

            for (j, row) in jacobian.iter().enumerate() {
                let analytic = to_f64(row[i]);
                let numeric = (to_f64(out_plus.data[j]) - to_f64(out_minus.data[j])) / step;
                let scale = analytic.abs().max(numeric.abs()).max(1.0);
                if (analytic - numeric).abs() > self.threshold * scale {
                    return Err(GradientError::Mismatch(GradientMismatch {
                        input,
                        input_index: i,
                        output_index: j,
                        analytic,
                        numeric,
                    }));
                }
            }
        }

        log::trace!(
            "gradient check passed: {input} of {:?}, {} x {} entries",
            shape.source_shape(),
            out.len(),
            checked_len
        );
        Ok(())
    }

    fn restore<T: Copy>(input: Input, src: &mut Tensor<T>, fl: &mut Tensor<T>, i: usize, value: T) {
        match input {
            Input::Source => src.data[i] = value,
            Input::Flow => fl.data[i] = value,
        }
    }
}
