//! briny_warp: bilinear optical-flow warping with analytic gradients.
//!
//! Resamples an image batch along a dense per-pixel displacement field and
//! backpropagates into both the image and the field, for use inside
//! differentiable vision models.
//!
//! # Features
//!
//! - Bilinear forward warp of `[N, C, H, W]` tensors along `[N, 2, H, W]` flows.
//! - Analytic backward pass for both inputs, driven by an explicit forward cache.
//! - Two boundary policies: `Nearest` (clamp to the edge) and `Truncate` (zero).
//! - Parallel (`rayon`) and serial kernels with bit-identical results.
//! - A host layer with setup/reshape/forward/backward and a finite-difference
//!   gradient checker.
//!
//! # Modules
//!
//! - [`tensors`] — Tensor container and gradient wrapper.
//! - [`warp`] — Boundary policies, shapes and the forward cache.
//! - [`ops`] — Forward/backward kernels and backend dispatch.
//! - [`backprop`] — Functional `(out, back)` entry point.
//! - [`layer`] — The warp layer and its lifecycle.
//! - [`param`] — Layer configuration.
//! - [`gradcheck`] — Numeric gradient verification.
//! - [`backend`] — Execution backend selection.
//! - [`error`] — Error types.
//!
//! # Flow Convention
//!
//! Flow channel 0 displaces along columns (width) and channel 1 along rows
//! (height). See [`warp`] for the sampling formulas.
//!
//! # Example
//!
//! ```rust
//! use briny_warp::ops::dispatch::warp_forward;
//! use briny_warp::tensors::Tensor;
//! use briny_warp::warp::BoundaryPolicy;
//!
//! let source = Tensor::new(vec![1, 1, 1, 2], vec![0.0, 1.0]);
//! // shift every column a quarter pixel to the right
//! let flow = Tensor::new(vec![1, 2, 1, 2], vec![0.25, 0.25, 0.0, 0.0]);
//! let (out, _cache) = warp_forward(&source, &flow, BoundaryPolicy::Truncate)?;
//! assert_eq!(out.data, vec![0.25, 0.0]);
//! # Ok::<(), briny_warp::error::WarpError>(())
//! ```

pub mod backend;
pub mod backprop;
pub mod error;
pub mod gradcheck;
pub mod layer;
pub mod ops;
pub mod param;
pub mod scalar;
pub mod tensors;
pub mod warp;
