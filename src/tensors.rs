//! Core tensor data structures.
//!
//! # Tensor Container
//!
//! The warp kernels operate on dense, row-major tensors. This module provides the
//! small host container they read from and write into.
//!
//! It supports:
//! - Construction of N-dimensional tensors with shape and row-major data layout
//! - Zero-filled allocation mirroring another tensor's shape
//! - `WithGrad` wrappers pairing a value with a gradient buffer of the same shape
//! - The `tensor!` macro for literal tensors
//!
//! ## Design Highlights
//! - Tensors are strongly typed: `Tensor<T>` for any element type (usually `f32` or `f64`)
//! - Shape is stored as a `Vec<usize>` and enforced at runtime
//! - Image-like tensors are laid out `[N, C, H, W]` with `W` varying fastest
//!
//! ## Limitations
//! - Row-major only
//! - No broadcasting, slicing, or views
//!
//! ## Example
//!
//! ```rust
//! use briny_warp::tensors::Tensor;
//! let t = Tensor::new(vec![1, 1, 2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![1, 1, 2, 3]);
//! assert_eq!(t.at4(0, 0, 1, 2), 6.0);
//! ```

use crate::scalar::WarpFloat;

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - All elements must be the same type (`T`).
/// - `shape` defines the structure, e.g., `[1, 3, 4, 5]` for one 3-channel 4×5 image.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// A tensor of `f64`s.
pub type Ten64 = Tensor<f64>;

/// A tensor of `f32`s.
pub type Ten32 = Tensor<f32>;

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Replaces this tensor's data with another tensor of the same shape.
    ///
    /// # Panics
    /// Panics if shapes do not match.
    pub fn update(&mut self, mut other: Tensor<T>) {
        assert_eq!(self.shape, other.shape, "shape mismatch");
        core::mem::swap(&mut self.data, &mut other.data);
    }
}

impl<T: WarpFloat> Tensor<T> {
    /// Allocates a zero-filled tensor.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![T::zero(); len],
        }
    }

    /// Allocates a zero-filled tensor with the shape of `self`.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape.clone())
    }

    /// Reads element `[n, c, h, w]` of a rank-4 tensor.
    ///
    /// # Panics
    /// Panics if the tensor is not rank 4 or the index is out of bounds.
    #[must_use]
    pub fn at4(&self, n: usize, c: usize, h: usize, w: usize) -> T {
        let &[_, channels, height, width] = self.shape.as_slice() else {
            panic!("at4 on a tensor of shape {:?}", self.shape);
        };
        self.data[((n * channels + c) * height + h) * width + w]
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x)
    }
}

/// A container for tracking gradients of values (used in autograd).
///
/// Typically used as `WithGrad<Tensor<f32>>` or `WithGrad<Tensor<f64>>`. The
/// gradient buffer always has the same shape as the value.
#[derive(Debug, Clone)]
pub struct WithGrad<T> {
    pub value: T,
    pub grad: T,
}

impl<T: WarpFloat> WithGrad<Tensor<T>> {
    /// Wraps a tensor with a zero-initialized gradient.
    pub fn new(value: Tensor<T>) -> Self {
        let grad = value.zeros_like();
        Self { value, grad }
    }

    /// Resets the gradient buffer to zero.
    pub fn zero_grad(&mut self) {
        self.grad.data.fill(T::zero());
    }
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use briny_warp::tensor;
/// let t = tensor!([[[[1.0, 2.0], [3.0, 4.0]]]]);
/// assert_eq!(t.shape, vec![1, 1, 2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ($lit:literal) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$lit])
    };

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let children = vec![ $( $crate::tensor!($inner) ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};
}
