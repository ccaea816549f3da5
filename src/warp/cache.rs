use super::{BoundaryPolicy, WarpShape, COL_CHANNEL, ROW_CHANNEL};
use crate::error::{Result, WarpError};
use crate::scalar::{coord_of, WarpFloat};
use crate::tensors::Tensor;
use briny::prelude::{Validate, ValidationError};

/// Sampling state recorded by a forward warp and consumed by its backward pass.
///
/// All three tensors are shaped like the flow field, `[N, 2, H, W]`, with
/// channel 1 describing the row axis and channel 0 the column axis:
///
/// - `warped_coord`: `index + displacement`
/// - `frac_weight`: weight of the `ceil` neighbour after the boundary policy
/// - `inv_frac_weight`: `1 - frac_weight`, weight of the `floor` neighbour
///
/// A cache is only meaningful together with the source it was computed
/// against. Mutating the source between forward and backward yields gradients
/// for the wrong function.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpCache<T> {
    policy: BoundaryPolicy,
    shape: WarpShape,
    warped_coord: Tensor<T>,
    frac_weight: Tensor<T>,
    inv_frac_weight: Tensor<T>,
}

impl<T: WarpFloat> WarpCache<T> {
    pub(crate) fn zeros(shape: WarpShape, policy: BoundaryPolicy) -> Self {
        let dims = shape.flow_shape();
        Self {
            policy,
            shape,
            warped_coord: Tensor::zeros(dims),
            frac_weight: Tensor::zeros(dims),
            inv_frac_weight: Tensor::zeros(dims),
        }
    }

    /// Reassembles a cache from its parts, e.g. after moving it across a
    /// process boundary.
    ///
    /// # Errors
    /// [`WarpError::InvalidCache`] if a tensor is not shaped like the flow of
    /// `shape`, or if the weights are not the ones `policy` derives from the
    /// coordinates.
    pub fn from_parts(
        policy: BoundaryPolicy,
        shape: WarpShape,
        warped_coord: Tensor<T>,
        frac_weight: Tensor<T>,
        inv_frac_weight: Tensor<T>,
    ) -> Result<Self> {
        let cache = Self {
            policy,
            shape,
            warped_coord,
            frac_weight,
            inv_frac_weight,
        };
        cache.validate().map_err(|_| WarpError::InvalidCache)?;
        Ok(cache)
    }

    /// Boundary policy the cache was filled with.
    #[must_use]
    pub const fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Geometry of the forward pass that produced the cache.
    #[must_use]
    pub const fn shape(&self) -> WarpShape {
        self.shape
    }

    /// Sampling coordinates, `index + displacement`.
    #[must_use]
    pub const fn warped_coord(&self) -> &Tensor<T> {
        &self.warped_coord
    }

    /// Interpolation weights of the `ceil` neighbours.
    #[must_use]
    pub const fn frac_weight(&self) -> &Tensor<T> {
        &self.frac_weight
    }

    /// Interpolation weights of the `floor` neighbours.
    #[must_use]
    pub const fn inv_frac_weight(&self) -> &Tensor<T> {
        &self.inv_frac_weight
    }

    /// Read-only view of batch entry `n`.
    pub(crate) fn batch(&self, n: usize) -> CacheView<'_, T> {
        let len = self.shape.flow_batch();
        let range = n * len..(n + 1) * len;
        CacheView {
            policy: self.policy,
            height: self.shape.height,
            width: self.shape.width,
            coord: &self.warped_coord.data[range.clone()],
            frac: &self.frac_weight.data[range.clone()],
            inv: &self.inv_frac_weight.data[range],
        }
    }

    /// The three cache buffers, for the forward kernels to fill.
    pub(crate) fn buffers_mut(&mut self) -> (&mut [T], &mut [T], &mut [T]) {
        (
            &mut self.warped_coord.data,
            &mut self.frac_weight.data,
            &mut self.inv_frac_weight.data,
        )
    }

    /// Checks that the cache belongs to a forward pass over `shape`.
    ///
    /// # Errors
    /// - [`WarpError::InvalidCache`] if the buffers are internally inconsistent
    /// - [`WarpError::CacheMismatch`] if the cache was built for another shape
    pub fn ensure_matches(&self, shape: &WarpShape) -> Result<()> {
        self.validate().map_err(|_| WarpError::InvalidCache)?;
        if self.shape != *shape {
            return Err(WarpError::cache_mismatch(format!(
                "cache was filled for flow {:?}, backward runs on {:?}",
                self.shape.flow_shape(),
                shape.flow_shape()
            )));
        }
        Ok(())
    }
}

impl<T: WarpFloat> Validate for WarpCache<T> {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let dims = self.shape.flow_shape();
        let shaped = [&self.warped_coord, &self.frac_weight, &self.inv_frac_weight]
            .iter()
            .all(|t| t.shape == dims && t.data.len() == self.shape.flow_len());
        if !shaped {
            return Err(ValidationError);
        }

        let plane = self.shape.height * self.shape.width;
        let same = |a: T, b: T| a == b || (a.is_nan() && b.is_nan());
        for (i, &coord) in self.warped_coord.data.iter().enumerate() {
            let extent = if (i / plane.max(1)) % 2 == ROW_CHANNEL {
                self.shape.height
            } else {
                self.shape.width
            };
            let frac = self.frac_weight.data[i];
            if !same(frac, self.policy.weight(coord, extent))
                || !same(self.inv_frac_weight.data[i], T::one() - frac)
            {
                return Err(ValidationError);
            }
        }
        Ok(())
    }
}

/// Fills the cache entries of one batch entry from its flow.
///
/// All slices are one batch entry long (`2×H×W`).
pub(crate) fn fill_batch<T: WarpFloat>(
    policy: BoundaryPolicy,
    height: usize,
    width: usize,
    flow: &[T],
    coord: &mut [T],
    frac: &mut [T],
    inv: &mut [T],
) {
    let plane = height * width;
    for h in 0..height {
        for w in 0..width {
            let site = h * width + w;
            let ix = ROW_CHANNEL * plane + site;
            let iy = COL_CHANNEL * plane + site;

            coord[ix] = coord_of::<T>(h) + flow[ix];
            coord[iy] = coord_of::<T>(w) + flow[iy];

            frac[ix] = policy.weight(coord[ix], height);
            frac[iy] = policy.weight(coord[iy], width);

            inv[ix] = T::one() - frac[ix];
            inv[iy] = T::one() - frac[iy];
        }
    }
}

/// Cache entries of a single batch entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CacheView<'a, T> {
    policy: BoundaryPolicy,
    height: usize,
    width: usize,
    coord: &'a [T],
    frac: &'a [T],
    inv: &'a [T],
}

impl<T: WarpFloat> CacheView<'_, T> {
    /// Bilinear geometry of site `(h, w)`, or `None` if the policy truncated it.
    #[inline]
    pub(crate) fn site(&self, h: usize, w: usize) -> Option<Bilinear<T>> {
        let plane = self.height * self.width;
        let site = h * self.width + w;
        let ix = ROW_CHANNEL * plane + site;
        let iy = COL_CHANNEL * plane + site;

        let [xf, xc] = self.policy.taps(self.coord[ix], self.height)?;
        let [yf, yc] = self.policy.taps(self.coord[iy], self.width)?;

        let (tx, inv_tx) = (self.frac[ix], self.inv[ix]);
        let (ty, inv_ty) = (self.frac[iy], self.inv[iy]);

        Some(Bilinear {
            taps: [
                xf * self.width + yf,
                xc * self.width + yf,
                xf * self.width + yc,
                xc * self.width + yc,
            ],
            weights: [inv_tx * inv_ty, tx * inv_ty, inv_tx * ty, tx * ty],
            tx,
            ty,
            inv_tx,
            inv_ty,
        })
    }
}

/// Four-neighbour sampling geometry of one output site.
///
/// Taps are plane offsets ordered `(floor_row, floor_col)`, `(ceil_row,
/// floor_col)`, `(floor_row, ceil_col)`, `(ceil_row, ceil_col)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bilinear<T> {
    pub(crate) taps: [usize; 4],
    pub(crate) weights: [T; 4],
    tx: T,
    ty: T,
    inv_tx: T,
    inv_ty: T,
}

impl<T: WarpFloat> Bilinear<T> {
    #[inline]
    fn gather(&self, plane: &[T]) -> [T; 4] {
        self.taps.map(|t| plane[t])
    }

    /// Interpolated value of `plane` at this site.
    #[inline]
    pub(crate) fn blend(&self, plane: &[T]) -> T {
        let i = self.gather(plane);
        self.weights[0] * i[0] + self.weights[1] * i[1] + self.weights[2] * i[2] + self.weights[3] * i[3]
    }

    /// Partial derivatives of [`Self::blend`] with respect to the row and
    /// column coordinates.
    #[inline]
    pub(crate) fn slopes(&self, plane: &[T]) -> (T, T) {
        let [i0, i1, i2, i3] = self.gather(plane);
        let d_row = self.inv_ty * (i1 - i0) + self.ty * (i3 - i2);
        let d_col = self.inv_tx * (i2 - i0) + self.tx * (i3 - i1);
        (d_row, d_col)
    }
}
