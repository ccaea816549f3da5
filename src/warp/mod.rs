//! Optical-flow warping: geometry, boundary handling and the forward/backward cache.
//!
//! A warp resamples a source tensor `[N, C, H, W]` along a flow field
//! `[N, 2, H, W]`. Output site `(n, c, h, w)` is the bilinear interpolation of
//! the source at
//!
//! ```text
//! x = h + flow[n, 1, h, w]    (row axis)
//! y = w + flow[n, 0, h, w]    (column axis)
//! ```
//!
//! Channel 1 carries the *row* displacement and channel 0 the *column*
//! displacement. The names `x`/`y` follow the layer's historical convention
//! (`x` is vertical) and are kept in the gradient formulas below.
//!
//! With `tx`, `ty` the fractional parts and `I0..I3` the neighbours at
//! `(⌊x⌋,⌊y⌋)`, `(⌈x⌉,⌊y⌋)`, `(⌊x⌋,⌈y⌉)`, `(⌈x⌉,⌈y⌉)`:
//!
//! ```text
//! out   = (1-tx)(1-ty) I0 + tx(1-ty) I1 + (1-tx) ty I2 + tx ty I3
//! ∂/∂x  = (1-ty)(I1 - I0) + ty (I3 - I2)
//! ∂/∂y  = (1-tx)(I2 - I0) + tx (I3 - I1)
//! ```
//!
//! The forward pass records coordinates and weights in a [`WarpCache`]; the
//! backward pass derives the same neighbours from it instead of re-reading the
//! flow, so both halves always agree on the boundary decision.

mod cache;
pub(crate) mod kernel;
mod policy;
mod shape;

pub use self::cache::WarpCache;
pub(crate) use self::cache::fill_batch;
pub use self::policy::BoundaryPolicy;
pub use self::shape::{WarpShape, COL_CHANNEL, FLOW_CHANNELS, ROW_CHANNEL};
