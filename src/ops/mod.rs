//! # Operation Dispatch Layer
//!
//! This module defines the warp kernels and dispatches them across execution
//! backends.
//!
//! ## Submodules
//!
//! - [`cpu`] — Multi-threaded CPU kernels (default backend)
//! - [`serial`] — Single-threaded reference kernels
//! - [`dispatch`] — Shape validation and backend switching
//!
//! ## Backend Selection
//!
//! Kernels are backend-agnostic from the user perspective. The active backend
//! is read from [`crate::backend::get_backend`] on every call.
//!
//! ## Notes
//!
//! - Backend kernels assume validated shapes; go through [`dispatch`] (or
//!   [`crate::backprop`], [`crate::layer`]) unless the shape is already known
//! - Forward kernels return the output together with the cache the backward
//!   kernels need

pub mod cpu;
pub mod dispatch;
pub mod serial;
