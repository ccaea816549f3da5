//! Backend selection module.
//!
//! This module defines the available execution backends for the warp kernels
//! and provides functions to set and get the current backend.
//!
//! # Supported Backends
//!
//! - `Cpu` — Multi-threaded CPU kernels using `rayon` (default).
//! - `Serial` — Single-threaded reference kernels.
//!
//! Both produce bit-identical results; `Serial` exists for small tensors,
//! debugging and for environments where spawning the rayon pool is undesirable.
//!
//! The backend is stored globally using an `AtomicU8`, enabling fast
//! switching at runtime.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// Enumeration of supported execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Data-parallel CPU backend (default).
    #[default]
    Cpu = 0,
    /// Single-threaded CPU backend.
    Serial,
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Serial),
            _ => Err(()),
        }
    }
}

/// Internal global state for the active backend.
///
/// This uses acquire/release ordering; the backend is only expected to change
/// rarely, between warp calls.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Sets the active backend to use for warp computation.
///
/// # Example
///
/// ```
/// use briny_warp::backend::{set_backend, Backend};
/// set_backend(Backend::Serial);
/// # set_backend(Backend::Cpu);
/// ```
pub fn set_backend(b: Backend) {
    log::debug!("warp backend set to {b:?}");
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Release);
}

/// Returns the currently active execution backend.
///
/// If the stored value is invalid, defaults to [`Backend::Cpu`].
///
/// # Example
///
/// ```
/// use briny_warp::backend::get_backend;
/// let backend = get_backend();
/// ```
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}
