//! Error types for the Lumen3D renderer
//!
//! Per-frame rendering is best-effort: missing meshes, materials or programs
//! skip the draw silently and capacity overflows are clamped and reported in
//! the frame statistics. What reaches this type are failures of the device
//! abstraction itself (frame buffer creation, backend errors) and misuse of
//! the renderer API.

use std::fmt;

/// Result type for Lumen3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D renderer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error reported by the device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (mesh, material, light, frame buffer, ...)
    InvalidResource(String),

    /// The renderer or device was driven in an order it does not support
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Build a `BackendError`, logging it at ERROR severity with file:line.
///
/// ```ignore
/// let err = engine_err!("lumen3d::Deferred", "GBuffer creation failed: {}", reason);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lumen3d::Error::BackendError(message)
    }};
}

/// Log and return a `BackendError` from the enclosing function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
