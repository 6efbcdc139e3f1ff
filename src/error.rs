// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hubsync` library.
//!
//! Adapter failures come in exactly two kinds, [`AdapterError::Io`] and
//! [`AdapterError::Protocol`]. The synchronization engine treats both as
//! transient: they are retried inside `apply` and mark the device
//! unavailable on exhaustion, but they are never fatal.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error reported by a device or service adapter.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Device was not found in the registry.
    #[error("device not found")]
    DeviceNotFound,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// A hue value is outside the valid range (0-360).
    #[error("hue value {0} is out of range [0, 360]")]
    InvalidHue(u16),

    /// A saturation value is outside the valid range (0-100).
    #[error("saturation value {0} is out of range [0, 100]")]
    InvalidSaturation(u8),
}

/// Failure reported by a device adapter.
///
/// The device was either unreachable ([`Io`](Self::Io)) or reachable but
/// rejected or timed out the operation ([`Protocol`](Self::Protocol)).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Low-level I/O failure: the device could not be reached.
    #[error("I/O error: {0}")]
    Io(String),

    /// The device answered but rejected the operation or sent garbage.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Discriminant of an [`AdapterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterErrorKind {
    /// See [`AdapterError::Io`].
    Io,
    /// See [`AdapterError::Protocol`].
    Protocol,
}

impl AdapterError {
    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> AdapterErrorKind {
        match self {
            Self::Io(_) => AdapterErrorKind::Io,
            Self::Protocol(_) => AdapterErrorKind::Protocol,
        }
    }

    /// Returns whether the failure may succeed on a later attempt.
    ///
    /// Both kinds are transient; the engine retries them identically.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        true
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_status() {
            Self::Protocol(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("malformed response: {err}"))
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
