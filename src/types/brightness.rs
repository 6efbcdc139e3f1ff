// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness types.
//!
//! The engine stores brightness in the host's raw 0-255 scale
//! ([`Brightness`]) while devices are commanded with a 0-100 percentage
//! ([`BrightnessPercent`]). Conversions round to the nearest integer in
//! both directions, so every percentage survives a round trip.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Brightness on the raw 0-255 scale.
///
/// Every `u8` is a valid raw brightness.
///
/// # Examples
///
/// ```
/// use hubsync::types::{Brightness, BrightnessPercent};
///
/// let raw = Brightness::FULL;
/// assert_eq!(raw.to_percent().value(), 100);
///
/// let half = Brightness::from_percent(BrightnessPercent::new(50).unwrap());
/// assert_eq!(half.value(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest raw brightness.
    pub const MIN: Self = Self(0);

    /// Full brightness.
    pub const FULL: Self = Self(255);

    /// Creates a raw brightness value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Converts a percentage to the raw scale: `round(p * 255 / 100)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_percent(percent: BrightnessPercent) -> Self {
        // Bounded: p <= 100 so the result is <= 255.
        let raw = (f64::from(percent.value()) * 255.0 / 100.0).round() as u8;
        Self(raw)
    }

    /// Converts to a percentage: `round(r * 100 / 255)`.
    #[must_use]
    pub fn to_percent(self) -> BrightnessPercent {
        BrightnessPercent::from_raw(self)
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Brightness as a percentage (0-100), the unit devices are commanded in.
///
/// # Examples
///
/// ```
/// use hubsync::types::BrightnessPercent;
///
/// let pct = BrightnessPercent::new(75).unwrap();
/// assert_eq!(pct.value(), 75);
/// assert!(BrightnessPercent::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BrightnessPercent(u8);

impl BrightnessPercent {
    /// 0%.
    pub const MIN: Self = Self(0);

    /// 100%.
    pub const MAX: Self = Self(100);

    /// Creates a percentage value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a percentage, clamping values above 100.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Converts a raw 0-255 brightness to a percentage.
    #[must_use]
    pub const fn from_raw(raw: Brightness) -> Self {
        // Integer form of round(r * 100 / 255); r * 100 / 255 never lands
        // exactly on .5 for integer r, so the tie rule does not matter.
        let value = (raw.0 as u16 * 100 + 127) / 255;
        #[allow(clippy::cast_possible_truncation)]
        Self(value as u8)
    }

    /// Converts to the raw 0-255 scale.
    #[must_use]
    pub fn to_raw(self) -> Brightness {
        Brightness::from_percent(self)
    }
}

impl fmt::Display for BrightnessPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for BrightnessPercent {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BrightnessPercent> for u8 {
    fn from(pct: BrightnessPercent) -> Self {
        pct.0
    }
}
