// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! Color temperature is held in mireds inside the engine ([`Mired`]) and
//! sent to devices in Kelvin ([`Kelvin`]). The two are related by
//! `mired = 1_000_000 / kelvin`, truncating in both directions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

const MIRED_KELVIN_CONSTANT: u32 = 1_000_000;

/// Color temperature in mireds (micro reciprocal degrees).
///
/// Lower values are cooler (bluer), higher values warmer.
///
/// # Examples
///
/// ```
/// use hubsync::types::{Kelvin, Mired};
///
/// let ct = Mired::new(250).unwrap();
/// assert_eq!(ct.to_kelvin().value(), 4000);
/// assert_eq!(Kelvin::new(4000).unwrap().to_mired(), ct);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Mired(u16);

impl Mired {
    /// Creates a mired value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for zero.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value == 0 {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: u32::from(u16::MAX),
                actual: 0,
            });
        }
        Ok(Self(value))
    }

    /// Returns the value in mireds.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Converts to Kelvin.
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(reciprocal(self.0))
    }
}

impl TryFrom<u16> for Mired {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mired> for u16 {
    fn from(mired: Mired) -> Self {
        mired.0
    }
}

impl fmt::Display for Mired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mired", self.0)
    }
}

/// Color temperature in Kelvin, the unit most bulbs are commanded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Kelvin(u16);

impl Kelvin {
    /// Creates a Kelvin value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for zero.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value == 0 {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: u32::from(u16::MAX),
                actual: 0,
            });
        }
        Ok(Self(value))
    }

    /// Returns the value in Kelvin.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Converts to mireds.
    #[must_use]
    pub fn to_mired(self) -> Mired {
        Mired(reciprocal(self.0))
    }
}

impl TryFrom<u16> for Kelvin {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Kelvin> for u16 {
    fn from(kelvin: Kelvin) -> Self {
        kelvin.0
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

// Zero and values below 16 have no u16 reciprocal and saturate.
fn reciprocal(value: u16) -> u16 {
    MIRED_KELVIN_CONSTANT
        .checked_div(u32::from(value))
        .and_then(|result| u16::try_from(result).ok())
        .unwrap_or(u16::MAX)
}

/// Supported color temperature range of a device, in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawKelvinRange")]
pub struct KelvinRange {
    min: Kelvin,
    max: Kelvin,
}

impl KelvinRange {
    /// Creates a range; the bounds are swapped if given in reverse.
    #[must_use]
    pub fn new(a: Kelvin, b: Kelvin) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Lowest (warmest) temperature.
    #[must_use]
    pub const fn min(&self) -> Kelvin {
        self.min
    }

    /// Highest (coolest) temperature.
    #[must_use]
    pub const fn max(&self) -> Kelvin {
        self.max
    }

    /// Lowest mired value, derived from the highest Kelvin value.
    #[must_use]
    pub fn min_mireds(&self) -> Mired {
        self.max.to_mired()
    }

    /// Highest mired value, derived from the lowest Kelvin value.
    #[must_use]
    pub fn max_mireds(&self) -> Mired {
        self.min.to_mired()
    }

    /// Returns whether a temperature lies inside the range.
    #[must_use]
    pub fn contains(&self, kelvin: Kelvin) -> bool {
        (self.min..=self.max).contains(&kelvin)
    }
}

#[derive(Deserialize)]
struct RawKelvinRange {
    min: Kelvin,
    max: Kelvin,
}

impl From<RawKelvinRange> for KelvinRange {
    fn from(raw: RawKelvinRange) -> Self {
        Self::new(raw.min, raw.max)
    }
}

/// Hue/saturation pair.
///
/// Brightness is deliberately not part of this type: the engine tracks it
/// separately and only bundles it with the color on the wire.
///
/// # Examples
///
/// ```
/// use hubsync::types::HueSaturation;
///
/// let orange = HueSaturation::new(30, 100).unwrap();
/// assert_eq!(orange.hue(), 30);
/// assert!(HueSaturation::new(361, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHueSaturation")]
pub struct HueSaturation {
    hue: u16,
    saturation: u8,
}

impl HueSaturation {
    /// Maximum hue value (wraps at 360).
    pub const MAX_HUE: u16 = 360;

    /// Maximum saturation value.
    pub const MAX_SATURATION: u8 = 100;

    /// Creates a hue/saturation pair.
    ///
    /// # Errors
    ///
    /// Returns error if hue exceeds 360 or saturation exceeds 100.
    pub fn new(hue: u16, saturation: u8) -> Result<Self, ValueError> {
        if hue > Self::MAX_HUE {
            return Err(ValueError::InvalidHue(hue));
        }
        if saturation > Self::MAX_SATURATION {
            return Err(ValueError::InvalidSaturation(saturation));
        }
        Ok(Self { hue, saturation })
    }

    /// Returns the hue in degrees (0-360).
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }
}

#[derive(Deserialize)]
struct RawHueSaturation {
    hue: u16,
    saturation: u8,
}

impl TryFrom<RawHueSaturation> for HueSaturation {
    type Error = ValueError;

    fn try_from(raw: RawHueSaturation) -> Result<Self, Self::Error> {
        Self::new(raw.hue, raw.saturation)
    }
}

impl fmt::Display for HueSaturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.hue, self.saturation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mired_kelvin_round_trip_within_one() {
        for m in 150..=500u16 {
            let back = Mired::new(m).unwrap().to_kelvin().to_mired().value();
            assert!(back.abs_diff(m) <= 1, "mired {m} came back as {back}");
        }
    }

    #[test]
    fn known_conversions() {
        assert_eq!(Kelvin::new(3205).unwrap().to_mired().value(), 312);
        assert_eq!(Mired::new(312).unwrap().to_kelvin().value(), 3205);
        assert_eq!(Kelvin::new(6500).unwrap().to_mired().value(), 153);
        assert_eq!(Kelvin::new(2000).unwrap().to_mired().value(), 500);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(Mired::new(0).is_err());
        assert!(Kelvin::new(0).is_err());
    }

    #[test]
    fn deserialize_goes_through_validation() {
        assert!(serde_json::from_str::<Mired>("0").is_err());
        assert!(serde_json::from_str::<Kelvin>("0").is_err());
        assert_eq!(serde_json::from_str::<Mired>("250").unwrap().value(), 250);
        assert_eq!(serde_json::to_string(&Kelvin::new(4000).unwrap()).unwrap(), "4000");

        assert!(serde_json::from_str::<HueSaturation>(r#"{"hue":400,"saturation":10}"#).is_err());
        assert!(serde_json::from_str::<HueSaturation>(r#"{"hue":10,"saturation":101}"#).is_err());

        let range: KelvinRange = serde_json::from_str(r#"{"min":6500,"max":2700}"#).unwrap();
        assert_eq!(range.min().value(), 2700);
        assert!(serde_json::from_str::<KelvinRange>(r#"{"min":0,"max":2700}"#).is_err());
    }

    #[test]
    fn reciprocal_saturates_instead_of_dividing_by_zero() {
        assert_eq!(reciprocal(0), u16::MAX);
        assert_eq!(reciprocal(10), u16::MAX);
        assert_eq!(reciprocal(250), 4000);
    }

    #[test]
    fn kelvin_range_derives_mired_bounds() {
        let range = KelvinRange::new(Kelvin::new(6500).unwrap(), Kelvin::new(2700).unwrap());
        assert_eq!(range.min().value(), 2700);
        assert_eq!(range.max().value(), 6500);
        assert_eq!(range.min_mireds().value(), 153);
        assert_eq!(range.max_mireds().value(), 370);
        assert!(range.contains(Kelvin::new(4000).unwrap()));
        assert!(!range.contains(Kelvin::new(2000).unwrap()));
    }

    #[test]
    fn hue_saturation_validation() {
        assert!(HueSaturation::new(360, 100).is_ok());
        assert_eq!(
            HueSaturation::new(400, 50),
            Err(ValueError::InvalidHue(400))
        );
        assert_eq!(
            HueSaturation::new(10, 101),
            Err(ValueError::InvalidSaturation(101))
        );
    }

    #[test]
    fn display() {
        assert_eq!(Mired::new(250).unwrap().to_string(), "250 mired");
        assert_eq!(Kelvin::new(4000).unwrap().to_string(), "4000K");
        assert_eq!(HueSaturation::new(110, 21).unwrap().to_string(), "110,21");
    }
}
