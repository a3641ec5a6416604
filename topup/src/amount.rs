//! Clamped top-up amount parsing.
//!
//! The console accepts top-ups between [`TopUpAmount::MIN`] and
//! [`TopUpAmount::MAX`] currency units per charge. Raw input is clamped into
//! that range rather than rejected: anything below the minimum becomes the
//! minimum, anything above the maximum becomes the maximum. Empty or
//! non-numeric input does not produce an amount at all; see
//! [`TopUpAmount::parse`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A top-up amount in whole currency units, guaranteed to lie in
/// `[TopUpAmount::MIN, TopUpAmount::MAX]`.
///
/// Construction always goes through clamping, so an out-of-range value
/// cannot reach the wire.
///
/// # Serialization
///
/// Serialized as a plain JSON number, matching the `amount` field of the
/// recharge endpoint. Deserialization rejects out-of-range values instead of
/// clamping, since a stored out-of-range amount indicates corrupt data
/// rather than user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopUpAmount(u32);

impl TopUpAmount {
    /// Smallest accepted amount.
    pub const MIN: u32 = 1;

    /// Largest accepted amount per charge.
    pub const MAX: u32 = 50;

    /// The amount pre-filled before the user touches the input.
    pub const DEFAULT: Self = Self(5);

    /// Clamps a raw integer into the accepted range.
    ///
    /// Values below [`Self::MIN`] (including zero and negatives) become the
    /// minimum; values above [`Self::MAX`] become the maximum.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn clamped(raw: i64) -> Self {
        if raw < Self::MIN as i64 {
            Self(Self::MIN)
        } else if raw > Self::MAX as i64 {
            Self(Self::MAX)
        } else {
            Self(raw as u32)
        }
    }

    /// Parses free-form text input into an amount.
    ///
    /// Numeric input is clamped into range; empty or non-numeric input
    /// yields `None`, the "no amount entered" state the flow rejects at
    /// submission time.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse::<i64>().ok().map(Self::clamped)
    }

    /// Returns the amount as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for TopUpAmount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for TopUpAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TopUpAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for TopUpAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u32::deserialize(deserializer)?;
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(serde::de::Error::custom(format!(
                "amount {raw} outside accepted range {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}
