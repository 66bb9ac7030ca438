//! Compact duration text used by the `keep_alive` request field.
//!
//! The text form is `[<n>d][<n>h][<n>m][<n>s]`. Encoding emits only the
//! non-zero units, largest first, and the zero interval encodes as the empty
//! string. Decoding is lenient about order (`"2h1d"` is 26 hours) but strict
//! about characters: only ASCII digits and the four unit letters are allowed,
//! every number must carry a unit, and every unit must follow a number.
//!
//! Only whole seconds are representable. Encoding truncates any sub-second
//! remainder (1500 ms encodes as `"1s"`). Negative intervals cannot be
//! expressed because [`std::time::Duration`] is unsigned.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Failure to decode duration text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid unit '{unit}' at position {position}")]
    InvalidUnit { unit: char, position: usize },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("trailing digits '{digits}' without a unit")]
    TrailingDigits { digits: String },
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        'd' => Some(SECS_PER_DAY),
        'h' => Some(SECS_PER_HOUR),
        'm' => Some(SECS_PER_MINUTE),
        's' => Some(1),
        _ => None,
    }
}

/// Encode an interval as compact duration text.
pub fn encode_duration(duration: Duration) -> String {
    let mut remaining = duration.as_secs();
    let mut out = String::new();

    for (unit, secs) in [
        ('d', SECS_PER_DAY),
        ('h', SECS_PER_HOUR),
        ('m', SECS_PER_MINUTE),
        ('s', 1),
    ] {
        let count = remaining / secs;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push(unit);
        }
        remaining %= secs;
    }

    out
}

/// Decode compact duration text into an interval.
///
/// Empty text decodes to [`Duration::ZERO`].
pub fn decode_duration(text: &str) -> Result<Duration, DurationError> {
    let mut total: u64 = 0;
    let mut number = String::new();

    for (position, c) in text.chars().enumerate() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }

        // The pending number is checked before the unit letter.
        let invalid = || DurationError::InvalidNumber {
            text: number.clone(),
        };
        let value: u64 = number.parse().map_err(|_| invalid())?;
        let Some(multiplier) = unit_seconds(c) else {
            return Err(DurationError::InvalidUnit { unit: c, position });
        };
        total = value
            .checked_mul(multiplier)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
        number.clear();
    }

    if !number.is_empty() {
        return Err(DurationError::TrailingDigits { digits: number });
    }

    Ok(Duration::from_secs(total))
}

/// Keep-alive interval carried by generate and chat requests.
///
/// Serializes as compact duration text (`"5m"`, `"2d5h30m"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeepAlive(pub Duration);

impl KeepAlive {
    pub const ZERO: KeepAlive = KeepAlive(Duration::ZERO);

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_mins(mins: u64) -> Self {
        Self(Duration::from_secs(mins.saturating_mul(SECS_PER_MINUTE)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.as_secs() == 0
    }
}

impl From<Duration> for KeepAlive {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl From<KeepAlive> for Duration {
    fn from(k: KeepAlive) -> Self {
        k.0
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_duration(self.0))
    }
}

impl FromStr for KeepAlive {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_duration(s).map(Self)
    }
}

impl Serialize for KeepAlive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for KeepAlive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeepAliveVisitor;

        impl<'de> de::Visitor<'de> for KeepAliveVisitor {
            type Value = KeepAlive;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("duration text such as \"5m\" or a number of seconds")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<KeepAlive, E> {
                v.parse().map_err(E::custom)
            }

            // Numeric keep-alive values are whole seconds.
            fn visit_u64<E: de::Error>(self, v: u64) -> Result<KeepAlive, E> {
                Ok(KeepAlive::from_secs(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<KeepAlive, E> {
                u64::try_from(v)
                    .map(KeepAlive::from_secs)
                    .map_err(|_| E::custom("negative keep_alive is not supported"))
            }
        }

        deserializer.deserialize_any(KeepAliveVisitor)
    }
}
