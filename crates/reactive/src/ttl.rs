//! Time-to-live of a view's query after its last consumer goes away.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use log::warn;

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;

/// TTL applied when a view is built without one.
pub const DEFAULT_TTL: Ttl = Ttl::Duration(Duration::from_millis(5 * MINUTE));

/// Longest TTL a client may request.
pub const MAX_TTL: Ttl = Ttl::Duration(Duration::from_millis(10 * MINUTE));

/// How long a query stays cached once no view uses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Drop immediately.
    None,
    /// Keep indefinitely.
    Forever,
    /// Keep for a fixed duration.
    Duration(Duration),
}

impl Ttl {
    /// Creates a TTL from milliseconds; zero means `None`.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Ttl::None
        } else {
            Ttl::Duration(Duration::from_millis(ms))
        }
    }

    /// Returns the TTL in milliseconds, or None for `Forever`.
    pub fn as_millis(&self) -> Option<u128> {
        match self {
            Ttl::None => Some(0),
            Ttl::Forever => None,
            Ttl::Duration(d) => Some(d.as_millis()),
        }
    }

    /// Caps this TTL at `max`.
    pub fn clamp(self, max: Ttl) -> Ttl {
        let Some(max_ms) = max.as_millis() else {
            return self;
        };
        let exceeds = match self.as_millis() {
            Some(ms) => ms > max_ms,
            None => true,
        };
        if exceeds {
            warn!("ttl {} exceeds the maximum of {}, clamping", self, max);
            max
        } else {
            self
        }
    }
}

impl Default for Ttl {
    fn default() -> Self {
        DEFAULT_TTL
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::None => f.write_str("none"),
            Ttl::Forever => f.write_str("forever"),
            Ttl::Duration(d) => write!(f, "{}", d.as_millis()),
        }
    }
}

/// Error returned when a TTL string is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTtlError;

impl fmt::Display for ParseTtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid ttl: expected none, forever, milliseconds or <n>s|m|h|d|y")
    }
}

/// Parses `none`, `forever`, plain milliseconds, or a number with a
/// `s`/`m`/`h`/`d`/`y` unit suffix (fractions allowed, e.g. `1.5h`).
impl FromStr for Ttl {
    type Err = ParseTtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "none" => return Ok(Ttl::None),
            "forever" => return Ok(Ttl::Forever),
            _ => {}
        }

        let (number, unit) = match s.char_indices().last() {
            Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], Some(c)),
            Some(_) => (s, None),
            None => return Err(ParseTtlError),
        };
        let multiplier = match unit {
            None => 1,
            Some('s') => SECOND,
            Some('m') => MINUTE,
            Some('h') => HOUR,
            Some('d') => DAY,
            Some('y') => YEAR,
            Some(_) => return Err(ParseTtlError),
        };

        let value: f64 = number.parse().map_err(|_| ParseTtlError)?;
        if !value.is_finite() || value < 0.0 {
            return Err(ParseTtlError);
        }
        // Whole milliseconds; `as` saturates on overflow.
        let ms = (value * multiplier as f64) as u64;
        Ok(Ttl::from_millis(ms))
    }
}
