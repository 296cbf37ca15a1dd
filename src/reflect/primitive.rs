//! String-to-scalar conversion.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Parses a configuration string into a scalar.
///
/// Parsing is culture-invariant: numbers use `.` as the decimal separator,
/// and surrounding whitespace is ignored for everything except strings.
pub trait FromConfigStr: Sized {
    fn from_config_str(value: &str) -> Result<Self, String>;
}

impl FromConfigStr for String {
    fn from_config_str(value: &str) -> Result<Self, String> {
        Ok(value.to_string())
    }
}

impl FromConfigStr for PathBuf {
    fn from_config_str(value: &str) -> Result<Self, String> {
        Ok(PathBuf::from(value))
    }
}

impl FromConfigStr for bool {
    fn from_config_str(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(format!("'{value}' is not a valid boolean"))
        }
    }
}

impl FromConfigStr for char {
    fn from_config_str(value: &str) -> Result<Self, String> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("'{value}' is not a single character")),
        }
    }
}

/// Accepts `[d.]hh:mm:ss[.fraction]` or a plain number of seconds.
impl FromConfigStr for Duration {
    fn from_config_str(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let invalid = || format!("'{value}' is not a valid duration");

        if !value.contains(':') {
            let seconds: f64 = value.parse().map_err(|_| invalid())?;
            return Duration::try_from_secs_f64(seconds).map_err(|_| invalid());
        }

        let (days, clock) = match value.split_once('.') {
            Some((days, rest)) if rest.contains(':') && !days.contains(':') => {
                (days.parse::<u64>().map_err(|_| invalid())?, rest)
            }
            _ => (0, value),
        };

        let parts: Vec<&str> = clock.split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(invalid());
        };
        let hours: u64 = hours.parse().map_err(|_| invalid())?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
        if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
            return Err(invalid());
        }

        let whole = days
            .checked_mul(24)
            .and_then(|h| h.checked_add(hours))
            .and_then(|h| h.checked_mul(3600))
            .and_then(|s| s.checked_add(minutes * 60))
            .ok_or_else(invalid)?;
        Duration::from_secs(whole)
            .checked_add(Duration::from_secs_f64(seconds))
            .ok_or_else(invalid)
    }
}

macro_rules! from_str_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromConfigStr for $ty {
                fn from_config_str(value: &str) -> Result<Self, String> {
                    value.trim().parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

from_str_scalars!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, IpAddr, Ipv4Addr,
    Ipv6Addr, SocketAddr,
);

/// The scalar conversion service shared by every binding path.
///
/// It holds no state, so one instance can serve any number of binding
/// calls, including the custom converters reached through the bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveConverter {
    _private: (),
}

impl PrimitiveConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert<T: FromConfigStr>(&self, value: &str) -> Result<T, String> {
        T::from_config_str(value)
    }

    /// Converts to `Option<T>`; an empty string produces `None`.
    pub fn convert_nullable<T: FromConfigStr>(&self, value: &str) -> Result<Option<T>, String> {
        if value.is_empty() {
            return Ok(None);
        }
        self.convert(value).map(Some)
    }
}
