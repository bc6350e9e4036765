//! Keep-alive duration carried on local-dialect requests.
//!
//! Clients send `keep_alive` either as a number of seconds (`60`) or as a
//! duration string (`"30s"`, `"1h"`). Any negative value means "keep the
//! model loaded forever". An absent field falls back to five minutes.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::duration::{DurationParseError, format_duration, parse_duration};

/// How long a model should stay loaded after a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeepAlive(Duration);

impl KeepAlive {
    /// Five minutes, used whenever the client does not say otherwise.
    pub const DEFAULT: Self = Self(Duration::from_secs(5 * 60));

    /// The "unbounded" sentinel: the largest representable duration.
    pub const FOREVER: Self = Self(Duration::MAX);

    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Interpret a numeric keep-alive as whole seconds.
    ///
    /// Fractional seconds are truncated; negative input yields [`Self::FOREVER`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < 0.0 {
            Self::FOREVER
        } else {
            Self(Duration::from_secs(seconds.trunc() as u64))
        }
    }

    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }

    #[must_use]
    pub fn is_forever(self) -> bool {
        self == Self::FOREVER
    }
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for KeepAlive {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parse_duration(s)?;
        if parsed.is_negative() {
            Ok(Self::FOREVER)
        } else {
            Ok(Self(parsed.magnitude))
        }
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forever() {
            f.write_str("forever")
        } else {
            f.write_str(&format_duration(self.0))
        }
    }
}

impl Serialize for KeepAlive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_forever() {
            serializer.serialize_i64(-1)
        } else {
            serializer.serialize_str(&format_duration(self.0))
        }
    }
}

struct KeepAliveVisitor;

impl<'de> Visitor<'de> for KeepAliveVisitor {
    type Value = KeepAlive;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number of seconds or a duration string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v < 0 {
            Ok(KeepAlive::FOREVER)
        } else {
            Ok(KeepAlive(Duration::from_secs(v.unsigned_abs())))
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(KeepAlive(Duration::from_secs(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(KeepAlive::from_seconds(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(KeepAlive::DEFAULT)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(KeepAlive::DEFAULT)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Self)
    }
}

impl<'de> Deserialize<'de> for KeepAlive {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeepAliveVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default)]
        keep_alive: KeepAlive,
    }

    fn decode(json: &str) -> KeepAlive {
        serde_json::from_str::<Holder>(json).unwrap().keep_alive
    }

    #[test]
    fn test_negative_number_is_forever() {
        assert_eq!(decode(r#"{"keep_alive": -5}"#), KeepAlive::FOREVER);
        assert_eq!(decode(r#"{"keep_alive": -0.5}"#), KeepAlive::FOREVER);
    }

    #[test]
    fn test_number_is_seconds() {
        assert_eq!(
            decode(r#"{"keep_alive": 60}"#).duration(),
            Duration::from_secs(60)
        );
        assert_eq!(
            decode(r#"{"keep_alive": 2.9}"#).duration(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_duration_string() {
        assert_eq!(
            decode(r#"{"keep_alive": "30s"}"#).duration(),
            Duration::from_secs(30)
        );
        assert_eq!(decode(r#"{"keep_alive": "-1m"}"#), KeepAlive::FOREVER);
    }

    #[test]
    fn test_absent_or_null_is_default() {
        assert_eq!(decode("{}").duration(), Duration::from_secs(300));
        assert_eq!(decode(r#"{"keep_alive": null}"#), KeepAlive::DEFAULT);
    }

    #[test]
    fn test_rejects_unsupported_input() {
        assert!(serde_json::from_str::<Holder>(r#"{"keep_alive": "soon"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"keep_alive": true}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"keep_alive": [1]}"#).is_err());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            serde_json::to_string(&KeepAlive::DEFAULT).unwrap(),
            r#""5m0s""#
        );
        assert_eq!(serde_json::to_string(&KeepAlive::FOREVER).unwrap(), "-1");
        let back: KeepAlive = serde_json::from_str("-1").unwrap();
        assert!(back.is_forever());
    }
}
