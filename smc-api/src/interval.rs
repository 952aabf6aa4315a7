//! Work-interval bound for execution contexts.
//!
//! [`WorkInterval`] serializes as a plain integer: `-1` for no bound, or
//! the bound in milliseconds. That is the wire form hosts use for
//! `maxWorkInterval`, so catalogs and fixtures can carry it verbatim.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Upper bound on how long one execution of a context may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkInterval {
    /// No bound. Serialized as `-1`.
    #[default]
    Unbounded,
    /// Bound in milliseconds.
    Millis(u64),
}

impl WorkInterval {
    /// Interpret a raw host value: any negative number means unbounded.
    pub fn from_raw(raw: i64) -> Self {
        u64::try_from(raw).map_or(Self::Unbounded, Self::Millis)
    }

    /// The raw host value.
    pub fn as_raw(&self) -> i64 {
        match self {
            Self::Unbounded => -1,
            Self::Millis(ms) => i64::try_from(*ms).unwrap_or(i64::MAX),
        }
    }

    /// The bound as a `Duration`, if any.
    pub fn to_std(&self) -> Option<Duration> {
        match self {
            Self::Unbounded => None,
            Self::Millis(ms) => Some(Duration::from_millis(*ms)),
        }
    }
}

impl From<Duration> for WorkInterval {
    fn from(d: Duration) -> Self {
        Self::Millis(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl Serialize for WorkInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for WorkInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_raw)
    }
}

impl std::fmt::Display for WorkInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Millis(ms) => write!(f, "{ms}ms"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form() {
        assert_eq!(serde_json::to_string(&WorkInterval::Unbounded).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&WorkInterval::Millis(250)).unwrap(), "250");
        let parsed: WorkInterval = serde_json::from_str("-5").unwrap();
        assert_eq!(parsed, WorkInterval::Unbounded);
        let parsed: WorkInterval = serde_json::from_str("1500").unwrap();
        assert_eq!(parsed.to_std(), Some(Duration::from_millis(1500)));
    }
}
