use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a chat participant
///
/// The server numbers users with integers but the client never does
/// arithmetic on them, so ids are kept as text. Deserializes from either a
/// JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for PeerId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

struct PeerIdVisitor;

impl<'de> Visitor<'de> for PeerIdVisitor {
    type Value = PeerId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or string user id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PeerId, E> {
        Ok(PeerId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PeerId, E> {
        Ok(PeerId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PeerId, E> {
        Ok(PeerId(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<PeerId, E> {
        Ok(PeerId(v))
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PeerIdVisitor)
    }
}
