use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Deserializer, Serialize};

/// Externally assigned marker identifier.
///
/// The server numbers its buses, dashboards key markers by string, so both
/// `"7"` and `7` on the wire decode to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> MarkerId {
        MarkerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMarkerId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for MarkerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match RawMarkerId::deserialize(deserializer)? {
            RawMarkerId::Text(text) => text,
            RawMarkerId::Unsigned(n) => n.to_string(),
            RawMarkerId::Signed(n) => n.to_string(),
        };
        Ok(MarkerId(id))
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MarkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        MarkerId(id.to_owned())
    }
}

impl From<String> for MarkerId {
    fn from(id: String) -> Self {
        MarkerId(id)
    }
}

impl From<u32> for MarkerId {
    fn from(id: u32) -> Self {
        MarkerId(id.to_string())
    }
}
