use std::fmt;

use telepath_value::Adapter;

/// A MongoDB/BSON `ObjectId` as sent by the server.
///
/// The server packs it as its hex string (`{"_type": "ObjectId", "_args":
/// ["5f1b..."]}`); the client only needs that string form back, so no
/// parsing of the 12 underlying bytes happens here.
///
/// Stricter than the browser-side constructor: exactly one string argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Adapter)]
#[telepath(tag = "ObjectId")]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the canonical 24 hex digit form.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == 24 && self.0.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
