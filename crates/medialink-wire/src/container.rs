//! The tagged container: a flat map from stable integer tags to values.
//!
//! This is the Medialink replacement for a platform keyed-bundle. Every
//! message — the connection state, its permission masks, its snapshot —
//! is one of these containers, possibly with further containers nested
//! inside under their own tags.
//!
//! Two rules give the format its forward/backward compatibility:
//!
//! 1. **Encode writes only what is present.** An optional field that is
//!    absent simply produces no entry.
//! 2. **Decode looks up, never iterates.** A reader asks for the tags it
//!    knows; entries it never asks about (from a newer sender) are ignored.
//!
//! On the wire a tag is a compact string key: the lowercase base-36
//! rendering of the integer (tag 7 → `"7"`, tag 10 → `"a"`, tag 36 →
//! `"10"`). This keeps the format usable over any string-keyed transport
//! while tags themselves stay stable integers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::WireError;

// ---------------------------------------------------------------------------
// Wire keys
// ---------------------------------------------------------------------------

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Renders a field tag as its wire key: lowercase base-36.
///
/// The mapping is deterministic and never changes; each side computes it
/// independently, so only the integer tag has to be agreed on.
pub fn key_for_tag(tag: u32) -> String {
    if tag == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut n = tag;
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    // Every byte came from the ASCII digit table.
    String::from_utf8(digits).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// HandleRef
// ---------------------------------------------------------------------------

/// An opaque token identifying an out-of-band endpoint reference.
///
/// The wire cannot carry a live dispatch endpoint; it carries this token,
/// and the receiving side resolves it back into a handle through whatever
/// registry the handshake layer maintains. The container treats it as just
/// another value kind.
///
/// `#[serde(transparent)]` serializes the token as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleRef(pub u64);

impl fmt::Display for HandleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WireValue
// ---------------------------------------------------------------------------

/// One value in a tagged container.
///
/// A closed set of kinds, one variant per kind the protocol carries.
/// `#[serde(tag = "kind", content = "value")]` produces adjacently tagged
/// JSON, e.g. `{ "kind": "int", "value": 3 }`, so a reader can check the
/// kind before touching the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WireValue {
    /// A signed integer (versions, counts, bit-sets, booleans as 0/1).
    Int(i64),

    /// A UTF-8 string (identifiers, names, languages).
    Text(String),

    /// An opaque byte payload the protocol never inspects.
    Blob(Vec<u8>),

    /// A reference token to an out-of-band endpoint.
    Ref(HandleRef),

    /// A nested, independently encoded container.
    Container(TaggedContainer),
}

impl WireValue {
    /// The kind name used in [`WireError::WrongKind`] messages.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Int(_) => "int",
            WireValue::Text(_) => "text",
            WireValue::Blob(_) => "blob",
            WireValue::Ref(_) => "ref",
            WireValue::Container(_) => "container",
        }
    }
}

// ---------------------------------------------------------------------------
// TaggedContainer
// ---------------------------------------------------------------------------

/// A flat map from wire keys to [`WireValue`]s.
///
/// `BTreeMap` keeps the encoded key order deterministic, which makes wire
/// payloads byte-stable for a given value — useful for tests and for
/// comparing captures.
///
/// `#[serde(transparent)]` means a container serializes as a plain JSON
/// object, not as a wrapper struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggedContainer {
    entries: BTreeMap<String, WireValue>,
}

impl TaggedContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a container from an ordered list of `(tag, optional value)`
    /// pairs, writing only the pairs whose value is present.
    ///
    /// This is the generic tagged encode: the caller lists every field it
    /// knows, present or not, and absence costs nothing on the wire.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (u32, Option<WireValue>)>,
    {
        let mut container = Self::new();
        for (tag, value) in fields {
            container.insert_some(tag, value);
        }
        container
    }

    /// Inserts a value under the given tag.
    pub fn insert(&mut self, tag: u32, value: WireValue) {
        self.entries.insert(key_for_tag(tag), value);
    }

    /// Inserts the value if present; does nothing if `None`.
    pub fn insert_some(&mut self, tag: u32, value: Option<WireValue>) {
        if let Some(value) = value {
            self.insert(tag, value);
        }
    }

    /// Inserts a value under a raw wire key, bypassing the tag mapping.
    ///
    /// Exists so tests (and tooling) can simulate a newer sender writing
    /// keys this build does not know about.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: WireValue) {
        self.entries.insert(key.into(), value);
    }

    /// Looks up the raw value under a tag, if any.
    pub fn get(&self, tag: u32) -> Option<&WireValue> {
        self.entries.get(&key_for_tag(tag))
    }

    /// True if the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries, of any kind, including unrecognized ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the raw wire keys present in this container.
    ///
    /// Domain decoders use this to log keys they have no tag for.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // -- Typed accessors ---------------------------------------------------
    //
    // Each accessor returns:
    //   Ok(None)  — tag absent; caller substitutes its default
    //   Ok(Some)  — tag present with the expected kind
    //   Err(..)   — tag present with the WRONG kind; the sender and
    //               receiver disagree about the schema, which must surface
    //               as an error rather than a silent default.

    /// Reads an integer value.
    pub fn int(&self, tag: u32) -> Result<Option<i64>, WireError> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(wrong_kind(tag, "int", other)),
        }
    }

    /// Reads an integer value, substituting `default` when absent.
    pub fn int_or(&self, tag: u32, default: i64) -> Result<i64, WireError> {
        Ok(self.int(tag)?.unwrap_or(default))
    }

    /// Reads a text value.
    pub fn text(&self, tag: u32) -> Result<Option<&str>, WireError> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(wrong_kind(tag, "text", other)),
        }
    }

    /// Reads an opaque blob value.
    pub fn blob(&self, tag: u32) -> Result<Option<&[u8]>, WireError> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Blob(b)) => Ok(Some(b)),
            Some(other) => Err(wrong_kind(tag, "blob", other)),
        }
    }

    /// Reads an endpoint reference token.
    pub fn reference(&self, tag: u32) -> Result<Option<HandleRef>, WireError> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Ref(r)) => Ok(Some(*r)),
            Some(other) => Err(wrong_kind(tag, "ref", other)),
        }
    }

    /// Reads a nested container.
    pub fn container(&self, tag: u32) -> Result<Option<&TaggedContainer>, WireError> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Container(c)) => Ok(Some(c)),
            Some(other) => Err(wrong_kind(tag, "container", other)),
        }
    }
}

fn wrong_kind(tag: u32, expected: &'static str, found: &WireValue) -> WireError {
    WireError::WrongKind {
        tag,
        expected,
        found: found.kind(),
    }
}

// =========================================================================
// Tests
// =========================================================================
