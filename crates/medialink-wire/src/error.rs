//! Error types for the wire layer.
//!
//! Each crate in Medialink defines its own error enum. A `WireError` always
//! means the problem is in the container itself — a value of the wrong kind,
//! a required inner value missing, or a byte-level codec failure — never in
//! the domain semantics layered on top.

/// Errors that can occur while reading or writing a tagged container.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A tag was present but held a different value kind than the reader
    /// expected (e.g. a sub-container where an integer belongs).
    ///
    /// Absence of a tag is *not* an error — absent tags resolve to
    /// defaults. A present-but-mistyped value, on the other hand, means
    /// the sender and receiver disagree about the schema, which must not
    /// be papered over with a default.
    #[error("tag {tag}: expected {expected}, found {found}")]
    WrongKind {
        tag: u32,
        expected: &'static str,
        found: &'static str,
    },

    /// A value the enclosing structure requires was absent.
    ///
    /// Used by nested codecs for their own mandatory inner fields
    /// (e.g. a custom command sub-container without a name).
    #[error("tag {tag}: required value is missing")]
    Missing { tag: u32 },

    /// Byte-level serialization of a container failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Byte-level deserialization of a container failed — malformed,
    /// truncated, or not a container at all.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
