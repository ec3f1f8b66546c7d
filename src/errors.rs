use thiserror::Error;

/// Errors surfaced by trie operations, the node codec, and proof handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The key has no value in the trie, or a raw store lookup missed.
    #[error("key not found")]
    KeyNotFound,
    /// An insert-only wrapper attempted to add a key that is already present.
    #[error("entry index already exists")]
    EntryIndexAlreadyExists,
    /// The operation would place a leaf below the maximum depth of the trie.
    #[error("reached maximum level of the trie")]
    ReachedMaxLevel,
    /// Stored bytes did not decode to a valid node.
    #[error("found an invalid node encoding")]
    InvalidNodeFound,
    /// A value outside the field was supplied or decoded.
    #[error("field element out of range")]
    InvalidField,
    /// Hashing was attempted before a hash scheme was installed.
    #[error("hash scheme is not initialized")]
    HashSchemeNotInitialized,
    /// A node referenced by hash could not be resolved in storage.
    #[error("referenced node not found in storage")]
    NodeNotFound,
    /// A stored node hash resolved to different content, or a non-existence
    /// proof was checked against the very key it carries evidence for.
    #[error("node key already exists")]
    NodeKeyAlreadyExists,
    /// A proof is structurally malformed.
    #[error("invalid proof")]
    InvalidProofBytes,
}
