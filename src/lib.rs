//! Core operations and types of a binary sparse merkle trie whose root is a
//! commitment suitable for zero-knowledge proof circuits.
//!
//! This crate defines the trie schema and its operations in a backend-agnostic
//! manner: node storage is abstracted behind the [`Database`] trait and the
//! hash primitive is injected by the host process.
//!
//! ## Schema
//!
//! Keys and values are 32-byte words interpreted as integers in the BN254
//! scalar field. There are three kinds of nodes:
//!   1. [`Parent`](node::ParentNode) nodes, which each have two children. The
//!      hash of a parent is given by hashing the pair of child hashes.
//!   2. [`Leaf`](node::LeafNode) nodes, which carry a key and its value words.
//!      The hash of a leaf is given by hashing the key hash against the value
//!      hash under a leaf domain tag.
//!   3. `Empty` nodes, which have the special all-zero hash [`HASH_ZERO`] and
//!      stand in for an absent sub-trie at any height, including the root.
//!
//! A leaf for key `k` lives at the depth of the shortest prefix of `k`'s
//! little-endian bit expansion distinguishing it from every other live key,
//! so the shape of the trie (and therefore the root hash) is a pure function
//! of the live key/value set. Deletion restores the minimal shape by
//! collapsing chains of parents left with a single-leaf subtree.
//!
//! ## Hash scheme
//!
//! All node hashing routes through a process-wide hook installed once via
//! [`init_hash_scheme`], keeping the trie agnostic to the concrete
//! zk-friendly hash (typically Poseidon) chosen by the host. Until the hook
//! is installed every operation that needs to hash fails with
//! [`Error::HashSchemeNotInitialized`].

mod errors;
mod graphviz;
#[cfg(test)]
mod test_util;

pub mod hash;
pub mod node;
pub mod proof;
pub mod store;
pub mod trie;

pub use errors::Error;
pub use hash::{
    check_in_field, compress_value, hash_elems, hash_value_words, init_hash_scheme, Byte32, Fr,
    Hash, HashScheme, FIELD_MODULUS, HASH_BYTE_LEN, HASH_ZERO,
};
pub use node::{leaf_hash, LeafNode, Node, ParentNode};
pub use proof::{build_proof, verify_proof, NodeAux, Proof};
pub use store::{Database, MemoryDb};
pub use trie::ZkTrie;
