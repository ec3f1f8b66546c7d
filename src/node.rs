//! Trie node taxonomy, canonical node hashing, and the byte codec.
//!
//! A node is [`Empty`](Node::Empty), a [`Leaf`](Node::Leaf), or a
//! [`Parent`](Node::Parent). Nodes are stored under their content hash, so
//! the codec only has to be self-describing and round-trip stable; it is not
//! part of the commitment.

use crate::errors::Error;
use crate::hash::{hash_elems, hash_value_words, Byte32, Fr, Hash, HASH_BYTE_LEN, HASH_ZERO};

const TAG_PARENT: u8 = 0;
const TAG_LEAF: u8 = 1;
const TAG_EMPTY: u8 = 2;

/// Domain tag mixed into every leaf hash, separating leaves from parents.
const LEAF_DOMAIN_TAG: u64 = 1;

/// An internal branch holding two child hashes. Either side may be
/// [`HASH_ZERO`], denoting an empty sub-trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentNode {
    pub child_left: Hash,
    pub child_right: Hash,
}

/// A leaf holding one key and its value words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    /// The field-element form of the key; its bit expansion is the leaf's
    /// path.
    pub node_key: Hash,
    /// Flag word describing how each value word enters the value hash; see
    /// [`hash_value_words`].
    pub compressed_flags: u32,
    /// The stored value words, at least one.
    pub value_preimage: Vec<Byte32>,
    /// Optional hint carrying the original key preimage. Not part of the
    /// hash.
    pub key_preimage: Option<Byte32>,
}

impl LeafNode {
    /// The flag-driven hash of the value words.
    pub fn value_hash(&self) -> Result<Hash, Error> {
        hash_value_words(self.compressed_flags, &self.value_preimage)
    }

    /// The concatenated value-preimage bytes, the form returned by lookups.
    pub fn data(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.value_preimage.len() * 32);
        for word in &self.value_preimage {
            out.extend_from_slice(word.bytes());
        }
        out
    }
}

/// Hash of a leaf with the given key and value hash.
pub fn leaf_hash(node_key: &Hash, value_hash: &Hash) -> Result<Hash, Error> {
    hash_elems(
        &Fr::from(LEAF_DOMAIN_TAG),
        &node_key.fr(),
        &[value_hash.fr()],
    )
}

/// A trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An absent sub-trie; hashes to [`HASH_ZERO`].
    Empty,
    /// A leaf carrying a key and its value.
    Leaf(LeafNode),
    /// An internal branch.
    Parent(ParentNode),
}

impl Node {
    /// Build a leaf node.
    pub fn leaf(node_key: Hash, compressed_flags: u32, value_preimage: Vec<Byte32>) -> Self {
        Node::Leaf(LeafNode {
            node_key,
            compressed_flags,
            value_preimage,
            key_preimage: None,
        })
    }

    /// Build a parent node.
    pub fn parent(child_left: Hash, child_right: Hash) -> Self {
        Node::Parent(ParentNode {
            child_left,
            child_right,
        })
    }

    /// The canonical hash of this node.
    pub fn node_hash(&self) -> Result<Hash, Error> {
        match self {
            Node::Empty => Ok(HASH_ZERO),
            Node::Parent(parent) => hash_elems(
                &parent.child_left.fr(),
                &parent.child_right.fr(),
                &[],
            ),
            Node::Leaf(leaf) => leaf_hash(&leaf.node_key, &leaf.value_hash()?),
        }
    }

    /// Encode the node as a self-describing byte string.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Node::Empty => vec![TAG_EMPTY],
            Node::Parent(parent) => {
                let mut out = Vec::with_capacity(1 + 2 * HASH_BYTE_LEN);
                out.push(TAG_PARENT);
                out.extend_from_slice(parent.child_left.as_le_bytes());
                out.extend_from_slice(parent.child_right.as_le_bytes());
                out
            }
            Node::Leaf(leaf) => {
                let mut out = Vec::with_capacity(1 + HASH_BYTE_LEN + 4 + 1);
                out.push(TAG_LEAF);
                out.extend_from_slice(leaf.node_key.as_le_bytes());
                out.extend_from_slice(&leaf.compressed_flags.to_be_bytes());
                out.push(leaf.value_preimage.len() as u8);
                for word in &leaf.value_preimage {
                    out.extend_from_slice(word.bytes());
                }
                match &leaf.key_preimage {
                    Some(preimage) => {
                        out.push(32);
                        out.extend_from_slice(preimage.bytes());
                    }
                    None => out.push(0),
                }
                out
            }
        }
    }

    /// Decode a node, rejecting unknown tags, truncation, and trailing
    /// garbage with [`Error::InvalidNodeFound`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (&tag, body) = bytes.split_first().ok_or(Error::InvalidNodeFound)?;
        match tag {
            TAG_EMPTY => {
                if !body.is_empty() {
                    return Err(Error::InvalidNodeFound);
                }
                Ok(Node::Empty)
            }
            TAG_PARENT => {
                if body.len() != 2 * HASH_BYTE_LEN {
                    return Err(Error::InvalidNodeFound);
                }
                // the split cannot fail at this length
                let left: [u8; HASH_BYTE_LEN] = body[..HASH_BYTE_LEN].try_into().unwrap();
                let right: [u8; HASH_BYTE_LEN] = body[HASH_BYTE_LEN..].try_into().unwrap();
                Ok(Node::parent(
                    Hash::from_le_bytes(left),
                    Hash::from_le_bytes(right),
                ))
            }
            TAG_LEAF => decode_leaf(body),
            _ => Err(Error::InvalidNodeFound),
        }
    }
}

fn decode_leaf(body: &[u8]) -> Result<Node, Error> {
    if body.len() < HASH_BYTE_LEN + 4 + 1 {
        return Err(Error::InvalidNodeFound);
    }
    let key: [u8; HASH_BYTE_LEN] = body[..HASH_BYTE_LEN].try_into().unwrap();
    let node_key = Hash::from_le_bytes(key);
    let rest = &body[HASH_BYTE_LEN..];
    let compressed_flags = u32::from_be_bytes(rest[..4].try_into().unwrap());
    let n_words = rest[4] as usize;
    if n_words == 0 {
        return Err(Error::InvalidNodeFound);
    }
    let rest = &rest[5..];
    if rest.len() < n_words * 32 + 1 {
        return Err(Error::InvalidNodeFound);
    }
    let mut value_preimage = Vec::with_capacity(n_words);
    for i in 0..n_words {
        let word: [u8; 32] = rest[i * 32..(i + 1) * 32].try_into().unwrap();
        value_preimage.push(Byte32::from(word));
    }
    let rest = &rest[n_words * 32..];
    let key_preimage = match rest[0] as usize {
        0 => {
            if rest.len() != 1 {
                return Err(Error::InvalidNodeFound);
            }
            None
        }
        32 => {
            if rest.len() != 33 {
                return Err(Error::InvalidNodeFound);
            }
            let preimage: [u8; 32] = rest[1..].try_into().unwrap();
            Some(Byte32::from(preimage))
        }
        _ => return Err(Error::InvalidNodeFound),
    };
    Ok(Node::Leaf(LeafNode {
        node_key,
        compressed_flags,
        value_preimage,
        key_preimage,
    }))
}
