//! Inclusion and exclusion proofs against a committed root.
//!
//! A proof records the ordered siblings met while walking a key's path. For
//! a key that is present, the path ends at its leaf and recomputing the
//! parents bottom-up must land on the committed root. For an absent key the
//! walk terminates early, either at an empty slot or at a foreign leaf; the
//! terminal evidence is carried alongside the siblings so a verifier can
//! confirm that the queried key cannot be present.

use crate::errors::Error;
use crate::hash::{Hash, HASH_ZERO};
use crate::node::{leaf_hash, Node, ParentNode};

/// Terminal leaf evidence carried by a non-existence proof: the leaf that
/// actually occupies the queried path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAux {
    pub key: Hash,
    pub value_hash: Hash,
}

/// A sibling-path proof for one key against one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Whether this proves existence (terminal leaf matches the key) or
    /// non-existence.
    pub existence: bool,
    /// Depth at which the walk terminated; equals the sibling count.
    pub depth: usize,
    /// One sibling per traversed parent, ascending by depth, with
    /// [`HASH_ZERO`] standing in for empty sides.
    pub siblings: Vec<Hash>,
    /// For non-existence proofs that terminated at a foreign leaf, that
    /// leaf's evidence. `None` when the walk ended at an empty slot.
    pub node_aux: Option<NodeAux>,
}

/// Walk the trie at `root` along `key`, recording the sibling path.
///
/// Returns the proof together with the terminal node encountered: the
/// matching leaf for existence, or the empty node / foreign leaf whose
/// presence demonstrates the key's absence.
pub fn build_proof<F>(
    root: &Hash,
    key: &Hash,
    max_levels: usize,
    get_node: &F,
) -> Result<(Proof, Node), Error>
where
    F: Fn(&Hash) -> Result<Node, Error>,
{
    let mut proof = Proof {
        existence: false,
        depth: 0,
        siblings: Vec::new(),
        node_aux: None,
    };
    let mut cur = *root;
    for depth in 0..max_levels {
        proof.depth = depth;
        match get_node(&cur)? {
            Node::Empty => return Ok((proof, Node::Empty)),
            Node::Leaf(leaf) => {
                if leaf.node_key == *key {
                    proof.existence = true;
                } else {
                    proof.node_aux = Some(NodeAux {
                        key: leaf.node_key,
                        value_hash: leaf.value_hash()?,
                    });
                }
                return Ok((proof, Node::Leaf(leaf)));
            }
            Node::Parent(parent) => {
                if key.bit(depth) {
                    proof.siblings.push(parent.child_left);
                    cur = parent.child_right;
                } else {
                    proof.siblings.push(parent.child_right);
                    cur = parent.child_left;
                }
            }
        }
    }
    Err(Error::ReachedMaxLevel)
}

impl Proof {
    /// Recompute the root this proof commits to.
    ///
    /// For an existence proof, `node_hash` must be the hash of the claimed
    /// leaf. For a non-existence proof the starting point comes from the
    /// proof itself (the foreign leaf's evidence, or the empty slot) and
    /// `node_hash` is ignored; checking non-existence of the very key the
    /// evidence names fails with [`Error::NodeKeyAlreadyExists`], since
    /// that key is demonstrably present.
    pub fn verify(&self, node_hash: Option<&Hash>, node_key: &Hash) -> Result<Hash, Error> {
        if self.siblings.len() != self.depth {
            return Err(Error::InvalidProofBytes);
        }
        if self.existence {
            let node_hash = node_hash.ok_or(Error::KeyNotFound)?;
            return self.root_from_path(node_hash, node_key);
        }
        match &self.node_aux {
            None => self.root_from_path(&HASH_ZERO, node_key),
            Some(aux) => {
                if aux.key == *node_key {
                    return Err(Error::NodeKeyAlreadyExists);
                }
                let terminal = leaf_hash(&aux.key, &aux.value_hash)?;
                self.root_from_path(&terminal, node_key)
            }
        }
    }

    // Fold the terminal hash upward against each sibling, placing it left
    // or right by the key bit of the corresponding depth.
    fn root_from_path(&self, terminal: &Hash, node_key: &Hash) -> Result<Hash, Error> {
        let mut mid = *terminal;
        for lvl in (0..self.depth).rev() {
            let sibling = self.siblings[lvl];
            let parent = if node_key.bit(lvl) {
                ParentNode {
                    child_left: sibling,
                    child_right: mid,
                }
            } else {
                ParentNode {
                    child_left: mid,
                    child_right: sibling,
                }
            };
            mid = Node::Parent(parent).node_hash()?;
        }
        Ok(mid)
    }
}

/// Check a proof for `node` against `root`: true iff [`Proof::verify`]
/// over the node's hash and key recomputes `root`.
///
/// For the non-existence case this confirms the terminal evidence; to check
/// that a specific key is absent, call [`Proof::verify`] with that key
/// directly.
pub fn verify_proof(root: &Hash, proof: &Proof, node: &Node) -> bool {
    let (node_hash, node_key) = match node {
        Node::Leaf(leaf) => match node.node_hash() {
            Ok(hash) => (hash, leaf.node_key),
            Err(_) => return false,
        },
        Node::Empty => (HASH_ZERO, HASH_ZERO),
        Node::Parent(_) => return false,
    };
    match proof.verify(Some(&node_hash), &node_key) {
        Ok(computed) => computed == *root,
        Err(_) => false,
    }
}
