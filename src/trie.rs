//! The trie state machine.
//!
//! [`ZkTrie`] owns a [`Database`], the current root hash, and the maximum
//! depth. Every operation descends from the root by loading nodes from
//! storage, consulting one key bit per level; mutations compute the new
//! path nodes, write each under its content hash, and swap the root only on
//! success. Old nodes are never deleted, so a failed operation leaves at
//! worst some unreachable writes behind.
//!
//! The shape kept by mutations is minimal: a sub-trie holding a single leaf
//! is always represented by that leaf at the shallowest distinguishing
//! depth. Insertion grows branches downward only as far as the first
//! diverging key bit, and deletion collapses chains of parents whose other
//! side became empty, restoring exactly the tree an insertion-only history
//! would have built.

use crate::errors::Error;
use crate::hash::{check_in_field, Byte32, Hash, HASH_ZERO};
use crate::node::{LeafNode, Node, ParentNode};
use crate::store::Database;

/// A binary sparse merkle trie over an external node store.
pub struct ZkTrie<D: Database> {
    db: D,
    root_hash: Hash,
    max_levels: usize,
}

impl<D: Database> ZkTrie<D> {
    /// Create an empty trie over `db`.
    pub fn new(db: D, max_levels: usize) -> Self {
        ZkTrie {
            db,
            root_hash: HASH_ZERO,
            max_levels,
        }
    }

    /// Open a trie at a previously committed root. A non-zero root must
    /// resolve to a stored node, otherwise [`Error::NodeNotFound`].
    pub fn open(db: D, root: Hash, max_levels: usize) -> Result<Self, Error> {
        let trie = ZkTrie {
            db,
            root_hash: root,
            max_levels,
        };
        trie.get_node(&root)?;
        Ok(trie)
    }

    /// The current root hash. [`HASH_ZERO`] for the empty trie.
    pub fn root(&self) -> Hash {
        self.root_hash
    }

    /// The maximum depth a leaf may occupy.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Release the underlying store.
    pub fn into_db(self) -> D {
        self.db
    }

    /// Load the node stored under `hash`. [`HASH_ZERO`] resolves to
    /// [`Node::Empty`] without touching the store; a missing non-zero hash
    /// is a corruption signal ([`Error::NodeNotFound`]).
    pub fn get_node(&self, hash: &Hash) -> Result<Node, Error> {
        if hash.is_zero() {
            return Ok(Node::Empty);
        }
        match self.db.get(hash) {
            Ok(bytes) => Node::from_bytes(&bytes),
            Err(Error::KeyNotFound) => Err(Error::NodeNotFound),
            Err(e) => Err(e),
        }
    }

    /// Look up the value bytes stored for `key`, concatenated across its
    /// value words.
    pub fn try_get(&self, key: &Hash) -> Result<Vec<u8>, Error> {
        self.get_leaf_node(key).map(|leaf| leaf.data())
    }

    /// Look up the leaf node storing `key`.
    pub fn get_leaf_node(&self, key: &Hash) -> Result<LeafNode, Error> {
        let mut cur = self.root_hash;
        for depth in 0..self.max_levels {
            match self.get_node(&cur)? {
                Node::Empty => return Err(Error::KeyNotFound),
                Node::Leaf(leaf) => {
                    if leaf.node_key == *key {
                        return Ok(leaf);
                    }
                    return Err(Error::KeyNotFound);
                }
                Node::Parent(parent) => {
                    cur = if key.bit(depth) {
                        parent.child_right
                    } else {
                        parent.child_left
                    };
                }
            }
        }
        Err(Error::ReachedMaxLevel)
    }

    /// Insert or replace the value stored for `key`.
    ///
    /// Replacing a leaf with an identical one is a no-op and leaves the
    /// root untouched. On any error the root is unchanged.
    ///
    /// Panics if `value_preimage` is empty: a leaf carries at least one
    /// value word.
    pub fn try_update(
        &mut self,
        key: &Hash,
        compressed_flags: u32,
        value_preimage: Vec<Byte32>,
    ) -> Result<(), Error> {
        assert!(
            !value_preimage.is_empty(),
            "a value preimage holds at least one word"
        );
        if !check_in_field(&key.fr()) {
            return Err(Error::InvalidField);
        }
        let leaf = LeafNode {
            node_key: *key,
            compressed_flags,
            value_preimage,
            key_preimage: None,
        };
        let root = self.root_hash;
        self.root_hash = self.add_leaf(&leaf, &root, 0)?;
        Ok(())
    }

    /// Remove the value stored for `key`, collapsing the path back to its
    /// minimal shape. Fails with [`Error::KeyNotFound`] when the key is
    /// absent, leaving the root unchanged.
    pub fn try_delete(&mut self, key: &Hash) -> Result<(), Error> {
        if !check_in_field(&key.fr()) {
            return Err(Error::InvalidField);
        }
        let mut cur = self.root_hash;
        let mut siblings = Vec::new();
        for depth in 0..self.max_levels {
            match self.get_node(&cur)? {
                Node::Empty => return Err(Error::KeyNotFound),
                Node::Leaf(leaf) => {
                    if leaf.node_key != *key {
                        return Err(Error::KeyNotFound);
                    }
                    return self.remove_and_upload(key, &siblings);
                }
                Node::Parent(parent) => {
                    if key.bit(depth) {
                        siblings.push(parent.child_left);
                        cur = parent.child_right;
                    } else {
                        siblings.push(parent.child_right);
                        cur = parent.child_left;
                    }
                }
            }
        }
        Err(Error::KeyNotFound)
    }

    /// Walk the path of `key` from the root through the terminal node (leaf
    /// or empty), invoking `visit` for each node encountered. The first
    /// `from_level` entries of the callback stream are skipped, but the
    /// descent always starts at the root.
    pub fn prove<F>(&self, key: &Hash, from_level: usize, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&Node) -> Result<(), Error>,
    {
        let mut cur = self.root_hash;
        let mut skip = from_level;
        for depth in 0..self.max_levels {
            let node = self.get_node(&cur)?;
            let next = match &node {
                Node::Parent(parent) => Some(if key.bit(depth) {
                    parent.child_right
                } else {
                    parent.child_left
                }),
                _ => None,
            };
            if skip > 0 {
                skip -= 1;
            } else {
                visit(&node)?;
            }
            match next {
                Some(hash) => cur = hash,
                None => return Ok(()),
            }
        }
        Err(Error::ReachedMaxLevel)
    }

    /// Store a node under its content hash, returning the hash. The empty
    /// node is never written. A hash that already resolves to different
    /// bytes is a corruption signal.
    fn add_node(&mut self, node: &Node) -> Result<Hash, Error> {
        let hash = node.node_hash()?;
        if matches!(node, Node::Empty) {
            return Ok(hash);
        }
        let bytes = node.to_bytes();
        match self.db.get(&hash) {
            Ok(existing) => {
                if existing != bytes {
                    return Err(Error::NodeKeyAlreadyExists);
                }
                Ok(hash)
            }
            Err(Error::KeyNotFound) => {
                self.db.put(&hash, bytes)?;
                Ok(hash)
            }
            Err(e) => Err(e),
        }
    }

    // Recursive insert below the node `cur` at depth `lvl`; returns the
    // hash of the rewritten sub-trie.
    fn add_leaf(&mut self, leaf: &LeafNode, cur: &Hash, lvl: usize) -> Result<Hash, Error> {
        if lvl + 1 > self.max_levels {
            return Err(Error::ReachedMaxLevel);
        }
        match self.get_node(cur)? {
            Node::Empty => self.add_node(&Node::Leaf(leaf.clone())),
            Node::Leaf(old) => {
                if old.node_key == leaf.node_key {
                    let new_hash = Node::Leaf(leaf.clone()).node_hash()?;
                    if new_hash == *cur {
                        // rewriting the same value: nothing changes
                        return Ok(*cur);
                    }
                    self.add_node(&Node::Leaf(leaf.clone()))
                } else {
                    self.push_leaf(leaf, &old, lvl)
                }
            }
            Node::Parent(parent) => {
                let parent = if leaf.node_key.bit(lvl) {
                    let child = self.add_leaf(leaf, &parent.child_right, lvl + 1)?;
                    ParentNode {
                        child_left: parent.child_left,
                        child_right: child,
                    }
                } else {
                    let child = self.add_leaf(leaf, &parent.child_left, lvl + 1)?;
                    ParentNode {
                        child_left: child,
                        child_right: parent.child_right,
                    }
                };
                self.add_node(&Node::Parent(parent))
            }
        }
    }

    // Extend the branch downward until the two keys' paths diverge, placing
    // each leaf on its respective side of the final parent.
    fn push_leaf(
        &mut self,
        new_leaf: &LeafNode,
        old_leaf: &LeafNode,
        lvl: usize,
    ) -> Result<Hash, Error> {
        if lvl + 2 > self.max_levels {
            return Err(Error::ReachedMaxLevel);
        }
        let new_bit = new_leaf.node_key.bit(lvl);
        if new_bit == old_leaf.node_key.bit(lvl) {
            let child = self.push_leaf(new_leaf, old_leaf, lvl + 1)?;
            let parent = if new_bit {
                ParentNode {
                    child_left: HASH_ZERO,
                    child_right: child,
                }
            } else {
                ParentNode {
                    child_left: child,
                    child_right: HASH_ZERO,
                }
            };
            return self.add_node(&Node::Parent(parent));
        }
        let old_hash = self.add_node(&Node::Leaf(old_leaf.clone()))?;
        let new_hash = self.add_node(&Node::Leaf(new_leaf.clone()))?;
        let parent = if new_bit {
            ParentNode {
                child_left: old_hash,
                child_right: new_hash,
            }
        } else {
            ParentNode {
                child_left: new_hash,
                child_right: old_hash,
            }
        };
        self.add_node(&Node::Parent(parent))
    }

    // Upward fixup after removing the leaf of `key`. `siblings[i]` is the
    // off-path child of the ancestor at depth `i`.
    fn remove_and_upload(&mut self, key: &Hash, siblings: &[Hash]) -> Result<(), Error> {
        if siblings.is_empty() {
            self.root_hash = HASH_ZERO;
            return Ok(());
        }
        let last = siblings.len() - 1;
        let promoted = siblings[last];

        // A parent sibling roots a multi-leaf subtree and must stay at its
        // depth: the deleted slot just becomes empty.
        if matches!(self.get_node(&promoted)?, Node::Parent(_)) {
            let node = if key.bit(last) {
                ParentNode {
                    child_left: promoted,
                    child_right: HASH_ZERO,
                }
            } else {
                ParentNode {
                    child_left: HASH_ZERO,
                    child_right: promoted,
                }
            };
            let hash = self.add_node(&Node::Parent(node))?;
            self.root_hash = self.recalc_path(key, hash, &siblings[..last])?;
            return Ok(());
        }

        // The sibling is a single leaf: promote it upward past every
        // ancestor whose other side is empty.
        if siblings.len() < 2 {
            self.root_hash = promoted;
            return Ok(());
        }
        for i in (0..last).rev() {
            if siblings[i].is_zero() {
                if i == 0 {
                    self.root_hash = promoted;
                    return Ok(());
                }
                continue;
            }
            let node = if key.bit(i) {
                ParentNode {
                    child_left: siblings[i],
                    child_right: promoted,
                }
            } else {
                ParentNode {
                    child_left: promoted,
                    child_right: siblings[i],
                }
            };
            let hash = self.add_node(&Node::Parent(node))?;
            self.root_hash = self.recalc_path(key, hash, &siblings[..i])?;
            return Ok(());
        }
        unreachable!("the depth-0 iteration always returns");
    }

    // Rebuild the ancestors above `mid` bottom-up and return the new root.
    fn recalc_path(&mut self, key: &Hash, mut mid: Hash, siblings: &[Hash]) -> Result<Hash, Error> {
        for i in (0..siblings.len()).rev() {
            let node = if key.bit(i) {
                ParentNode {
                    child_left: siblings[i],
                    child_right: mid,
                }
            } else {
                ParentNode {
                    child_left: mid,
                    child_right: siblings[i],
                }
            };
            mid = self.add_node(&Node::Parent(node))?;
        }
        Ok(mid)
    }
}


#[cfg(test)]
impl<D: Database> ZkTrie<D> {
    // Bypasses the open-time resolution check to simulate corruption.
    fn new_with_root_unchecked(db: D, root: Hash, max_levels: usize) -> Self {
        ZkTrie {
            db,
            root_hash: root,
            max_levels,
        }
    }
}
