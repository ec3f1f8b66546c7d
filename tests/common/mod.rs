//! Shared harness for the integration suites: installs a deterministic test
//! hash scheme and wraps the trie in the word-level helpers the scenario
//! tests speak in.

// not every suite exercises every helper
#![allow(dead_code)]

use zkmt::{
    check_in_field, init_hash_scheme, Byte32, Error, Fr, Hash, LeafNode, MemoryDb, ZkTrie,
    FIELD_MODULUS,
};

/// Quadratic accumulator over the field: `acc = acc * 65536 + x^2`. A cheap
/// deterministic stand-in for the host's zk-friendly hash; golden roots in
/// these suites are pinned under this scheme.
pub fn quad_hash(inputs: &[Fr]) -> Result<Fr, Error> {
    let multiplier = Fr::from(65536u64);
    let mut acc = Fr::ZERO;
    for x in inputs {
        if !check_in_field(x) {
            return Err(Error::InvalidField);
        }
        let square = x.mul_mod(*x, FIELD_MODULUS);
        acc = acc
            .mul_mod(multiplier, FIELD_MODULUS)
            .add_mod(square, FIELD_MODULUS);
    }
    Ok(acc)
}

/// Install the test scheme. Only the first call in the process has any
/// effect, so every test can call this unconditionally.
pub fn setup() {
    init_hash_scheme(Box::new(quad_hash));
}

/// Big-endian word with `b` as its low byte, the form key preimages take.
pub fn byte32_from(b: u8) -> Byte32 {
    Byte32::from_bytes(&[b])
}

/// Word with `b` as its first byte, the literal form the value fixtures
/// take.
pub fn byte32_literal(b: u8) -> Byte32 {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Byte32::from(bytes)
}

/// The trie position of a key preimage.
pub fn key_hash(preimage: &Byte32) -> Hash {
    Hash::from_bytes(preimage.bytes())
}

/// A trie over the in-memory store plus the word-level conveniences used by
/// the scenario tests.
pub struct TestTrie(pub ZkTrie<MemoryDb>);

impl TestTrie {
    pub fn new(max_levels: usize) -> Self {
        setup();
        TestTrie(ZkTrie::new(MemoryDb::new(), max_levels))
    }

    pub fn root(&self) -> Hash {
        self.0.root()
    }

    pub fn root_hex(&self) -> String {
        self.0.root().hex()
    }

    /// Insert-only: fails with `EntryIndexAlreadyExists` when the key is
    /// already present.
    pub fn add_word(&mut self, key: &Byte32, value: &Byte32) -> Result<(), Error> {
        if self.0.try_get(&key_hash(key)).is_ok() {
            return Err(Error::EntryIndexAlreadyExists);
        }
        self.0.try_update(&key_hash(key), 1, vec![*value])
    }

    pub fn update_word(&mut self, key: &Byte32, value: &Byte32) -> Result<(), Error> {
        self.0.try_update(&key_hash(key), 1, vec![*value])
    }

    pub fn delete_word(&mut self, key: &Byte32) -> Result<(), Error> {
        self.0.try_delete(&key_hash(key))
    }

    pub fn get_leaf_by_word(&self, key: &Byte32) -> Result<LeafNode, Error> {
        self.0.get_leaf_node(&key_hash(key))
    }

    /// Number of nodes on the path of `key`, counted with the path visitor.
    /// A leaf at the root has depth 1.
    pub fn key_depth(&self, key: &Byte32) -> usize {
        let mut count = 0;
        self.0
            .prove(&key_hash(key), 0, |_| {
                count += 1;
                Ok(())
            })
            .expect("path walk failed");
        count
    }
}
