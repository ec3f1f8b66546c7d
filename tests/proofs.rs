mod common;

use common::{byte32_from, byte32_literal, key_hash, TestTrie};
use zkmt::{build_proof, verify_proof, Error, Node, HASH_ZERO};

fn populated_trie() -> TestTrie {
    let mut trie = TestTrie::new(10);
    for (key, value) in [(1u8, 2u8), (3, 4), (5, 6), (7, 8), (9, 10)] {
        trie.add_word(&byte32_from(key), &byte32_literal(value))
            .unwrap();
    }
    trie
}

#[test]
fn existence_proofs_verify() {
    let trie = populated_trie();
    let root = trie.root();

    for key in [1u8, 3, 5, 7, 9] {
        let target = key_hash(&byte32_from(key));
        let (proof, node) =
            build_proof(&root, &target, 10, &|h| trie.0.get_node(h)).unwrap();
        assert!(proof.existence);
        assert_eq!(proof.depth, proof.siblings.len());
        assert!(verify_proof(&root, &proof, &node));

        // the recomputed root is the committed one
        let node_hash = node.node_hash().unwrap();
        assert_eq!(proof.verify(Some(&node_hash), &target).unwrap(), root);
    }
}

#[test]
fn foreign_leaf_shows_non_existence() {
    let trie = populated_trie();
    let root = trie.root();

    // key 11 descends to a leaf that carries a different key
    let absent = key_hash(&byte32_from(11));
    let (proof, node) = build_proof(&root, &absent, 10, &|h| trie.0.get_node(h)).unwrap();
    assert!(!proof.existence);
    let aux = proof.node_aux.clone().expect("descent ended at a leaf");
    assert_ne!(aux.key, absent);

    // treating the found node as evidence of presence must fail
    assert!(!verify_proof(&root, &proof, &node));
    let node_hash = node.node_hash().unwrap();
    let Node::Leaf(leaf) = &node else {
        panic!("expected leaf terminal")
    };
    assert_eq!(
        proof.verify(Some(&node_hash), &leaf.node_key),
        Err(Error::NodeKeyAlreadyExists)
    );

    // checked against the queried key, the proof confirms absence
    assert_eq!(proof.verify(None, &absent).unwrap(), root);
}

#[test]
fn empty_slot_shows_non_existence() {
    let mut trie = TestTrie::new(10);
    trie.add_word(&byte32_from(1), &byte32_literal(1)).unwrap();
    trie.add_word(&byte32_from(3), &byte32_literal(3)).unwrap();
    let root = trie.root();

    // key 2 has bit 0 clear and the root's left slot is empty
    let absent = key_hash(&byte32_from(2));
    let (proof, node) = build_proof(&root, &absent, 10, &|h| trie.0.get_node(h)).unwrap();
    assert!(!proof.existence);
    assert!(proof.node_aux.is_none());
    assert_eq!(node, Node::Empty);
    assert_eq!(proof.depth, 1);
    assert_eq!(proof.verify(None, &absent).unwrap(), root);
}

#[test]
fn tampered_proofs_fail() {
    let trie = populated_trie();
    let root = trie.root();
    let target = key_hash(&byte32_from(5));
    let (proof, node) = build_proof(&root, &target, 10, &|h| trie.0.get_node(h)).unwrap();

    // a flipped sibling changes the recomputed root
    let mut tampered = proof.clone();
    if let Some(first) = tampered.siblings.first_mut() {
        *first = key_hash(&byte32_from(200));
    }
    assert!(!verify_proof(&root, &tampered, &node));

    // sibling count disagreeing with the depth is malformed
    let mut malformed = proof.clone();
    malformed.siblings.push(HASH_ZERO);
    let node_hash = node.node_hash().unwrap();
    assert_eq!(
        malformed.verify(Some(&node_hash), &target),
        Err(Error::InvalidProofBytes)
    );

    // an existence claim needs the leaf hash
    assert_eq!(proof.verify(None, &target), Err(Error::KeyNotFound));
}

#[test]
fn proof_of_changed_value_does_not_verify() {
    let mut trie = populated_trie();
    let root = trie.root();
    let target = key_hash(&byte32_from(5));
    let (proof, node) = build_proof(&root, &target, 10, &|h| trie.0.get_node(h)).unwrap();

    // commit a different value for the key; the old proof no longer matches
    trie.update_word(&byte32_from(5), &byte32_literal(60)).unwrap();
    let new_root = trie.root();
    assert_ne!(root, new_root);
    assert!(verify_proof(&root, &proof, &node));
    assert!(!verify_proof(&new_root, &proof, &node));
}
