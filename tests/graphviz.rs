mod common;

use common::{byte32_from, byte32_literal, TestTrie};

#[test]
fn empty_trie_renders_header_only() {
    let trie = TestTrie::new(10);
    assert_eq!(
        trie.0.graphviz().unwrap(),
        "--------\n\
         GraphViz of the ZkTrie with RootHash 0\n\
         digraph hierarchy {\n\
         node [fontname=Monospace,fontsize=10,shape=box]\n\
         }\n\
         End of GraphViz of the ZkTrie with RootHash 0\n\
         --------\n"
    );
}

#[test]
fn two_leaf_trie_renders_byte_exact() {
    let mut trie = TestTrie::new(10);
    trie.add_word(&byte32_from(1), &byte32_literal(1)).unwrap(); // 0b1
    trie.add_word(&byte32_from(3), &byte32_literal(3)).unwrap(); // 0b11

    // both keys descend right at bit 0, so the root's left slot is empty
    // and the two leaves split at bit 1
    assert_eq!(
        trie.0.graphviz().unwrap(),
        "--------\n\
         GraphViz of the ZkTrie with RootHash 6768942208545719868498073998515775497957293450873343106572493247863515386371\n\
         digraph hierarchy {\n\
         node [fontname=Monospace,fontsize=10,shape=box]\n\
         \"67689422...\" -> {\"empty0\" \"12336023...\"}\n\
         \"empty0\" [style=dashed,label=0];\n\
         \"12336023...\" -> {\"94493668...\" \"10875142...\"}\n\
         \"94493668...\" [style=filled];\n\
         \"10875142...\" [style=filled];\n\
         }\n\
         End of GraphViz of the ZkTrie with RootHash 6768942208545719868498073998515775497957293450873343106572493247863515386371\n\
         --------\n"
    );

    // rendering is a pure function of the committed state
    let again = trie.0.graphviz().unwrap();
    assert_eq!(again, trie.0.graphviz().unwrap());
}
