//! GraphViz rendering of the current trie, for debugging.
//!
//! The output is deliberately byte-stable: node labels are the truncated
//! decimal hashes, empty slots get synthetic `emptyN` labels numbered in
//! walk order, and the whole graph is wrapped in a fixed header/footer
//! carrying the full decimal root. Golden tests pin the exact output.

use crate::errors::Error;
use crate::node::Node;
use crate::store::Database;
use crate::trie::ZkTrie;

impl<D: Database> ZkTrie<D> {
    /// Render the trie reachable from the current root as a GraphViz
    /// digraph.
    pub fn graphviz(&self) -> Result<String, Error> {
        let root = self.root();
        let root_decimal = root.to_decimal_string();
        let mut out = String::new();
        out.push_str("--------\n");
        out.push_str(&format!(
            "GraphViz of the ZkTrie with RootHash {}\n",
            root_decimal
        ));
        out.push_str("digraph hierarchy {\n");
        out.push_str("node [fontname=Monospace,fontsize=10,shape=box]\n");
        if !root.is_zero() {
            let mut empties = 0usize;
            self.graphviz_walk(&root, &mut out, &mut empties)?;
        }
        out.push_str("}\n");
        out.push_str(&format!(
            "End of GraphViz of the ZkTrie with RootHash {}\n",
            root_decimal
        ));
        out.push_str("--------\n");
        Ok(out)
    }

    // Pre-order walk emitting one line per non-empty node.
    fn graphviz_walk(
        &self,
        hash: &crate::hash::Hash,
        out: &mut String,
        empties: &mut usize,
    ) -> Result<(), Error> {
        match self.get_node(hash)? {
            Node::Empty => Ok(()),
            Node::Leaf(_) => {
                out.push_str(&format!("\"{}\" [style=filled];\n", hash));
                Ok(())
            }
            Node::Parent(parent) => {
                let mut labels = Vec::with_capacity(2);
                let mut empty_decls = String::new();
                for child in [&parent.child_left, &parent.child_right] {
                    if child.is_zero() {
                        let label = format!("empty{}", empties);
                        *empties += 1;
                        empty_decls.push_str(&format!(
                            "\"{}\" [style=dashed,label=0];\n",
                            label
                        ));
                        labels.push(label);
                    } else {
                        labels.push(child.to_string());
                    }
                }
                out.push_str(&format!(
                    "\"{}\" -> {{\"{}\" \"{}\"}}\n",
                    hash, labels[0], labels[1]
                ));
                out.push_str(&empty_decls);
                self.graphviz_walk(&parent.child_left, out, empties)?;
                self.graphviz_walk(&parent.child_right, out, empties)
            }
        }
    }
}
