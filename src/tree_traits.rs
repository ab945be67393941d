//! Terminal rendering of documentation trees via `termtree`.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::DocTree;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for DocTree {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let (Some(root_idx), Some(root_node)) = (self.root(), self.root_node()) else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree(tree: &DocTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = tree.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.data.to_string());
                        build_tree(tree, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut rendered = Tree::new(root_node.data.to_string());
        build_tree(self, root_idx, &mut rendered);
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeSpec, TreeBuilder};

    #[test]
    fn given_tree_when_rendering_then_shows_kind_and_name_per_line() {
        let spec = NodeSpec::module("m")
            .with_child(NodeSpec::class("C").with_child(NodeSpec::function("run")))
            .with_child(NodeSpec::data("VERSION"));
        let tree = TreeBuilder::new().build(&spec).unwrap();

        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "module m");
        assert!(lines[1].ends_with("class C"));
        assert!(lines[2].ends_with("function run"));
        assert!(lines[3].ends_with("data VERSION"));
    }

    #[test]
    fn given_empty_tree_when_rendering_then_placeholder() {
        assert_eq!(DocTree::new().to_tree_string().to_string().trim(), "Empty tree");
    }
}
