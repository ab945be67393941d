//! Tree builder turning extracted node specs into arena-backed documentation trees.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::arena::{DocTree, NodeData};
use crate::domain::entities::{NodeSpec, TreeDocument};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs documentation trees from nested [`NodeSpec`]s.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    built: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes inserted by this builder so far.
    pub fn nodes_built(&self) -> usize {
        self.built
    }

    /// Build one tree per top-level module of the document.
    #[instrument(level = "debug", skip_all)]
    pub fn build_document(&mut self, document: &TreeDocument) -> DomainResult<Vec<DocTree>> {
        let modules = document.modules();
        ensure_unique_names("<root>", modules)?;

        let mut trees = Vec::with_capacity(modules.len());
        for module in modules {
            trees.push(self.build(module)?);
        }
        debug!(trees = trees.len(), nodes = self.built, "built documentation graph");
        Ok(trees)
    }

    /// Build a single tree rooted at `root`.
    #[instrument(level = "debug", skip_all, fields(root = %root.name))]
    pub fn build(&mut self, root: &NodeSpec) -> DomainResult<DocTree> {
        let mut tree = DocTree::new();
        let mut stack = vec![(root, None)];

        while let Some((spec, parent_idx)) = stack.pop() {
            validate_name(spec)?;
            ensure_unique_names(&spec.name, &spec.children)?;

            let data = NodeData {
                name: spec.name.clone(),
                docstring: spec.docstring.clone(),
                kind: spec.kind,
            };
            let current_idx = tree.insert_node(data, parent_idx)?;
            self.built += 1;

            // Reverse push so children are inserted in declaration order
            for child in spec.children.iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        Ok(tree)
    }
}

fn validate_name(spec: &NodeSpec) -> DomainResult<()> {
    if spec.name.trim().is_empty() {
        return Err(DomainError::InvalidNode(format!(
            "{} without a name",
            spec.kind
        )));
    }
    Ok(())
}

fn ensure_unique_names(parent: &str, children: &[NodeSpec]) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for child in children {
        if !seen.insert(child.name.as_str()) {
            return Err(DomainError::DuplicateSibling {
                parent: parent.to_string(),
                name: child.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeKind;

    #[test]
    fn given_nested_spec_when_building_then_preserves_declaration_order() {
        let spec = NodeSpec::module("m")
            .with_docstring("x")
            .with_child(NodeSpec::function("a"))
            .with_child(
                NodeSpec::class("B").with_children([NodeSpec::function("c"), NodeSpec::data("d")]),
            )
            .with_child(NodeSpec::function("e"));

        let mut builder = TreeBuilder::new();
        let tree = builder.build(&spec).unwrap();

        let names: Vec<_> = tree.iter().map(|(_, n)| n.name().to_string()).collect();
        assert_eq!(names, vec!["m", "a", "B", "c", "d", "e"]);
        assert_eq!(builder.nodes_built(), 6);

        let d = tree.find_path(&["m", "B", "d"]).unwrap();
        assert_eq!(tree.get_node(d).unwrap().data.kind, NodeKind::Data);
        assert_eq!(
            tree.root_node().unwrap().data.docstring.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn given_duplicate_siblings_when_building_then_fails() {
        let spec = NodeSpec::module("m")
            .with_child(NodeSpec::function("f"))
            .with_child(NodeSpec::data("f"));
        let err = TreeBuilder::new().build(&spec).unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateSibling {
                parent: "m".into(),
                name: "f".into()
            }
        );
    }

    #[test]
    fn given_same_name_in_different_scopes_when_building_then_succeeds() {
        let spec = NodeSpec::module("m")
            .with_child(NodeSpec::class("A").with_child(NodeSpec::function("run")))
            .with_child(NodeSpec::class("B").with_child(NodeSpec::function("run")));
        assert!(TreeBuilder::new().build(&spec).is_ok());
    }

    #[test]
    fn given_blank_name_when_building_then_fails() {
        let spec = NodeSpec::module("m").with_child(NodeSpec::function("  "));
        let err = TreeBuilder::new().build(&spec).unwrap_err();
        assert!(matches!(err, DomainError::InvalidNode(_)));
    }

    #[test]
    fn given_duplicate_modules_when_building_document_then_fails() {
        let doc = TreeDocument::Forest {
            modules: vec![NodeSpec::module("a"), NodeSpec::module("a")],
        };
        assert!(TreeBuilder::new().build_document(&doc).is_err());
    }
}
