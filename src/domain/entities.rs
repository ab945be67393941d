//! Domain entities: node kinds and the serialized shape of extracted trees

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of API object a documentation node describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Module,
    Class,
    Function,
    /// Module or class level attribute
    Data,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::Data => "data",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of an extracted documentation tree, as handed over by the extractor.
///
/// Nested specs describe the whole subtree; [`crate::domain::TreeBuilder`]
/// turns them into an arena-backed [`crate::domain::DocTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            docstring: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Module)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Class)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Function)
    }

    pub fn data(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Data)
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A serialized documentation graph: either one module or a list of modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeDocument {
    Forest { modules: Vec<NodeSpec> },
    Module(NodeSpec),
}

impl TreeDocument {
    /// Top-level module specs in document order.
    pub fn modules(&self) -> &[NodeSpec] {
        match self {
            TreeDocument::Forest { modules } => modules,
            TreeDocument::Module(spec) => std::slice::from_ref(spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_json_module_when_deserializing_then_defaults_kind_and_children() {
        let spec: NodeSpec = serde_json::from_str(r#"{"name": "m"}"#).unwrap();
        assert_eq!(spec.kind, NodeKind::Module);
        assert!(spec.docstring.is_none());
        assert!(spec.children.is_empty());
    }

    #[test]
    fn given_forest_document_when_deserializing_then_lists_modules() {
        let doc: TreeDocument =
            serde_json::from_str(r#"{"modules": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
        let names: Vec<_> = doc.modules().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn given_single_module_document_when_deserializing_then_is_module_variant() {
        let doc: TreeDocument = serde_json::from_str(
            r#"{"name": "m", "children": [{"name": "f", "kind": "function"}]}"#,
        )
        .unwrap();
        assert!(matches!(doc, TreeDocument::Module(_)));
        assert_eq!(doc.modules()[0].children[0].kind, NodeKind::Function);
    }
}
