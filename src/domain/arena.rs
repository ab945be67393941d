use generational_arena::{Arena, Index};
use std::fmt;
use tracing::{instrument, trace};

use crate::domain::entities::NodeKind;
use crate::domain::error::{DomainError, DomainResult};

/// Data payload for tree nodes representing documented API objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Identifier, unique among siblings
    pub name: String,
    /// Extracted docstring, None for undocumented members
    pub docstring: Option<String>,
    pub kind: NodeKind,
}

impl NodeData {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            docstring: None,
            kind,
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// An empty docstring counts as undocumented.
    pub fn has_docstring(&self) -> bool {
        self.docstring.as_deref().is_some_and(|d| !d.is_empty())
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Tree node in the arena-based documentation tree.
#[derive(Debug)]
pub struct DocNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in declaration order
    pub children: Vec<Index>,
}

impl DocNode {
    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-based documentation tree.
///
/// The arena owns every node; a parent's `children` list is the only
/// ownership relation, `parent` is a plain back-reference used for lookups.
/// Removing a node prunes its whole subtree from the arena, so indices into
/// a removed subtree resolve to `None` afterwards.
#[derive(Debug)]
pub struct DocTree {
    arena: Arena<DocNode>,
    /// Index of the root node, None for empty (or fully pruned) trees
    root: Option<Index>,
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts a node as last child of `parent`, or as root when `parent` is None.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> DomainResult<Index> {
        match parent {
            Some(parent_idx) => {
                if !self.arena.contains(parent_idx) {
                    return Err(DomainError::NodeNotFound(parent_idx));
                }
                let node_idx = self.arena.insert(DocNode {
                    data,
                    parent,
                    children: Vec::new(),
                });
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(node_idx);
                }
                Ok(node_idx)
            }
            None => {
                if let Some(root) = self.root.and_then(|idx| self.arena.get(idx)) {
                    return Err(DomainError::RootExists(root.data.name.clone()));
                }
                let node_idx = self.arena.insert(DocNode {
                    data,
                    parent: None,
                    children: Vec::new(),
                });
                self.root = Some(node_idx);
                Ok(node_idx)
            }
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&DocNode> {
        self.arena.get(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&DocNode> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Child of `parent` with the given name.
    pub fn child_by_name(&self, parent: Index, name: &str) -> Option<Index> {
        self.get_node(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.get_node(child).is_some_and(|n| n.name() == name))
    }

    /// Resolves a path of names starting at the root, e.g. `["m", "Class", "method"]`.
    pub fn find_path(&self, path: &[&str]) -> Option<Index> {
        let (first, rest) = path.split_first()?;
        let root = self.root?;
        if self.get_node(root)?.name() != *first {
            return None;
        }
        rest.iter()
            .try_fold(root, |current, name| self.child_by_name(current, name))
    }

    /// Dotted path from the root to `idx`, e.g. `m.Class.method`.
    pub fn qualified_name(&self, idx: Index) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            let node = self.get_node(i)?;
            parts.push(node.name());
            current = node.parent;
        }
        parts.reverse();
        Some(parts.join("."))
    }

    /// Names of the children of `idx` in order.
    pub fn child_names(&self, idx: Index) -> Vec<String> {
        self.get_node(idx)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.get_node(c))
                    .map(|c| c.data.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Detaches `idx` from its parent and frees it together with its subtree.
    ///
    /// Removing the root empties the tree. Returns the number of freed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, idx: Index) -> DomainResult<usize> {
        let parent = self
            .get_node(idx)
            .ok_or(DomainError::NodeNotFound(idx))?
            .parent;

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.retain(|&child| child != idx);
                }
            }
            None => self.root = None,
        }

        let mut freed = 0;
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                trace!(name = %node.data.name, "pruned");
                freed += 1;
                stack.extend(node.children);
            }
        }
        Ok(freed)
    }

    /// Pre-order walk that allows `visit` to mutate the tree.
    ///
    /// A node's child list is snapshotted after its visit returns, so the
    /// visitor may remove the current node (its subtree is then never
    /// visited) or any other node (stale indices are skipped).
    #[instrument(level = "debug", skip_all)]
    pub fn visit_mut<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&mut DocTree, Index) -> Result<(), E>,
    {
        let mut stack: Vec<Index> = self.root.into_iter().collect();
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            visit(self, current)?;
            if let Some(node) = self.get_node(current) {
                // Reverse push for left-to-right traversal
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(())
    }

    /// Collects the names of all leaf nodes.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a DocTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a DocTree) -> Self {
        let stack = tree.root().into_iter().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a DocNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
