//! Renderer capability and the MkDocs placement renderer

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::DocNode;

/// Final pipeline stage: maps surviving top-level nodes to output locations.
pub trait Renderer {
    /// Type tag the renderer is configured under.
    fn name(&self) -> &str;

    /// Returns one output location per node, in input order.
    fn render(&self, nodes: &[&DocNode]) -> ApplicationResult<Vec<PathBuf>>;
}

/// Options of the `mkdocs` renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MkDocsConfig {
    /// Directory receiving one markdown page per module; `~` and `$VAR` are expanded
    pub output_directory: PathBuf,
}

impl Default for MkDocsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("docs"),
        }
    }
}

/// Places every module at `<output_directory>/<name>.md`.
///
/// Only the placement is computed; writing pages is left to the caller.
#[derive(Debug, Clone)]
pub struct MkDocsRenderer {
    output_directory: PathBuf,
}

impl MkDocsRenderer {
    pub fn new(config: MkDocsConfig) -> Self {
        Self {
            output_directory: expand_path(&config.output_directory),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Output location for a module named `name`.
    pub fn page_path(&self, name: &str) -> PathBuf {
        self.output_directory.join(format!("{name}.md"))
    }
}

impl Renderer for MkDocsRenderer {
    fn name(&self) -> &str {
        "mkdocs"
    }

    #[instrument(level = "debug", skip_all, fields(modules = nodes.len()))]
    fn render(&self, nodes: &[&DocNode]) -> ApplicationResult<Vec<PathBuf>> {
        nodes
            .iter()
            .map(|node| {
                let name = node.name();
                if name.contains(['/', '\\']) || name == "." || name == ".." {
                    return Err(ApplicationError::Render {
                        message: format!("module name `{name}` is not a valid file name"),
                    });
                }
                let path = self.page_path(name);
                info!(module = name, path = %path.display(), "placed module");
                Ok(path)
            })
            .collect()
    }
}

/// Expands `~`, `$VAR` and `${VAR}` in a configured path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocTree, NodeData, NodeKind};

    fn module(name: &str) -> DocTree {
        let mut tree = DocTree::new();
        tree.insert_node(NodeData::new(name, NodeKind::Module), None)
            .unwrap();
        tree
    }

    #[test]
    fn given_modules_when_rendering_then_places_one_page_per_module() {
        let renderer = MkDocsRenderer::new(MkDocsConfig {
            output_directory: PathBuf::from("site/api"),
        });
        let trees = [module("alpha"), module("beta")];
        let roots: Vec<_> = trees.iter().filter_map(|t| t.root_node()).collect();

        let placements = renderer.render(&roots).unwrap();

        assert_eq!(
            placements,
            vec![
                PathBuf::from("site/api/alpha.md"),
                PathBuf::from("site/api/beta.md")
            ]
        );
    }

    #[test]
    fn given_path_like_module_name_when_rendering_then_fails() {
        let renderer = MkDocsRenderer::new(MkDocsConfig::default());
        let tree = module("../escape");
        let roots: Vec<_> = tree.root_node().into_iter().collect();
        assert!(matches!(
            renderer.render(&roots),
            Err(ApplicationError::Render { .. })
        ));
    }

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path(Path::new("~/docs"));
        assert!(expanded.starts_with(&home), "{}", expanded.display());
    }
}
