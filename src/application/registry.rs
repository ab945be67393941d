//! Configuration-driven construction of processors and renderers
//!
//! Stages are selected by their `type` tag:
//!
//! ```toml
//! [[processors]]
//! type = "filter"
//! documented_only = true
//!
//! [renderer]
//! type = "mkdocs"
//! output_directory = "site/api"
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::error::ApplicationResult;
use crate::application::filter::{FilterConfig, FilterProcessor};
use crate::application::processor::Processor;
use crate::application::renderer::{MkDocsConfig, MkDocsRenderer, Renderer};

/// Type-tagged processor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessorSpec {
    Filter(FilterConfig),
}

impl ProcessorSpec {
    pub fn type_tag(&self) -> &'static str {
        match self {
            ProcessorSpec::Filter(_) => "filter",
        }
    }
}

impl Default for ProcessorSpec {
    fn default() -> Self {
        ProcessorSpec::Filter(FilterConfig::default())
    }
}

/// Type-tagged renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RendererSpec {
    Mkdocs(MkDocsConfig),
}

impl RendererSpec {
    pub fn type_tag(&self) -> &'static str {
        match self {
            RendererSpec::Mkdocs(_) => "mkdocs",
        }
    }
}

impl Default for RendererSpec {
    fn default() -> Self {
        RendererSpec::Mkdocs(MkDocsConfig::default())
    }
}

/// Builds the processor described by `spec`.
///
/// Filter expressions are compiled here, so a malformed expression is
/// reported before any tree is processed.
pub fn build_processor(spec: &ProcessorSpec) -> ApplicationResult<Box<dyn Processor>> {
    debug!(processor = spec.type_tag(), "building processor");
    match spec {
        ProcessorSpec::Filter(config) => Ok(Box::new(FilterProcessor::new(config.clone())?)),
    }
}

/// Builds the renderer described by `spec`.
pub fn build_renderer(spec: &RendererSpec) -> ApplicationResult<Box<dyn Renderer>> {
    debug!(renderer = spec.type_tag(), "building renderer");
    match spec {
        RendererSpec::Mkdocs(config) => Ok(Box::new(MkDocsRenderer::new(config.clone()))),
    }
}
