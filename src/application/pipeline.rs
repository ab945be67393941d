//! Pipeline driver: processors over every tree, then the renderer

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::application::error::ApplicationResult;
use crate::application::processor::Processor;
use crate::application::registry::{build_processor, build_renderer};
use crate::application::renderer::Renderer;
use crate::config::Settings;
use crate::domain::DocTree;

pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
    renderer: Box<dyn Renderer>,
}

impl Pipeline {
    pub fn new(processors: Vec<Box<dyn Processor>>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            processors,
            renderer,
        }
    }

    /// Builds every configured stage; fails on the first invalid one.
    pub fn from_settings(settings: &Settings) -> ApplicationResult<Self> {
        let processors = settings
            .processors
            .iter()
            .map(build_processor)
            .collect::<ApplicationResult<Vec<_>>>()?;
        let renderer = build_renderer(&settings.renderer)?;
        Ok(Self::new(processors, renderer))
    }

    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Runs all processors over all trees, in configuration order.
    #[instrument(level = "debug", skip_all, fields(trees = trees.len()))]
    pub fn process(&self, trees: &mut [DocTree]) -> ApplicationResult<()> {
        for processor in &self.processors {
            for tree in trees.iter_mut().filter(|t| !t.is_empty()) {
                processor.process(tree)?;
            }
            debug!(processor = processor.name(), "processor finished");
        }
        Ok(())
    }

    /// Processes `trees` and renders the surviving modules.
    ///
    /// Trees whose root was removed are skipped by the renderer.
    pub fn run(&self, trees: &mut [DocTree]) -> ApplicationResult<Vec<PathBuf>> {
        self.process(trees)?;
        let roots: Vec<_> = trees.iter().filter_map(|t| t.root_node()).collect();
        info!(
            modules = roots.len(),
            dropped = trees.len() - roots.len(),
            renderer = self.renderer.name(),
            "rendering"
        );
        self.renderer.render(&roots)
    }
}
