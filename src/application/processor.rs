//! Processor capability: a pipeline stage that mutates documentation trees

use crate::application::error::ApplicationResult;
use crate::domain::DocTree;

/// A stage that transforms a documentation tree in place.
///
/// Processors are built from configuration by
/// [`crate::application::registry::build_processor`] and run in order by the
/// [`crate::application::Pipeline`].
pub trait Processor {
    /// Type tag the processor is configured under.
    fn name(&self) -> &str;

    /// Transforms `tree` in place.
    fn process(&self, tree: &mut DocTree) -> ApplicationResult<()>;
}
