//! Application layer: processors, renderers and the pipeline driving them
//!
//! This layer works on in-memory documentation trees only; loading trees and
//! settings from disk lives in the infrastructure and config modules.

pub mod error;
pub mod expression;
pub mod filter;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod renderer;

pub use error::{ApplicationError, ApplicationResult};
pub use expression::{Expression, ExpressionError};
pub use filter::{FilterConfig, FilterProcessor, FilterReport};
pub use pipeline::Pipeline;
pub use processor::Processor;
pub use registry::{ProcessorSpec, RendererSpec};
pub use renderer::{MkDocsConfig, MkDocsRenderer, Renderer};
