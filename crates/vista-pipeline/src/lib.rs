pub mod builder;
pub mod error;
pub mod locks;
pub mod outcome;
pub mod pipeline;

pub use builder::PipelineBuilder;
pub use error::PipelineError;
pub use locks::{ThreadGuard, ThreadLocks};
pub use outcome::GenerationOutcome;
pub use pipeline::Pipeline;
