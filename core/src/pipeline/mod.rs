// slicehouse/src/pipeline/mod.rs

//! A small async step engine. Order placement and status changes are
//! expressed as named steps over a shared `ContextData`.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::Pipeline;
pub use step::{Handler, SkipCondition, StepDef};
