// Staged analysis pipeline: a per-run context mutated by four sequential
// stages, driven by an explicit state machine that routes to an error
// terminal on the first stage failure.

pub mod context;
pub mod executor;

pub use context::{AnalysisInput, PipelineContext};
pub use executor::{PipelineExecutor, Stage};
