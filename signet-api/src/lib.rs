pub mod http;

pub use http::{AppState, PipelineAssembler, PipelineStage, PipelineStageList};
