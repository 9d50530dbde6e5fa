// Module: http
// HTTP surface of the identity provider: the assembled request
// pipeline plus the pages, health, and protocol-metadata endpoints.

pub mod error;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod pipeline;
pub mod protocol;

use signet_core::bootstrap::RegistryHandle;

pub use error::{AppError, AppResult};
pub use pipeline::{PipelineAssembler, PipelineStage, PipelineStageList};

/// Shared application state
///
/// Carries the service registry handle into every handler and stage.
/// This is the explicit-injection replacement for a process-global
/// registry slot: the handle is published once after assembly and is
/// read-only from then on.
#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
}
