// Application layer - Use case orchestration and dependency wiring

pub mod container;
pub mod job_orchestrator;

// Re-export application services
pub use container::{AppContainer, DefaultAppContainer};
pub use job_orchestrator::{JobOrchestrator, OrchestratorState, DEFAULT_POLL_INTERVAL};
