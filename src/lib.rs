//! ClipScene client library
//!
//! Range editing for a video player plus the client side of a clip
//! processing service: format discovery, job submission and status polling.

pub mod adapters;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod editor;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, JobOrchestrator};
pub use catalog::FormatCatalog;
pub use domain::errors::DomainError;
pub use domain::model::{ClipData, JobHandle, JobPhase, JobRequest, JobSnapshot, Quality};
pub use editor::{EditorSession, Scrubber};
pub use error::{ClipSceneError, ClipSceneResult};
