//! # Pipeline Orchestration
//!
//! Sequences the Analyzer, Curator and Judge over one analysis job and
//! emits lifecycle events along the way.

pub mod events;
pub mod orchestrator;

pub use events::{EventBus, EventKind, PipelineEvent};
pub use orchestrator::{Orchestrator, OrchestratorConfig, PerformanceMetrics};
