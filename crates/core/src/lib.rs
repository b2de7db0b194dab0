//! # Skillforge Core
//!
//! Multi-agent skill-gap analysis and learning-resource curation.
//!
//! A request (resume + job description + target title) flows through
//! three cooperating agents: the Analyzer identifies skill gaps, the
//! Curator finds learning resources per gap under a concurrency cap,
//! and the Judge validates the top candidates by executing their code
//! examples. Every phase degrades through fallback tiers so a job
//! almost always completes, even fully offline.

pub mod agents;
pub mod extract;
pub mod integrations;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod session;
pub mod state;

pub use models::{AnalysisRequest, AnalysisResponse, AnalysisStatus};
pub use pipeline::{Orchestrator, OrchestratorConfig};
