//! # Agent Pipeline
//!
//! The three cooperating agents: Analyzer (skill gaps), Curator
//! (learning resources), Judge (resource validation). Each agent owns
//! its sessions and its own fallback behavior, so the orchestrator only
//! sequences them.

pub mod analyzer;
pub mod curator;
pub mod judge;
pub mod prompts;

pub use analyzer::Analyzer;
pub use curator::Curator;
pub use judge::Judge;
