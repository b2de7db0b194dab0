//! # State Persistence
//!
//! SQLite-backed analysis cache plus the in-memory job store. All
//! durable state lives in a single database file so deployments carry
//! one artifact.

pub mod cache;
pub mod db;
pub mod jobs;

pub use cache::AnalysisCache;
pub use db::SkillforgeDb;
pub use jobs::{JobStore, MemoryJobStore};
