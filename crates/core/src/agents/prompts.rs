//! # Agent System Prompts
//!
//! Default system prompts shipped as markdown and embedded at compile
//! time. Prompts carry `{placeholder}` slots filled by the owning agent
//! before dispatch.

/// Analyzer system prompt ({job_title} slot)
pub const ANALYZER: &str = include_str!("defaults/analyzer.md");

/// Curator system prompt ({skill_name}, {level} slots)
pub const CURATOR: &str = include_str!("defaults/curator.md");

/// Judge system prompt (no slots)
pub const JUDGE: &str = include_str!("defaults/judge.md");

/// Fill the analyzer prompt for a target job title
pub fn analyzer_prompt(job_title: &str) -> String {
    ANALYZER.replace("{job_title}", job_title)
}

/// Fill the curator prompt for a skill at a starting level
pub fn curator_prompt(skill_name: &str, level: &str) -> String {
    CURATOR
        .replace("{skill_name}", skill_name)
        .replace("{level}", level)
}
