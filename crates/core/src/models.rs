//! # Skillforge Models
//!
//! Domain types shared across the agent pipeline and the API surface.
//! Wire forms are lowercase snake_case to match the agent prompt schemas,
//! so the same types decode agent output and serve API responses.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Skill proficiency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "beginner",
            ProficiencyLevel::Intermediate => "intermediate",
            ProficiencyLevel::Advanced => "advanced",
            ProficiencyLevel::Expert => "expert",
        }
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skill gap priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    NiceToHave,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::Important => "important",
            Priority::NiceToHave => "nice_to_have",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types of learning resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Course,
    Tutorial,
    Documentation,
    Video,
    Book,
    Article,
}

impl ResourceType {
    /// Parse a loosely-typed string, case-insensitively. Unknown values
    /// yield `None`; callers default to `Tutorial`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "course" => Some(ResourceType::Course),
            "tutorial" => Some(ResourceType::Tutorial),
            "documentation" => Some(ResourceType::Documentation),
            "video" => Some(ResourceType::Video),
            "book" => Some(ResourceType::Book),
            "article" => Some(ResourceType::Article),
            _ => None,
        }
    }
}

/// Status of an analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

// === Request Models ===

/// Filters for resource curation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, utoipa::ToSchema)]
pub struct ResourceFilters {
    /// Only include free resources
    #[serde(default = "default_true")]
    pub free_only: bool,
    /// Maximum duration in hours
    #[serde(default = "default_max_duration")]
    pub max_duration_hours: f64,
    /// Types of resources to include (allow-set)
    #[serde(default = "default_resource_types")]
    pub resource_types: Vec<ResourceType>,
}

fn default_true() -> bool {
    true
}

fn default_max_duration() -> f64 {
    100.0
}

fn default_resource_types() -> Vec<ResourceType> {
    vec![
        ResourceType::Course,
        ResourceType::Tutorial,
        ResourceType::Video,
    ]
}

impl Default for ResourceFilters {
    fn default() -> Self {
        Self {
            free_only: true,
            max_duration_hours: default_max_duration(),
            resource_types: default_resource_types(),
        }
    }
}

/// Request for a skill gap analysis
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, utoipa::ToSchema)]
pub struct AnalysisRequest {
    /// Resume text content
    pub resume_text: String,
    /// Target job description
    pub job_description: String,
    /// Title of the target job role
    pub target_job_title: String,
    /// Resource filtering preferences
    #[serde(default)]
    pub filters: ResourceFilters,
}

// === Response Models ===

/// A skill already present in the resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExistingSkill {
    /// Name of the skill
    pub skill_name: String,
    /// Current proficiency level
    pub proficiency_level: ProficiencyLevel,
    /// Years of experience
    pub years_experience: u32,
}

/// A skill required by the target role but missing or underdeveloped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkillGap {
    /// Name of the missing skill
    pub skill_name: String,
    /// Required proficiency level
    pub required_level: ProficiencyLevel,
    /// Priority of closing this gap
    pub priority: Priority,
    /// Recommended starting point (free text)
    pub recommended_starting_level: String,
}

/// Real-time market insights gathered during analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketInsights {
    /// Job market demand level
    pub demand_level: String,
    /// Key findings from market research
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Sources of market data
    #[serde(default)]
    pub data_sources: Vec<String>,
}

/// Output of the Analyzer agent
///
/// Fields default on decode: agent output is not guaranteed to carry
/// every key, and a partial result beats a decode error here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Skills found in the resume
    #[serde(default)]
    pub existing_skills: Vec<ExistingSkill>,
    /// Identified skill gaps
    #[serde(default)]
    pub skill_gaps: Vec<SkillGap>,
    /// Technology stack context
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Job category
    #[serde(default = "default_job_category")]
    pub job_category: String,
    /// Market insights, present only when the search yielded findings
    #[serde(default)]
    pub market_insights: Option<MarketInsights>,
}

fn default_job_category() -> String {
    "Unknown".to_string()
}

/// A curated learning resource
///
/// Immutable once built by the normalizer; filtering produces new lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    /// Resource title
    pub title: String,
    /// Resource URL
    pub url: String,
    /// Content provider
    pub provider: String,
    /// Type of resource
    pub resource_type: ResourceType,
    /// Difficulty level
    pub difficulty_level: String,
    /// Estimated duration in hours
    pub duration_hours: f64,
    /// Whether the resource is free
    pub is_free: bool,
    /// User rating (0-5), when known
    #[serde(default)]
    pub rating: Option<f64>,
    /// Resource description
    pub description: String,
    /// Skill names this resource addresses
    #[serde(default)]
    pub tech_stack_match: Vec<String>,
}

/// Judgement emitted by the Judge agent for one resource
///
/// Only `relevance_score` is required on decode; the rest default so a
/// sparse judgement still counts as a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JudgementResult {
    /// Resource identifier (URL)
    #[serde(default)]
    pub resource_id: String,
    /// Whether the resource is relevant
    #[serde(default)]
    pub is_relevant: bool,
    /// Relevance score (0-1)
    pub relevance_score: f64,
    /// Reasoning for the judgement
    #[serde(default)]
    pub reasoning: String,
    /// Whether the resource is recommended
    #[serde(default)]
    pub recommended: bool,
    /// Code examples that executed successfully
    #[serde(default)]
    pub code_tests_passed: u32,
    /// Code examples that failed
    #[serde(default)]
    pub code_tests_failed: u32,
    /// Overall technical quality (excellent/good/fair/poor)
    #[serde(default)]
    pub technical_quality: String,
}

/// Response for a skill gap analysis job
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResponse {
    /// Unique job identifier
    pub job_id: String,
    /// Job status
    pub status: AnalysisStatus,
    /// Analysis result, once the Analyzer phase has run
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,
    /// Curated resources keyed by skill name
    #[serde(default)]
    pub curated_resources: HashMap<String, Vec<Resource>>,
    /// Error message when the job failed
    #[serde(default)]
    pub error_message: Option<String>,
}

impl AnalysisResponse {
    /// Fresh job record in the `Pending` state
    pub fn pending(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: AnalysisStatus::Pending,
            analysis_result: None,
            curated_resources: HashMap::new(),
            error_message: None,
        }
    }
}

/// Response for a job status check
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
    /// Job identifier
    pub job_id: String,
    /// Current status
    pub status: AnalysisStatus,
    /// Coarse progress estimate (0-100)
    pub progress: Option<f64>,
    /// Status message (error message when failed)
    pub message: Option<String>,
    /// Full result, attached only once completed
    pub result: Option<AnalysisResponse>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
}

// === Internal Models (agent inputs) ===

/// Input for the Analyzer agent
#[derive(Debug, Clone)]
pub struct AnalyzerInput {
    pub resume_text: String,
    pub job_description: String,
    pub target_job_title: String,
}
