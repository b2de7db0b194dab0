//! # Resource Search Collaborator
//!
//! Client for the external learning-resource search API, plus the
//! static fallback records used when every other tier comes up empty.
//! Search failures never propagate: the curator treats them as an
//! empty result and moves on to the next tier.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Searches for educational resources for one skill
#[async_trait]
pub trait ResourceSearch: Send + Sync {
    /// Loose resource records (title, url, provider, type, is_free, ...).
    /// May return an empty list.
    async fn search(
        &self,
        skill: &str,
        level: &str,
        free_only: bool,
        max_results: usize,
    ) -> anyhow::Result<Vec<Value>>;
}

/// HTTP client for the resource-search API
pub struct SearchApiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    excerpts: Vec<String>,
}

impl SearchApiClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    async fn run_search(
        &self,
        objective: &str,
        queries: &[String],
        max_results: usize,
    ) -> anyhow::Result<Vec<Value>> {
        let response = self
            .http
            .post(format!("{}/v1beta/search", self.endpoint))
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "objective": objective,
                "search_queries": queries,
                "max_results": max_results,
                "max_chars_per_result": 5000,
            }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: SearchResponse = response.json().await?;

        let resources: Vec<Value> = parsed
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(|r| {
                let description = extract_description(&r);
                json!({
                    "title": if r.title.is_empty() { "Unknown Resource".to_string() } else { r.title.clone() },
                    "url": r.url,
                    "description": description,
                    "provider": provider_for_url(&r.url),
                    "type": infer_type(&r.title),
                    "difficulty": "intermediate",
                    "is_free": true,
                })
            })
            .collect();

        debug!(count = resources.len(), "converted search results to resources");
        Ok(resources)
    }
}

#[async_trait]
impl ResourceSearch for SearchApiClient {
    async fn search(
        &self,
        skill: &str,
        level: &str,
        free_only: bool,
        max_results: usize,
    ) -> anyhow::Result<Vec<Value>> {
        if self.api_key.is_empty() {
            warn!("no search API key configured, using static resources");
            return Ok(static_resources(skill, level));
        }

        let free_filter = if free_only { " that are free" } else { "" };
        let objective = format!(
            "Find the best {skill} {level} learning resources{free_filter} \
             including courses, tutorials, documentation, and video guides"
        );
        let queries = vec![
            format!("{skill} tutorial {level}"),
            format!("learn {skill} {level}"),
            format!("{skill} course for {level}"),
            format!("{skill} documentation and guides"),
        ];

        info!(skill, level, "searching for learning resources");
        let results = self.run_search(&objective, &queries, max_results).await?;

        if results.is_empty() {
            warn!(skill, "search API returned no resources, using static resources");
            return Ok(static_resources(skill, level));
        }

        info!(skill, count = results.len(), "retrieved resources from search API");
        Ok(results)
    }
}

fn extract_description(result: &SearchResult) -> String {
    match result.excerpts.first() {
        Some(excerpt) => {
            // Strip the "Last updated:" header line some sources prepend
            let cleaned = if excerpt.contains("Last updated") {
                excerpt.splitn(2, '\n').nth(1).unwrap_or(excerpt)
            } else {
                excerpt
            };
            cleaned.trim().chars().take(500).collect()
        }
        None if result.title.is_empty() => "Resource about topic".to_string(),
        None => format!("Resource about {}", result.title),
    }
}

/// Map a URL to a known provider name
pub fn provider_for_url(url: &str) -> &'static str {
    if url.contains("udemy.com") {
        "Udemy"
    } else if url.contains("coursera.org") {
        "Coursera"
    } else if url.contains("youtube.com") || url.contains("youtu.be") {
        "YouTube"
    } else if url.contains("freecodecamp.org") {
        "freeCodeCamp"
    } else if url.contains("github.com") {
        "GitHub"
    } else if url.contains("stackoverflow.com") {
        "Stack Overflow"
    } else if url.contains("docs.") || url.contains("/docs") || url.contains("/documentation") {
        "Documentation"
    } else if url.contains("medium.com") {
        "Medium"
    } else if url.contains("dev.to") {
        "Dev.to"
    } else if url.contains("linkedin.com") {
        "LinkedIn Learning"
    } else if url.contains("pluralsight.com") {
        "Pluralsight"
    } else if url.contains("educative.io") {
        "Educative"
    } else {
        "Web"
    }
}

/// Guess a resource type from its title
pub fn infer_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if ["course", "complete", "master"].iter().any(|w| title.contains(w)) {
        "course"
    } else if ["tutorial", "guide", "how to", "learn"].iter().any(|w| title.contains(w)) {
        "tutorial"
    } else if ["doc", "reference", "api"].iter().any(|w| title.contains(w)) {
        "documentation"
    } else if ["video", "youtube"].iter().any(|w| title.contains(w)) {
        "video"
    } else {
        "article"
    }
}

/// URL-safe slug for a skill name ("AWS/Cloud Platforms" -> "aws-cloud-platforms")
fn slug(skill: &str) -> String {
    skill
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Static fallback records: well-known providers templated with the
/// skill name. Last tier of the curation chain, so a request can
/// complete even under total external-service outage.
pub fn static_resources(skill: &str, level: &str) -> Vec<Value> {
    info!(skill, "generating static fallback resources");
    let skill_slug = slug(skill);
    vec![
        json!({
            "title": format!("{skill} for Beginners - Complete Guide"),
            "url": format!("https://www.udemy.com/course/{skill_slug}-beginners"),
            "description": format!("Comprehensive {skill} course covering fundamentals to advanced concepts"),
            "provider": "Udemy",
            "type": "course",
            "difficulty": level,
            "is_free": false,
        }),
        json!({
            "title": format!("Learn {skill} - Free Interactive Tutorial"),
            "url": format!("https://www.freecodecamp.org/learn/{skill_slug}"),
            "description": format!("Free interactive {skill} tutorial with hands-on exercises"),
            "provider": "freeCodeCamp",
            "type": "tutorial",
            "difficulty": level,
            "is_free": true,
        }),
        json!({
            "title": format!("{skill} Tutorial for Beginners"),
            "url": format!(
                "https://www.youtube.com/results?search_query={}+tutorial",
                urlencoding::encode(&skill_slug)
            ),
            "description": format!("Step-by-step {skill} video tutorial for beginners"),
            "provider": "YouTube",
            "type": "video",
            "difficulty": level,
            "is_free": true,
        }),
        json!({
            "title": format!("{skill} Complete Course"),
            "url": format!("https://www.coursera.org/learn/{skill_slug}"),
            "description": format!("University-level {skill} course with certificate"),
            "provider": "Coursera",
            "type": "course",
            "difficulty": level,
            "is_free": true,
        }),
    ]
}
