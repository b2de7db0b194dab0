//! # Resource Normalizer
//!
//! Converts loosely-typed resource records into validated [`Resource`]
//! entities. Records arrive from three very different sources (agent
//! output, the search API, static fallback data); this is the single
//! funnel through which all of them pass, so the caller-visible filter
//! contract holds regardless of tier.
//!
//! Partial or garbage entries are common in free-form model output and
//! must never abort the batch: they are skipped silently.

use serde::Deserialize;
use tracing::debug;

use crate::models::{Resource, ResourceFilters, ResourceType, SkillGap};

/// Lenient decode target for one raw record.
///
/// The search API says `type` and `difficulty` where agent output says
/// `resource_type` and `difficulty_level`; both spellings are accepted.
#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    provider: String,
    #[serde(default, alias = "type")]
    resource_type: Option<String>,
    #[serde(default, alias = "difficulty")]
    difficulty_level: Option<String>,
    #[serde(default)]
    duration_hours: Option<serde_json::Value>,
    #[serde(default)]
    is_free: Option<bool>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    description: String,
}

/// Normalize a batch of raw records against a skill gap and filters.
///
/// Pure over its inputs (plus logging): the same batch under the same
/// filters always yields equal resources.
pub fn normalize(
    items: &[serde_json::Value],
    gap: &SkillGap,
    filters: &ResourceFilters,
) -> Vec<Resource> {
    items
        .iter()
        .filter_map(|item| normalize_one(item, gap))
        .filter(|resource| passes_filters(resource, filters))
        .collect()
}

/// Convert one raw record; `None` means skip.
fn normalize_one(item: &serde_json::Value, gap: &SkillGap) -> Option<Resource> {
    let raw: RawResource = match serde_json::from_value(item.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "skipping undecodable resource record");
            return None;
        }
    };

    let title = raw.title.trim();
    let url = raw.url.trim();
    if title.is_empty() || url.is_empty() {
        debug!("skipping resource record with missing title or url");
        return None;
    }

    let resource_type = raw
        .resource_type
        .as_deref()
        .and_then(ResourceType::parse)
        .unwrap_or(ResourceType::Tutorial);

    let duration_hours = raw
        .duration_hours
        .as_ref()
        .and_then(coerce_hours)
        .unwrap_or(10.0);

    let provider = match raw.provider.trim() {
        "" => "Unknown".to_string(),
        p => p.to_string(),
    };

    Some(Resource {
        title: title.to_string(),
        url: url.to_string(),
        provider,
        resource_type,
        difficulty_level: raw
            .difficulty_level
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| gap.recommended_starting_level.clone()),
        duration_hours,
        is_free: raw.is_free.unwrap_or(true),
        rating: raw.rating,
        description: raw.description.trim().to_string(),
        tech_stack_match: vec![gap.skill_name.clone()],
    })
}

/// Duration may arrive as a number or a numeric string
fn coerce_hours(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Filters applied in order: free_only, max duration, type allow-set
fn passes_filters(resource: &Resource, filters: &ResourceFilters) -> bool {
    if filters.free_only && !resource.is_free {
        return false;
    }
    if resource.duration_hours > filters.max_duration_hours {
        return false;
    }
    if !filters.resource_types.contains(&resource.resource_type) {
        return false;
    }
    true
}
