//! # Curator Agent
//!
//! Fans out one autonomous curation task per skill gap under a
//! concurrency cap and degrades through three tiers per skill:
//! agent session, then the search collaborator, then static fallback
//! records. A tier that raises is discarded whole; partial output is
//! never merged across tiers. Every gap appears as a key in the result,
//! with an empty list at worst.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::extract;
use crate::models::{Resource, ResourceFilters, SkillGap};
use crate::normalize::normalize;
use crate::search::{static_resources, ResourceSearch};
use crate::session::{AgentSession, Role, SessionFactory, SessionOptions};

use super::prompts;

/// How many results to request from the search collaborator per skill
const SEARCH_MAX_RESULTS: usize = 10;

#[derive(Clone)]
pub struct Curator {
    sessions: Arc<dyn SessionFactory>,
    search: Arc<dyn ResourceSearch>,
    max_concurrent: usize,
    model: String,
}

impl Curator {
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        search: Arc<dyn ResourceSearch>,
        max_concurrent: usize,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            search,
            max_concurrent: max_concurrent.max(1),
            model: model.into(),
        }
    }

    /// Curate resources for every skill gap. Output keys are exactly the
    /// gap names; a skill whose every tier came up empty maps to `[]`.
    pub async fn curate(
        &self,
        skill_gaps: &[SkillGap],
        tech_stack: &[String],
        filters: &ResourceFilters,
    ) -> HashMap<String, Vec<Resource>> {
        info!(
            skills = skill_gaps.len(),
            max_concurrent = self.max_concurrent,
            free_only = filters.free_only,
            "curator starting"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(skill_gaps.len());

        for gap in skill_gaps {
            let curator = self.clone();
            let gap = gap.clone();
            let tech_stack = tech_stack.to_vec();
            let filters = filters.clone();
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                // Closed only on runtime shutdown
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                let resources = curator.curate_for_skill(&gap, &tech_stack, &filters).await;
                (gap.skill_name, resources)
            }));
        }

        let mut curated: HashMap<String, Vec<Resource>> = skill_gaps
            .iter()
            .map(|gap| (gap.skill_name.clone(), Vec::new()))
            .collect();

        for handle in handles {
            match handle.await {
                Ok((skill_name, resources)) => {
                    info!(skill = %skill_name, count = resources.len(), "skill curated");
                    curated.insert(skill_name, resources);
                }
                Err(e) => warn!(error = %e, "curation task panicked, keeping empty list"),
            }
        }

        let total: usize = curated.values().map(Vec::len).sum();
        info!(total, skills = curated.len(), "curation complete");
        curated
    }

    /// Three-tier chain for a single skill. A failed or empty tier hands
    /// off to the next; only normalized resources are ever returned.
    async fn curate_for_skill(
        &self,
        gap: &SkillGap,
        tech_stack: &[String],
        filters: &ResourceFilters,
    ) -> Vec<Resource> {
        match self.agent_tier(gap, tech_stack, filters).await {
            Ok(resources) if !resources.is_empty() => return resources,
            Ok(_) => warn!(skill = %gap.skill_name, "agent curation yielded no resources"),
            Err(e) => warn!(skill = %gap.skill_name, error = %e, "agent curation failed"),
        }

        match self
            .search
            .search(
                &gap.skill_name,
                &gap.recommended_starting_level,
                filters.free_only,
                SEARCH_MAX_RESULTS,
            )
            .await
        {
            Ok(records) => {
                let resources = normalize(&records, gap, filters);
                if !resources.is_empty() {
                    info!(skill = %gap.skill_name, count = resources.len(), "resources from search collaborator");
                    return resources;
                }
            }
            Err(e) => warn!(skill = %gap.skill_name, error = %e, "search collaborator failed"),
        }

        let records = static_resources(&gap.skill_name, &gap.recommended_starting_level);
        normalize(&records, gap, filters)
    }

    /// Tier 1: drive one session and take the first non-empty JSON array
    /// any assistant message parses to.
    async fn agent_tier(
        &self,
        gap: &SkillGap,
        tech_stack: &[String],
        filters: &ResourceFilters,
    ) -> anyhow::Result<Vec<Resource>> {
        let mut session = self.sessions.connect().await?;
        let outcome = self.drive_session(session.as_mut(), gap, tech_stack, filters).await;
        let _ = session.close().await;

        let items = outcome?;
        Ok(normalize(&items, gap, filters))
    }

    async fn drive_session(
        &self,
        session: &mut dyn AgentSession,
        gap: &SkillGap,
        tech_stack: &[String],
        filters: &ResourceFilters,
    ) -> anyhow::Result<Vec<serde_json::Value>> {
        let options = SessionOptions::new(
            prompts::curator_prompt(&gap.skill_name, &gap.recommended_starting_level),
            self.model.clone(),
        );
        session
            .send(&task_prompt(gap, tech_stack, filters), &options)
            .await?;

        while let Some(message) = session.next_message().await? {
            if message.role != Role::Assistant {
                continue;
            }
            let text = message.text();
            match extract::json_array(&text) {
                Ok(serde_json::Value::Array(items)) if !items.is_empty() => return Ok(items),
                _ => continue,
            }
        }

        anyhow::bail!("agent produced no resource array for {}", gap.skill_name)
    }
}

fn task_prompt(gap: &SkillGap, tech_stack: &[String], filters: &ResourceFilters) -> String {
    let tech_context = tech_stack
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let types = filters
        .resource_types
        .iter()
        .map(|t| serde_json::to_string(t).unwrap_or_default().replace('"', ""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "AUTONOMOUS CURATION TASK\n\n\
         SKILL: {skill}\n\
         LEVEL: {level}\n\
         PRIORITY: {priority}\n\
         TECH CONTEXT: {tech_context}\n\n\
         FILTERS:\n\
         - Free resources only: {free_only}\n\
         - Max duration: {max_duration} hours\n\
         - Preferred types: {types}\n\n\
         YOUR AUTONOMOUS MISSION:\n\n\
         1. USE WEB_SEARCH to find learning resources for \"{skill} {level}\"\n\
            - Try multiple search queries\n\
            - Look for courses, tutorials, documentation\n\
            - Focus on reputable sources\n\n\
         2. USE WEB_FETCH to validate each URL\n\
            - Confirm the URL is active\n\
            - Verify content quality\n\
            - Check if it matches the skill level\n\
            - Confirm it's free (if required)\n\n\
         3. CURATE 5-10 HIGH-QUALITY RESOURCES\n\
            - Only include validated, active URLs\n\
            - Prioritize variety (different types and sources)\n\
            - Ensure they match the filters\n\n\
         4. OUTPUT JSON ARRAY\n\
            Return ONLY the JSON array of resources (no extra text).\n\n\
         Begin your autonomous search and validation now!",
        skill = gap.skill_name,
        level = gap.recommended_starting_level,
        priority = gap.priority,
        free_only = filters.free_only,
        max_duration = filters.max_duration_hours,
    )
}
