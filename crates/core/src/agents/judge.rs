//! # Judge Agent
//!
//! Validates curated resources by driving a code-executing agent over
//! the top candidates. Validation is strictly sequential (the fetch and
//! execute tooling is rate-limited upstream) and fail-open: a resource
//! is only dropped by an explicit judgement below the relevance
//! threshold. Resources past the top-N window are passed through
//! untested.

use std::sync::Arc;
use tracing::{info, warn};

use crate::extract;
use crate::models::{JudgementResult, Resource, SkillGap};
use crate::session::{AgentSession, Role, SessionFactory, SessionOptions};

use super::prompts;

pub struct Judge {
    sessions: Arc<dyn SessionFactory>,
    relevance_threshold: f64,
    validate_top_n: usize,
    model: String,
}

impl Judge {
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        relevance_threshold: f64,
        validate_top_n: usize,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            relevance_threshold,
            validate_top_n,
            model: model.into(),
        }
    }

    /// Validate a curated list, returning a subset in the original
    /// order. Empty in, empty out; no resource is ever added.
    pub async fn validate(&self, gap: &SkillGap, resources: Vec<Resource>) -> Vec<Resource> {
        if resources.is_empty() {
            return resources;
        }

        let to_test = resources.len().min(self.validate_top_n);
        info!(
            skill = %gap.skill_name,
            candidates = resources.len(),
            testing = to_test,
            "judge starting"
        );

        let mut kept = Vec::with_capacity(resources.len());
        let mut iter = resources.into_iter();

        for resource in iter.by_ref().take(to_test) {
            match self.judge_one(gap, &resource).await {
                Some(judgement) => {
                    info!(
                        url = %resource.url,
                        score = judgement.relevance_score,
                        tests_passed = judgement.code_tests_passed,
                        tests_failed = judgement.code_tests_failed,
                        quality = %judgement.technical_quality,
                        "resource judged"
                    );
                    if judgement.relevance_score >= self.relevance_threshold {
                        kept.push(resource);
                    } else {
                        info!(url = %resource.url, "resource rejected by judge");
                    }
                }
                // No verdict means no grounds to drop the resource
                None => {
                    warn!(url = %resource.url, "validation incomplete, keeping resource");
                    kept.push(resource);
                }
            }
        }

        // Remainder is appended without testing
        kept.extend(iter);

        info!(skill = %gap.skill_name, kept = kept.len(), "judge complete");
        kept
    }

    /// One validation session; `None` on any failure or when no
    /// judgement object appears in the stream.
    async fn judge_one(&self, gap: &SkillGap, resource: &Resource) -> Option<JudgementResult> {
        let mut session = match self.sessions.connect().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "judge session connect failed");
                return None;
            }
        };

        let outcome = self.drive_session(session.as_mut(), gap, resource).await;
        let _ = session.close().await;

        match outcome {
            Ok(judgement) => judgement,
            Err(e) => {
                warn!(error = %e, "judge session failed");
                None
            }
        }
    }

    async fn drive_session(
        &self,
        session: &mut dyn AgentSession,
        gap: &SkillGap,
        resource: &Resource,
    ) -> anyhow::Result<Option<JudgementResult>> {
        let options = SessionOptions::new(prompts::JUDGE, self.model.clone());
        session.send(&task_prompt(gap, resource), &options).await?;

        while let Some(message) = session.next_message().await? {
            if message.role != Role::Assistant {
                continue;
            }
            let text = message.text();
            let Ok(value) = extract::json_object(&text) else {
                continue;
            };
            if value.get("relevance_score").is_none() {
                continue;
            }
            match serde_json::from_value::<JudgementResult>(value) {
                Ok(judgement) => return Ok(Some(judgement)),
                Err(e) => {
                    warn!(error = %e, "judgement object failed to decode");
                    continue;
                }
            }
        }

        Ok(None)
    }
}

fn task_prompt(gap: &SkillGap, resource: &Resource) -> String {
    format!(
        "AUTONOMOUS VALIDATION TASK: Test Resource with Code Execution\n\n\
         RESOURCE TO VALIDATE:\n\
         - Title: {title}\n\
         - URL: {url}\n\
         - Provider: {provider}\n\
         - Type: {rtype}\n\
         - Stated Level: {difficulty}\n\n\
         SKILL GAP CONTEXT:\n\
         - Skill Needed: {skill}\n\
         - Required Level: {required}\n\
         - Priority: {priority}\n\n\
         YOUR AUTONOMOUS MISSION:\n\n\
         1. FETCH THE RESOURCE\n\
            - Use web_fetch to get content from: {url}\n\
            - Extract code examples, tutorials, exercises\n\n\
         2. TEST CODE EXAMPLES\n\
            - Use code_execution to run example code\n\
            - Test at least 2-3 examples if available\n\
            - Verify they execute without errors\n\
            - Check if outputs are correct\n\n\
         3. EVALUATE QUALITY\n\
            Based on your testing:\n\
            - Does it actually teach \"{skill}\"?\n\
            - Do examples work?\n\
            - Is difficulty appropriate for \"{required}\" level?\n\
            - Is content up-to-date?\n\n\
         4. OUTPUT JUDGEMENT JSON\n\
            Return ONLY the judgement JSON (no extra text).\n\n\
         REMEMBER: You MUST use code_execution to test examples. Execute, don't just analyze!\n\n\
         Begin your autonomous validation with code execution now!",
        title = resource.title,
        url = resource.url,
        provider = resource.provider,
        rtype = serde_json::to_string(&resource.resource_type)
            .unwrap_or_default()
            .replace('"', ""),
        difficulty = resource.difficulty_level,
        skill = gap.skill_name,
        required = gap.required_level,
        priority = gap.priority,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, ProficiencyLevel, ResourceType};
    use crate::session::script::ScriptedSessions;
    use crate::session::OfflineSessions;

    fn gap() -> SkillGap {
        SkillGap {
            skill_name: "Kubernetes".to_string(),
            required_level: ProficiencyLevel::Advanced,
            priority: Priority::Critical,
            recommended_starting_level: "beginner".to_string(),
        }
    }

    fn resource(title: &str) -> Resource {
        Resource {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            provider: "Web".to_string(),
            resource_type: ResourceType::Tutorial,
            difficulty_level: "beginner".to_string(),
            duration_hours: 10.0,
            is_free: true,
            rating: None,
            description: String::new(),
            tech_stack_match: vec!["Kubernetes".to_string()],
        }
    }

    fn judgement(score: f64) -> String {
        format!(
            r#"Validation done.
{{"resource_id": "x", "is_relevant": true, "relevance_score": {score},
  "reasoning": "tested", "recommended": true,
  "code_tests_passed": 3, "code_tests_failed": 0,
  "technical_quality": "good"}}"#
        )
    }

    #[tokio::test]
    async fn test_empty_in_empty_out() {
        let judge = Judge::new(Arc::new(OfflineSessions), 0.7, 5, "test-model");
        assert!(judge.validate(&gap(), vec![]).await.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let factory = ScriptedSessions::new(vec![
            vec![crate::session::AgentMessage::assistant(judgement(0.9))],
            vec![crate::session::AgentMessage::assistant(judgement(0.3))],
        ]);
        let judge = Judge::new(Arc::new(factory), 0.7, 5, "test-model");

        let kept = judge
            .validate(&gap(), vec![resource("good"), resource("bad")])
            .await;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "good");
    }

    #[tokio::test]
    async fn test_fail_open_on_session_error() {
        let judge = Judge::new(Arc::new(OfflineSessions), 0.7, 5, "test-model");
        let kept = judge
            .validate(&gap(), vec![resource("a"), resource("b")])
            .await;
        assert_eq!(kept.len(), 2);
    }

    #[tokio::test]
    async fn test_fail_open_on_missing_judgement() {
        let factory = ScriptedSessions::replying(vec!["I fetched the page but found no code."]);
        let judge = Judge::new(Arc::new(factory), 0.7, 5, "test-model");

        let kept = judge.validate(&gap(), vec![resource("a")]).await;
        assert_eq!(kept.len(), 1);
    }

    #[tokio::test]
    async fn test_remainder_passes_untested() {
        // Only two scripts: if a third session were opened it would
        // stream nothing and still be kept, but connect_count proves the
        // window.
        let factory = Arc::new(ScriptedSessions::new(vec![
            vec![crate::session::AgentMessage::assistant(judgement(0.9))],
            vec![crate::session::AgentMessage::assistant(judgement(0.2))],
        ]));
        let judge = Judge::new(Arc::clone(&factory) as Arc<dyn SessionFactory>, 0.7, 2, "test-model");

        let resources = vec![
            resource("r1"),
            resource("r2"),
            resource("r3"),
            resource("r4"),
        ];
        let kept = judge.validate(&gap(), resources).await;

        // r1 kept (0.9), r2 dropped (0.2), r3/r4 untested passthrough
        assert_eq!(
            kept.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["r1", "r3", "r4"]
        );
        assert_eq!(factory.connect_count(), 2);
    }

    #[tokio::test]
    async fn test_order_preserved_and_no_new_items() {
        let factory = ScriptedSessions::new(vec![
            vec![crate::session::AgentMessage::assistant(judgement(0.8))],
            vec![crate::session::AgentMessage::assistant(judgement(0.95))],
        ]);
        let judge = Judge::new(Arc::new(factory), 0.7, 5, "test-model");

        let input = vec![resource("first"), resource("second")];
        let kept = judge.validate(&gap(), input.clone()).await;
        assert_eq!(kept, input);
    }
}
