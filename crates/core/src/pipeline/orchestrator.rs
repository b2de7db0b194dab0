//! # Orchestrator
//!
//! Drives one analysis job through its state machine:
//! pending -> in_progress -> completed | failed. Phases run in a fixed
//! order (cache check, Analyzer, Curator, Judge); each phase owns its
//! fallbacks, so a job only fails when an error escapes every one of
//! them. Partial results accumulated before a failure stay on the job
//! record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agents::{Analyzer, Curator, Judge};
use crate::models::{
    AnalysisRequest, AnalysisResponse, AnalysisStatus, AnalyzerInput, StatusResponse,
};
use crate::search::ResourceSearch;
use crate::session::SessionFactory;
use crate::state::{AnalysisCache, JobStore};

use super::events::{EventBus, EventKind};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Run the Judge phase after curation
    pub enable_judge: bool,
    /// Consult and populate the analysis cache
    pub enable_cache: bool,
    /// Concurrency cap for per-skill curation tasks
    pub max_concurrent_curators: usize,
    /// How many resources per skill the Judge tests
    pub validate_top_n: usize,
    /// Minimum relevance score a judged resource must reach
    pub relevance_threshold: f64,
    /// Per-skill resource count under which a warning is logged
    pub min_quality_resources: usize,
    /// Model identifier passed to agent sessions
    pub model: String,
    /// Cache entry lifetime in days
    pub cache_ttl_days: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_judge: true,
            enable_cache: true,
            max_concurrent_curators: 5,
            validate_top_n: 5,
            relevance_threshold: 0.7,
            min_quality_resources: 3,
            model: "claude-sonnet-4-20250514".to_string(),
            cache_ttl_days: 7,
        }
    }
}

/// Counters aggregated across all jobs this orchestrator has run
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PerformanceMetrics {
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub cache_hits: u64,
    pub analyses_run: u64,
    pub skills_identified: u64,
    pub resources_found: u64,
    pub resources_validated: u64,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    analyzer: Analyzer,
    curator: Curator,
    judge: Judge,
    jobs: Arc<dyn JobStore>,
    cache: Option<AnalysisCache>,
    events: EventBus,
    metrics: Mutex<PerformanceMetrics>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        sessions: Arc<dyn SessionFactory>,
        search: Arc<dyn ResourceSearch>,
        jobs: Arc<dyn JobStore>,
        cache: Option<AnalysisCache>,
        events: EventBus,
    ) -> Self {
        let cache = cache.map(|c| c.with_ttl_days(config.cache_ttl_days));
        Self {
            analyzer: Analyzer::new(Arc::clone(&sessions), config.model.clone()),
            curator: Curator::new(
                Arc::clone(&sessions),
                search,
                config.max_concurrent_curators,
                config.model.clone(),
            ),
            judge: Judge::new(
                sessions,
                config.relevance_threshold,
                config.validate_top_n,
                config.model.clone(),
            ),
            config,
            jobs,
            cache,
            events,
            metrics: Mutex::new(PerformanceMetrics::default()),
        }
    }

    /// Run one analysis job end to end. Never panics and never returns
    /// an error: failures surface on the returned job record.
    pub async fn process_request(&self, request: &AnalysisRequest) -> AnalysisResponse {
        let job_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        info!(job_id = %job_id, target = %request.target_job_title, "job started");
        self.events.emit(
            EventKind::JobStarted,
            "orchestrator",
            Some(serde_json::json!({"job_id": job_id})),
        );

        let mut job = AnalysisResponse::pending(&job_id);
        self.jobs.put(job.clone()).await;

        job.status = AnalysisStatus::InProgress;
        self.jobs.put(job.clone()).await;

        match self.run_pipeline(request, &mut job).await {
            Ok(()) => {
                job.status = AnalysisStatus::Completed;
                self.log_job_metrics(&job, started);
                self.events.emit(
                    EventKind::JobCompleted,
                    "orchestrator",
                    Some(serde_json::json!({"job_id": job_id})),
                );
                if let Ok(mut metrics) = self.metrics.lock() {
                    metrics.jobs_completed += 1;
                }
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "job failed");
                job.status = AnalysisStatus::Failed;
                job.error_message = Some(format!("Analysis failed: {e}"));
                self.events.emit(
                    EventKind::JobFailed,
                    "orchestrator",
                    Some(serde_json::json!({"job_id": job_id, "error": e.to_string()})),
                );
                if let Ok(mut metrics) = self.metrics.lock() {
                    metrics.jobs_failed += 1;
                }
            }
        }

        self.jobs.put(job.clone()).await;
        job
    }

    async fn run_pipeline(
        &self,
        request: &AnalysisRequest,
        job: &mut AnalysisResponse,
    ) -> anyhow::Result<()> {
        // Phase 1: analysis, via cache when possible
        let analysis = match self.cached_analysis(request) {
            Some(cached) => {
                self.events.emit(EventKind::CacheHit, "orchestrator", None);
                if let Ok(mut metrics) = self.metrics.lock() {
                    metrics.cache_hits += 1;
                }
                cached
            }
            None => {
                self.events.emit(EventKind::AgentStarted, "analyzer", None);
                let input = AnalyzerInput {
                    resume_text: request.resume_text.clone(),
                    job_description: request.job_description.clone(),
                    target_job_title: request.target_job_title.clone(),
                };
                let analysis = self.analyzer.analyze(&input).await;
                self.events.emit(
                    EventKind::AgentCompleted,
                    "analyzer",
                    Some(serde_json::json!({"skill_gaps": analysis.skill_gaps.len()})),
                );
                if let Ok(mut metrics) = self.metrics.lock() {
                    metrics.analyses_run += 1;
                }
                if self.config.enable_cache {
                    if let Some(cache) = &self.cache {
                        cache.put(&request.resume_text, &request.job_description, &analysis);
                    }
                }
                analysis
            }
        };

        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.skills_identified += analysis.skill_gaps.len() as u64;
        }
        job.analysis_result = Some(analysis.clone());

        // Phase 2: curation, always
        self.events.emit(EventKind::AgentStarted, "curator", None);
        let curated = self
            .curator
            .curate(&analysis.skill_gaps, &analysis.tech_stack, &request.filters)
            .await;
        let found: usize = curated.values().map(Vec::len).sum();
        self.events.emit(
            EventKind::AgentCompleted,
            "curator",
            Some(serde_json::json!({"resources": found})),
        );
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.resources_found += found as u64;
        }
        job.curated_resources = curated;

        // Phase 3: judging, sequential per skill
        if self.config.enable_judge {
            self.events.emit(EventKind::AgentStarted, "judge", None);
            let mut validated: HashMap<_, _> = HashMap::new();
            for gap in &analysis.skill_gaps {
                let resources = job
                    .curated_resources
                    .remove(&gap.skill_name)
                    .unwrap_or_default();
                let kept = self.judge.validate(gap, resources).await;
                validated.insert(gap.skill_name.clone(), kept);
            }
            let surviving: usize = validated.values().map(Vec::len).sum();
            self.events.emit(
                EventKind::AgentCompleted,
                "judge",
                Some(serde_json::json!({"resources": surviving})),
            );
            if let Ok(mut metrics) = self.metrics.lock() {
                metrics.resources_validated += surviving as u64;
            }
            job.curated_resources = validated;
        }

        Ok(())
    }

    fn cached_analysis(&self, request: &AnalysisRequest) -> Option<crate::models::AnalysisResult> {
        if !self.config.enable_cache {
            return None;
        }
        self.cache
            .as_ref()?
            .get(&request.resume_text, &request.job_description)
    }

    fn log_job_metrics(&self, job: &AnalysisResponse, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        let skills = job.curated_resources.len();
        let resources: usize = job.curated_resources.values().map(Vec::len).sum();
        let below_min = job
            .curated_resources
            .values()
            .filter(|list| list.len() < self.config.min_quality_resources)
            .count();

        info!(
            job_id = %job.job_id,
            elapsed_secs = format!("{elapsed:.2}"),
            skills,
            resources,
            skills_per_sec = format!("{:.2}", skills as f64 / elapsed.max(f64::EPSILON)),
            avg_resources_per_skill =
                format!("{:.1}", resources as f64 / (skills.max(1)) as f64),
            below_min,
            "job completed"
        );
        if below_min > 0 {
            warn!(
                below_min,
                min = self.config.min_quality_resources,
                "some skills have fewer resources than the quality floor"
            );
        }
    }

    /// Status view for a job, or `None` when the id is unknown/expired
    pub async fn job_status(&self, job_id: &str) -> Option<StatusResponse> {
        let job = self.jobs.get(job_id).await?;
        let progress = match job.status {
            AnalysisStatus::Pending => 0.0,
            AnalysisStatus::InProgress => 50.0,
            AnalysisStatus::Completed => 100.0,
            AnalysisStatus::Failed => 0.0,
        };
        Some(StatusResponse {
            job_id: job.job_id.clone(),
            status: job.status,
            progress: Some(progress),
            message: job.error_message.clone(),
            result: (job.status == AnalysisStatus::Completed).then_some(job),
        })
    }

    /// Snapshot of cross-job counters
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceFilters;
    use crate::search::{static_resources, ResourceSearch};
    use crate::session::script::ScriptedSessions;
    use crate::session::OfflineSessions;
    use crate::state::{MemoryJobStore, SkillforgeDb};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FailingSearch;

    #[async_trait]
    impl ResourceSearch for FailingSearch {
        async fn search(
            &self,
            _skill: &str,
            _level: &str,
            _free_only: bool,
            _max_results: usize,
        ) -> anyhow::Result<Vec<serde_json::Value>> {
            anyhow::bail!("search unavailable")
        }
    }

    struct StaticSearch;

    #[async_trait]
    impl ResourceSearch for StaticSearch {
        async fn search(
            &self,
            skill: &str,
            level: &str,
            _free_only: bool,
            _max_results: usize,
        ) -> anyhow::Result<Vec<serde_json::Value>> {
            Ok(static_resources(skill, level))
        }
    }

    fn request(title: &str) -> AnalysisRequest {
        AnalysisRequest {
            resume_text: "Python developer with 3 years of experience".to_string(),
            job_description: "Looking for platform expertise".to_string(),
            target_job_title: title.to_string(),
            filters: ResourceFilters::default(),
        }
    }

    fn offline_orchestrator(config: OrchestratorConfig) -> Orchestrator {
        Orchestrator::new(
            config,
            Arc::new(OfflineSessions),
            Arc::new(FailingSearch),
            Arc::new(MemoryJobStore::default()),
            None,
            EventBus::disabled(),
        )
    }

    #[tokio::test]
    async fn test_e2e_offline_devops_completes_on_static_fallback() {
        let orchestrator = offline_orchestrator(OrchestratorConfig {
            enable_cache: false,
            ..OrchestratorConfig::default()
        });

        let job = orchestrator.process_request(&request("DevOps Engineer")).await;

        assert_eq!(job.status, AnalysisStatus::Completed);
        let analysis = job.analysis_result.as_ref().unwrap();
        // Generic mock branch: System Design + Algorithms
        assert_eq!(analysis.skill_gaps.len(), 2);
        assert_eq!(job.curated_resources.len(), 2);
        for gap in &analysis.skill_gaps {
            let resources = &job.curated_resources[&gap.skill_name];
            assert!(!resources.is_empty());
            assert!(resources
                .iter()
                .any(|r| r.url.contains("freecodecamp.org")));
            // Default filters: free only
            assert!(resources.iter().all(|r| r.is_free));
        }
    }

    #[tokio::test]
    async fn test_status_progression_and_result_attachment() {
        let orchestrator = offline_orchestrator(OrchestratorConfig {
            enable_cache: false,
            enable_judge: false,
            ..OrchestratorConfig::default()
        });

        assert!(orchestrator.job_status("nope").await.is_none());

        let job = orchestrator.process_request(&request("Backend Developer")).await;
        let status = orchestrator.job_status(&job.job_id).await.unwrap();
        assert_eq!(status.status, AnalysisStatus::Completed);
        assert_eq!(status.progress, Some(100.0));
        assert!(status.result.is_some());
        assert!(status.message.is_none());
    }

    #[tokio::test]
    async fn test_event_ordering() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                enable_cache: false,
                ..OrchestratorConfig::default()
            },
            Arc::new(OfflineSessions),
            Arc::new(StaticSearch),
            Arc::new(MemoryJobStore::default()),
            None,
            EventBus::new(tx),
        );

        orchestrator.process_request(&request("Backend Developer")).await;

        let mut agents = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if event.kind == EventKind::AgentStarted {
                agents.push(event.agent);
            }
        }
        assert_eq!(agents, vec!["analyzer", "curator", "judge"]);
    }

    #[tokio::test]
    async fn test_cache_skips_second_analyzer_session() {
        let path = std::env::temp_dir()
            .join(format!("skillforge_orch_{}.db", Uuid::new_v4()));
        let db = SkillforgeDb::open_at(&path).unwrap();

        // Scripts run out after the first connect; later sessions stream
        // nothing, so every agent path falls back deterministically.
        let sessions = Arc::new(ScriptedSessions::new(vec![]));
        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                enable_judge: false,
                ..OrchestratorConfig::default()
            },
            Arc::clone(&sessions) as Arc<dyn crate::session::SessionFactory>,
            Arc::new(FailingSearch),
            Arc::new(MemoryJobStore::default()),
            Some(AnalysisCache::new(db.connection())),
            EventBus::disabled(),
        );

        let req = request("Backend Developer");
        let first = orchestrator.process_request(&req).await;
        let connects_after_first = sessions.connect_count();
        // 1 analyzer session + one curator session per gap
        let gaps = first.analysis_result.as_ref().unwrap().skill_gaps.len();
        assert_eq!(connects_after_first, 1 + gaps);

        let second = orchestrator.process_request(&req).await;
        // Cache hit: only the curator sessions this time
        assert_eq!(sessions.connect_count(), connects_after_first + gaps);
        assert_eq!(second.analysis_result, first.analysis_result);
        assert_eq!(orchestrator.performance_metrics().cache_hits, 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_judge_disabled_keeps_curated_lists() {
        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                enable_cache: false,
                enable_judge: false,
                ..OrchestratorConfig::default()
            },
            Arc::new(OfflineSessions),
            Arc::new(StaticSearch),
            Arc::new(MemoryJobStore::default()),
            None,
            EventBus::disabled(),
        );

        let job = orchestrator.process_request(&request("Backend Developer")).await;
        assert_eq!(job.status, AnalysisStatus::Completed);
        // Static search tier: 3 of 4 records survive the default filters
        for resources in job.curated_resources.values() {
            assert_eq!(resources.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_metrics_accumulate() {
        let orchestrator = offline_orchestrator(OrchestratorConfig {
            enable_cache: false,
            enable_judge: false,
            ..OrchestratorConfig::default()
        });

        orchestrator.process_request(&request("Backend Developer")).await;
        orchestrator.process_request(&request("Data Engineer")).await;

        let metrics = orchestrator.performance_metrics();
        assert_eq!(metrics.jobs_completed, 2);
        assert_eq!(metrics.analyses_run, 2);
        // 2 generic gaps + 3 data gaps
        assert_eq!(metrics.skills_identified, 5);
    }
}
