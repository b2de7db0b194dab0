//! # Job Store
//!
//! Holds job records across their lifecycle so status polls can observe
//! progress. The store is a seam: the default in-memory implementation
//! bounds both entry age and entry count, and a durable backend can be
//! swapped in without touching the orchestrator.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::AnalysisResponse;

/// Keyed storage for job records
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, job_id: &str) -> Option<AnalysisResponse>;
    async fn put(&self, job: AnalysisResponse);
    async fn delete(&self, job_id: &str);
}

/// Default retention for finished and unfinished jobs alike
const DEFAULT_TTL_HOURS: i64 = 24;
/// Hard cap on retained jobs
const DEFAULT_MAX_JOBS: usize = 1000;

struct Entry {
    job: AnalysisResponse,
    inserted_at: DateTime<Utc>,
}

/// In-memory job store with TTL and size-capped eviction
pub struct MemoryJobStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    max_jobs: usize,
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS), DEFAULT_MAX_JOBS)
    }
}

impl MemoryJobStore {
    pub fn new(ttl: Duration, max_jobs: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_jobs,
        }
    }

    /// Drop expired entries, then oldest entries past the cap
    fn prune(&self, entries: &mut HashMap<String, Entry>) {
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.inserted_at < self.ttl);

        while entries.len() > self.max_jobs {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    entries.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before.saturating_sub(entries.len());
        if evicted > 0 {
            debug!(evicted, retained = entries.len(), "pruned job store");
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, job_id: &str) -> Option<AnalysisResponse> {
        let entries = self.entries.read().await;
        let entry = entries.get(job_id)?;
        if Utc::now() - entry.inserted_at >= self.ttl {
            return None;
        }
        Some(entry.job.clone())
    }

    async fn put(&self, job: AnalysisResponse) {
        let mut entries = self.entries.write().await;
        entries.insert(
            job.job_id.clone(),
            Entry {
                job,
                inserted_at: Utc::now(),
            },
        );
        self.prune(&mut entries);
    }

    async fn delete(&self, job_id: &str) {
        self.entries.write().await.remove(job_id);
    }
}
