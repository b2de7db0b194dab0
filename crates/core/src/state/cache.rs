//! # Analysis Cache
//!
//! Caches Analyzer results keyed by a content hash of the resume and
//! job description, so resubmitting the same pair skips the expensive
//! Analyzer phase entirely.
//!
//! The cache is strictly best-effort: every failure (lock poisoning,
//! SQL errors, undecodable rows) degrades to a miss and is logged, never
//! surfaced to the pipeline.

use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::models::AnalysisResult;

/// Default time-to-live for cached analyses, in days
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Best-effort cache for skill gap analyses
pub struct AnalysisCache {
    conn: Arc<Mutex<Connection>>,
    ttl_days: i64,
}

impl AnalysisCache {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }

    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        self.ttl_days = ttl_days;
        self
    }

    /// Deterministic cache key for a resume / job description pair
    pub fn cache_key(resume_text: &str, job_description: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(resume_text.as_bytes());
        hasher.update(b"|");
        hasher.update(job_description.as_bytes());
        format!("skill_analysis:{:x}", hasher.finalize())
    }

    /// Look up a cached analysis. Expired entries are removed on read.
    pub fn get(&self, resume_text: &str, job_description: &str) -> Option<AnalysisResult> {
        let key = Self::cache_key(resume_text, job_description);
        let now = chrono::Utc::now().timestamp();

        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "cache lock poisoned, treating as miss");
                return None;
            }
        };

        let row: Result<(String, i64), _> = conn.query_row(
            "SELECT data, expires_at FROM analysis_cache WHERE key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        match row {
            Ok((data, expires_at)) => {
                if expires_at <= now {
                    debug!(key, "cache entry expired");
                    let _ = conn.execute(
                        "DELETE FROM analysis_cache WHERE key = ?1",
                        params![key],
                    );
                    return None;
                }
                match serde_json::from_str(&data) {
                    Ok(result) => {
                        info!(key, "analysis cache hit");
                        Some(result)
                    }
                    Err(e) => {
                        warn!(key, error = %e, "undecodable cache entry, treating as miss");
                        let _ = conn.execute(
                            "DELETE FROM analysis_cache WHERE key = ?1",
                            params![key],
                        );
                        None
                    }
                }
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!(error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store an analysis. Write failures are logged and swallowed.
    pub fn put(&self, resume_text: &str, job_description: &str, result: &AnalysisResult) {
        let key = Self::cache_key(resume_text, job_description);
        let expires_at = chrono::Utc::now().timestamp() + self.ttl_days * 86_400;

        let data = match serde_json::to_string(result) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "failed to serialize analysis for cache");
                return;
            }
        };

        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "cache lock poisoned, skipping write");
                return;
            }
        };

        match conn.execute(
            "INSERT OR REPLACE INTO analysis_cache (key, data, expires_at) VALUES (?1, ?2, ?3)",
            params![key, data, expires_at],
        ) {
            Ok(_) => debug!(key, ttl_days = self.ttl_days, "cached analysis"),
            Err(e) => warn!(error = %e, "cache write failed"),
        }
    }

    /// Drop the entry for a resume / job description pair
    pub fn invalidate(&self, resume_text: &str, job_description: &str) {
        let key = Self::cache_key(resume_text, job_description);
        if let Ok(conn) = self.conn.lock() {
            match conn.execute("DELETE FROM analysis_cache WHERE key = ?1", params![key]) {
                Ok(n) if n > 0 => info!(key, "invalidated cached analysis"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "cache invalidation failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::db::SkillforgeDb;

    fn test_cache(name: &str) -> (AnalysisCache, std::path::PathBuf) {
        let path =
            std::env::temp_dir().join(format!("skillforge_{}_{}.db", name, uuid::Uuid::new_v4()));
        let db = SkillforgeDb::open_at(&path).unwrap();
        (AnalysisCache::new(db.connection()), path)
    }

    fn sample_result() -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "skill_gaps": [{
                "skill_name": "Kubernetes",
                "required_level": "advanced",
                "priority": "critical",
                "recommended_starting_level": "beginner"
            }],
            "job_category": "DevOps Engineer"
        }))
        .unwrap()
    }

    #[test]
    fn test_key_is_deterministic_and_input_sensitive() {
        let a = AnalysisCache::cache_key("resume", "jd");
        let b = AnalysisCache::cache_key("resume", "jd");
        let c = AnalysisCache::cache_key("resume2", "jd");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("skill_analysis:"));
    }

    #[test]
    fn test_round_trip_and_invalidate() {
        let (cache, path) = test_cache("roundtrip");
        let result = sample_result();

        assert!(cache.get("r", "jd").is_none());

        cache.put("r", "jd", &result);
        assert_eq!(cache.get("r", "jd"), Some(result.clone()));

        // Different pair does not collide
        assert!(cache.get("r", "other jd").is_none());

        cache.invalidate("r", "jd");
        assert!(cache.get("r", "jd").is_none());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let (cache, path) = test_cache("expiry");
        let cache = cache.with_ttl_days(0);

        cache.put("r", "jd", &sample_result());
        // TTL of zero days expires immediately
        assert!(cache.get("r", "jd").is_none());

        let _ = std::fs::remove_file(path);
    }
}
