//! Environment-driven settings with sensible defaults. A `.env` file is
//! honored when present; CLI flags override afterwards.

use skillforge_core::OrchestratorConfig;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub model: String,
    pub search_api_key: String,
    pub search_api_endpoint: String,
    pub enable_judge: bool,
    pub enable_cache: bool,
    pub max_concurrent_curators: usize,
    pub validate_top_n: usize,
    pub relevance_threshold: f64,
    pub min_quality_resources: usize,
    pub cache_ttl_days: i64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            host: env_or("SKILLFORGE_HOST", "0.0.0.0"),
            port: env_parse("SKILLFORGE_PORT", 8000),
            db_path: env_or("SKILLFORGE_DB", ".skillforge/skillforge.db"),
            model: env_or("SKILLFORGE_MODEL", &defaults.model),
            search_api_key: env_or("SEARCH_API_KEY", ""),
            search_api_endpoint: env_or("SEARCH_API_ENDPOINT", "https://api.parallel.ai"),
            enable_judge: env_parse("ENABLE_JUDGE", defaults.enable_judge),
            enable_cache: env_parse("ENABLE_CACHE", defaults.enable_cache),
            max_concurrent_curators: env_parse(
                "MAX_CONCURRENT_CURATORS",
                defaults.max_concurrent_curators,
            ),
            validate_top_n: env_parse("VALIDATE_TOP_N", defaults.validate_top_n),
            relevance_threshold: env_parse("RELEVANCE_THRESHOLD", defaults.relevance_threshold),
            min_quality_resources: env_parse(
                "MIN_QUALITY_RESOURCES",
                defaults.min_quality_resources,
            ),
            cache_ttl_days: env_parse("CACHE_TTL_DAYS", defaults.cache_ttl_days),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            enable_judge: self.enable_judge,
            enable_cache: self.enable_cache,
            max_concurrent_curators: self.max_concurrent_curators,
            validate_top_n: self.validate_top_n,
            relevance_threshold: self.relevance_threshold,
            min_quality_resources: self.min_quality_resources,
            model: self.model.clone(),
            cache_ttl_days: self.cache_ttl_days,
        }
    }
}
