//! Study-guide notebook boundary. A completed analysis could be pushed
//! into a notebook service for guide generation; only the configuration
//! seam exists here.

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct NotebookClient {
    api_key: String,
    endpoint: String,
}

impl NotebookClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.api_key.is_empty() && !self.endpoint.is_empty()
    }

    /// Placeholder until the notebook service is wired in
    pub fn study_guide_url(&self, job_id: &str) -> Option<String> {
        if !self.enabled() {
            debug!(job_id, "notebook client not configured");
            return None;
        }
        Some(format!("{}/guides/{}", self.endpoint, job_id))
    }
}
