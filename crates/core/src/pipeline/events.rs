//! # Pipeline Events
//!
//! Observability-only lifecycle events. Emission is best-effort over an
//! optional channel: a missing or closed receiver never affects a job's
//! outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    JobStarted,
    AgentStarted,
    AgentCompleted,
    AgentFailed,
    CacheHit,
    JobCompleted,
    JobFailed,
}

/// One lifecycle event of an analysis job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Which part of the pipeline produced this ("analyzer", "curator",
    /// "judge", or "orchestrator" for job-level events)
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl PipelineEvent {
    pub fn new(kind: EventKind, agent: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            agent: agent.into(),
            data,
        }
    }
}

/// Best-effort event emitter
#[derive(Clone, Default)]
pub struct EventBus {
    tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl EventBus {
    /// Bus with a live subscriber
    pub fn new(tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Bus that drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, kind: EventKind, agent: &str, data: Option<serde_json::Value>) {
        let event = PipelineEvent::new(kind, agent, data);
        debug!(kind = ?event.kind, agent = %event.agent, "pipeline event");
        if let Some(tx) = &self.tx {
            // Receiver gone is not an error worth surfacing
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_bus_is_silent() {
        let bus = EventBus::disabled();
        bus.emit(EventKind::JobStarted, "orchestrator", None);
    }

    #[tokio::test]
    async fn test_events_reach_subscriber() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bus = EventBus::new(tx);

        bus.emit(EventKind::JobStarted, "orchestrator", None);
        bus.emit(
            EventKind::AgentCompleted,
            "analyzer",
            Some(serde_json::json!({"skill_gaps": 2})),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::JobStarted);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.agent, "analyzer");
        assert_eq!(second.data.unwrap()["skill_gaps"], 2);
    }

    #[test]
    fn test_emit_survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let bus = EventBus::new(tx);
        bus.emit(EventKind::JobFailed, "orchestrator", None);
    }
}
