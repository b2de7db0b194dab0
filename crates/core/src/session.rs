//! # Agent Session Contract
//!
//! The language-model agent runtime is an external collaborator. The
//! pipeline consumes it through this minimal capability contract:
//! connect, send a task with options, stream back role-tagged messages,
//! close. Every caller pairs connect with close on all exit paths.
//!
//! The message sequence of a session is finite and not restartable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to agent runtime: {0}")]
    Connect(String),
    #[error("agent transport error: {0}")]
    Transport(String),
    #[error("session already closed")]
    Closed,
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One block of message content
#[derive(Debug, Clone)]
pub enum ContentBlock {
    Text(String),
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
}

/// A role-tagged message streamed from an agent session
#[derive(Debug, Clone)]
pub struct AgentMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl AgentMessage {
    /// Build an assistant message from plain text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text(t) = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(t);
            }
        }
        out
    }
}

/// How much autonomy the agent runtime grants the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionMode {
    /// Allow autonomous tool use
    #[default]
    AcceptEdits,
    Ask,
    Reject,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionMode::AcceptEdits => "acceptEdits",
            PermissionMode::Ask => "ask",
            PermissionMode::Reject => "reject",
        }
    }
}

/// Options for one task dispatch
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub system_prompt: String,
    pub permission_mode: PermissionMode,
    pub model: String,
}

impl SessionOptions {
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            permission_mode: PermissionMode::default(),
            model: model.into(),
        }
    }
}

/// One bounded interaction with a tool-using agent
#[async_trait]
pub trait AgentSession: Send {
    /// Dispatch the task text with the given options
    async fn send(&mut self, task: &str, options: &SessionOptions) -> Result<(), SessionError>;

    /// Next streamed message; `None` once the stream is exhausted
    async fn next_message(&mut self) -> Result<Option<AgentMessage>, SessionError>;

    /// Tear the session down. Idempotent.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens agent sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn AgentSession>, SessionError>;
}

/// Factory used when no agent runtime is wired in.
///
/// Every connect fails, which drives the pipeline onto its fallback
/// tiers: the Analyzer returns its mock analysis, the Curator falls
/// through to the search API and static resources, and the Judge keeps
/// candidates fail-open.
#[derive(Debug, Default)]
pub struct OfflineSessions;

#[async_trait]
impl SessionFactory for OfflineSessions {
    async fn connect(&self) -> Result<Box<dyn AgentSession>, SessionError> {
        Err(SessionError::Connect(
            "no agent runtime configured".to_string(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod script {
    //! Scripted sessions for unit tests: each connect pops the next
    //! prepared message script and replays it as the assistant stream.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub(crate) struct ScriptedSessions {
        scripts: Mutex<VecDeque<Vec<AgentMessage>>>,
        connects: AtomicUsize,
    }

    impl ScriptedSessions {
        pub(crate) fn new(scripts: Vec<Vec<AgentMessage>>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                connects: AtomicUsize::new(0),
            }
        }

        /// Single session replaying assistant text messages
        pub(crate) fn replying(texts: Vec<&str>) -> Self {
            Self::new(vec![texts.into_iter().map(AgentMessage::assistant).collect()])
        }

        pub(crate) fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionFactory for ScriptedSessions {
        async fn connect(&self) -> Result<Box<dyn AgentSession>, SessionError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Ok(Box::new(ScriptedSession {
                messages: script.into(),
                sent: false,
                closed: false,
            }))
        }
    }

    pub(crate) struct ScriptedSession {
        messages: VecDeque<AgentMessage>,
        sent: bool,
        closed: bool,
    }

    #[async_trait]
    impl AgentSession for ScriptedSession {
        async fn send(&mut self, _task: &str, _options: &SessionOptions) -> Result<(), SessionError> {
            if self.closed {
                return Err(SessionError::Closed);
            }
            self.sent = true;
            Ok(())
        }

        async fn next_message(&mut self) -> Result<Option<AgentMessage>, SessionError> {
            if self.closed {
                return Err(SessionError::Closed);
            }
            Ok(self.messages.pop_front())
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            self.closed = true;
            Ok(())
        }
    }

    /// Factory whose sessions fail mid-stream after `send` succeeds
    pub(crate) struct BrokenStreamSessions;

    #[async_trait]
    impl SessionFactory for BrokenStreamSessions {
        async fn connect(&self) -> Result<Box<dyn AgentSession>, SessionError> {
            Ok(Box::new(BrokenStreamSession))
        }
    }

    struct BrokenStreamSession;

    #[async_trait]
    impl AgentSession for BrokenStreamSession {
        async fn send(&mut self, _task: &str, _options: &SessionOptions) -> Result<(), SessionError> {
            Ok(())
        }

        async fn next_message(&mut self) -> Result<Option<AgentMessage>, SessionError> {
            Err(SessionError::Transport("stream dropped".to_string()))
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            Ok(())
        }
    }
}
