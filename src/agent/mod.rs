//! Agent capability consumed by the dispatcher.
//!
//! An agent receives the task text, a model client and the live browser
//! handles, and reports a [`TaskOutcome`]. [`PageAgent`] is the built-in
//! implementation; richer automation engines plug in through [`TaskAgent`].

pub mod page;

pub use page::PageAgent;

use async_trait::async_trait;

use crate::browser::session::BrowserBackend;
use crate::error::Result;
use crate::llm::ModelClient;

/// Result of one completed task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Operator-facing result text
    pub summary: String,
    /// URL the session's context ended on, when known
    pub final_url: Option<String>,
}

/// Executes one natural-language task against a live browser session.
#[async_trait]
pub trait TaskAgent<B: BrowserBackend>: Send + Sync {
    async fn run(
        &self,
        task: &str,
        model: &dyn ModelClient,
        engine: &B::Engine,
        context: &B::Context,
    ) -> Result<TaskOutcome>;
}
