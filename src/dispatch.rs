//! Task orchestration: credential resolution, session readiness, agent
//! dispatch and the recovery policy around them.

use log::{info, warn};

use crate::agent::{TaskAgent, TaskOutcome};
use crate::browser::session::{BrowserBackend, SessionManager, SessionStatus};
use crate::catalog::ModelCatalog;
use crate::credentials::{CredentialStatus, CredentialStore};
use crate::error::{Error, Result};
use crate::llm::ClientFactory;

/// Entry point tying the catalog, credential store, session manager and the
/// injected model/agent capabilities together.
///
/// Recovery policy: task-level failures leave the browser session Ready for
/// the next attempt; handles are only discarded when the operator asks for
/// [`reset_session`](Self::reset_session) or
/// [`close_session`](Self::close_session).
pub struct TaskDispatcher<B: BrowserBackend> {
    catalog: ModelCatalog,
    credentials: CredentialStore,
    session: SessionManager<B>,
    clients: Box<dyn ClientFactory>,
    agent: Box<dyn TaskAgent<B>>,
}

impl<B: BrowserBackend> TaskDispatcher<B> {
    pub fn new(
        catalog: ModelCatalog,
        credentials: CredentialStore,
        session: SessionManager<B>,
        clients: Box<dyn ClientFactory>,
        agent: Box<dyn TaskAgent<B>>,
    ) -> Self {
        Self {
            catalog,
            credentials,
            session,
            clients,
            agent,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Execute one task against the given provider.
    ///
    /// The session is brought to Ready before the agent runs and stays Ready
    /// afterwards, whether the task succeeded or not.
    pub async fn run_task(&mut self, task: &str, provider_id: &str) -> Result<TaskOutcome> {
        let descriptor = self
            .catalog
            .get(provider_id)
            .ok_or_else(|| Error::UnknownProvider(provider_id.to_string()))?;

        let credential = self
            .credentials
            .resolve(descriptor)
            .ok_or_else(|| Error::MissingCredential(provider_id.to_string()))?;

        self.session.ensure_ready()?;

        let client = self.clients.build(descriptor, &credential);
        let (engine, context) = self
            .session
            .handles()
            .ok_or_else(|| Error::SessionInit("session not ready after init".to_string()))?;

        info!("dispatching task via {}", descriptor.provider_id);
        match self.agent.run(task, client.as_ref(), engine, context).await {
            Ok(outcome) => Ok(outcome),
            // Any collaborator failure during execution is task-level; the
            // session is deliberately left running.
            Err(Error::Task(reason)) => {
                warn!("task failed: {}", reason);
                Err(Error::Task(reason))
            }
            Err(other) => {
                warn!("task failed: {}", other);
                Err(Error::Task(other.to_string()))
            }
        }
    }

    /// Validate and persist a credential, probing the provider first.
    ///
    /// A failed probe persists nothing and carries the provider's message
    /// verbatim so the operator can decide whether to retry.
    pub async fn enroll(&self, provider_id: &str, secret: &str) -> Result<()> {
        let descriptor = self
            .catalog
            .get(provider_id)
            .ok_or_else(|| Error::UnknownProvider(provider_id.to_string()))?;

        let secret = secret.trim();
        CredentialStore::validate(secret)?;

        let client = self.clients.build(descriptor, secret);
        client
            .invoke(&descriptor.test_prompt)
            .await
            .map_err(|e| match e {
                Error::Provider(reason) => Error::ProbeFailed(reason),
                other => Error::ProbeFailed(other.to_string()),
            })?;

        self.credentials.store(provider_id, secret)
    }

    pub fn credential_status(&self) -> Vec<CredentialStatus> {
        self.credentials.list_status(&self.catalog)
    }

    pub fn remove_credential(&self, provider_id: &str) -> Result<()> {
        self.credentials.remove(provider_id)
    }

    /// Tear the browser session down and start a fresh one.
    pub fn reset_session(&mut self) -> Result<()> {
        self.session.reset()
    }

    /// Close the browser session. Safe to call on every exit path.
    pub fn close_session(&mut self) {
        self.session.close();
    }
}
