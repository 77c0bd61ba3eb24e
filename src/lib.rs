//! # webpilot
//!
//! Dispatch natural-language tasks to an LLM-driven browser agent from an
//! interactive CLI, with layered credential storage and a persistent
//! browser session reused across tasks.
//!
//! ## Features
//!
//! - **Credential store**: environment variables take precedence over a
//!   per-user JSON credential file; writes are atomic and malformed files
//!   read as empty
//! - **Session management**: one Chrome/Chromium engine and one browsing
//!   context kept alive between tasks, torn down exactly once on shutdown
//! - **Task dispatch**: resolve credential, ensure the session is ready,
//!   run the agent; task failures never tear the session down
//! - **Capability seams**: the browser backend, the model client and the
//!   agent are traits, so front ends and tests can substitute their own
//!
//! ## Usage
//!
//! ```rust,no_run
//! use webpilot::{
//!     ChromeBackend, CredentialStore, LaunchOptions, ModelCatalog, PageAgent,
//!     ProviderClientFactory, SessionManager, TaskDispatcher,
//! };
//!
//! # async fn run() -> webpilot::Result<()> {
//! let session = SessionManager::new(ChromeBackend, LaunchOptions::default());
//! let mut dispatcher = TaskDispatcher::new(
//!     ModelCatalog::builtin(),
//!     CredentialStore::open_default()?,
//!     session,
//!     Box::new(ProviderClientFactory),
//!     Box::new(PageAgent),
//! );
//!
//! let outcome = dispatcher.run_task("find the weather in Oslo", "gemini").await?;
//! println!("{}", outcome.summary);
//! dispatcher.close_session();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`catalog`]: static registry of provider/model descriptors
//! - [`credentials`]: layered credential storage and resolution
//! - [`browser`]: session lifecycle management and the Chrome backend
//! - [`llm`]: model-client capability and the Gemini implementation
//! - [`agent`]: agent capability and the built-in single-page agent
//! - [`dispatch`]: the task dispatcher tying everything together
//! - [`error`]: error types and result alias

pub mod agent;
pub mod browser;
pub mod catalog;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod llm;

pub use agent::{PageAgent, TaskAgent, TaskOutcome};
pub use browser::{BrowserBackend, ChromeBackend, LaunchOptions, SessionManager, SessionStatus};
pub use catalog::{ModelCatalog, ModelDescriptor, ProviderKind};
pub use credentials::{CredentialStatus, CredentialStore};
pub use dispatch::TaskDispatcher;
pub use error::{Error, Result};
pub use llm::{ClientFactory, GeminiClient, ModelClient, ProviderClientFactory};
