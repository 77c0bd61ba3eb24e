//! Lifecycle management for the persistent browser session.
//!
//! The browser engine is expensive to start, so one engine and one context
//! are kept alive across tasks and only torn down on explicit request or
//! shutdown. [`SessionManager`] owns that lifecycle as a small state
//! machine; the engine itself is reached through the injected
//! [`BrowserBackend`] capability so the manager can be exercised without a
//! real browser.

use log::warn;

use crate::browser::config::LaunchOptions;
use crate::error::Result;

/// Capability consumed by [`SessionManager`] to drive a browser engine.
pub trait BrowserBackend {
    /// Handle to a running browser engine process
    type Engine: Send + Sync;
    /// Handle to one browsing context within the engine
    type Context: Send + Sync;

    fn launch(&self, options: &LaunchOptions) -> Result<Self::Engine>;
    fn open_context(&self, engine: &Self::Engine) -> Result<Self::Context>;
    fn close_context(&self, context: &Self::Context) -> Result<()>;
    fn close_engine(&self, engine: &Self::Engine) -> Result<()>;
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    Closed,
}

enum State<B: BrowserBackend> {
    Uninitialized,
    Ready {
        engine: B::Engine,
        context: B::Context,
    },
    Closed,
}

/// Owns at most one live engine handle and one context handle.
pub struct SessionManager<B: BrowserBackend> {
    backend: B,
    options: LaunchOptions,
    state: State<B>,
}

impl<B: BrowserBackend> SessionManager<B> {
    pub fn new(backend: B, options: LaunchOptions) -> Self {
        Self {
            backend,
            options,
            state: State::Uninitialized,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            State::Uninitialized => SessionStatus::Uninitialized,
            State::Ready { .. } => SessionStatus::Ready,
            State::Closed => SessionStatus::Closed,
        }
    }

    /// Engine and context handles, when the session is ready.
    pub fn handles(&self) -> Option<(&B::Engine, &B::Context)> {
        match &self.state {
            State::Ready { engine, context } => Some((engine, context)),
            _ => None,
        }
    }

    /// Bring the session to Ready, reusing the live handles if present.
    ///
    /// A failure while constructing either handle rolls back to the previous
    /// state; the session is never left partially ready.
    pub fn ensure_ready(&mut self) -> Result<()> {
        if matches!(self.state, State::Ready { .. }) {
            return Ok(());
        }

        let engine = self.backend.launch(&self.options)?;
        let context = match self.backend.open_context(&engine) {
            Ok(context) => context,
            Err(e) => {
                if let Err(close_err) = self.backend.close_engine(&engine) {
                    warn!("failed to close engine after context failure: {}", close_err);
                }
                return Err(e);
            }
        };

        self.state = State::Ready { engine, context };
        Ok(())
    }

    /// Tear down unconditionally, then start fresh.
    pub fn reset(&mut self) -> Result<()> {
        self.close();
        self.ensure_ready()
    }

    /// Close the context and engine if live.
    ///
    /// Collaborator errors are downgraded to warnings: this runs on every
    /// shutdown path and must not itself fail. Closing an already-closed
    /// session is a no-op.
    pub fn close(&mut self) {
        if let State::Ready { engine, context } = std::mem::replace(&mut self.state, State::Closed)
        {
            if let Err(e) = self.backend.close_context(&context) {
                warn!("failed to close browser context: {}", e);
            }
            if let Err(e) = self.backend.close_engine(&engine) {
                warn!("failed to close browser engine: {}", e);
            }
        }
    }
}

impl<B: BrowserBackend> Drop for SessionManager<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Stats {
        launches: Cell<u64>,
        engines_closed: Cell<u64>,
        contexts_closed: Cell<u64>,
        fail_launch: Cell<bool>,
        fail_context: Cell<bool>,
    }

    #[derive(Clone, Default)]
    struct FakeBackend {
        stats: Rc<Stats>,
    }

    impl BrowserBackend for FakeBackend {
        type Engine = u64;
        type Context = u64;

        fn launch(&self, _options: &LaunchOptions) -> Result<u64> {
            if self.stats.fail_launch.get() {
                return Err(Error::SessionInit("launch refused".to_string()));
            }
            let id = self.stats.launches.get() + 1;
            self.stats.launches.set(id);
            Ok(id)
        }

        fn open_context(&self, engine: &u64) -> Result<u64> {
            if self.stats.fail_context.get() {
                return Err(Error::SessionInit("context refused".to_string()));
            }
            Ok(*engine)
        }

        fn close_context(&self, _context: &u64) -> Result<()> {
            self.stats.contexts_closed.set(self.stats.contexts_closed.get() + 1);
            Ok(())
        }

        fn close_engine(&self, _engine: &u64) -> Result<()> {
            self.stats.engines_closed.set(self.stats.engines_closed.get() + 1);
            Ok(())
        }
    }

    fn manager() -> (SessionManager<FakeBackend>, Rc<Stats>) {
        let backend = FakeBackend::default();
        let stats = backend.stats.clone();
        (SessionManager::new(backend, LaunchOptions::default()), stats)
    }

    #[test]
    fn test_ensure_ready_twice_reuses_engine() {
        let (mut manager, stats) = manager();

        manager.ensure_ready().unwrap();
        let first = *manager.handles().unwrap().0;
        manager.ensure_ready().unwrap();
        let second = *manager.handles().unwrap().0;

        assert_eq!(first, second);
        assert_eq!(stats.launches.get(), 1);
        assert_eq!(manager.status(), SessionStatus::Ready);
    }

    #[test]
    fn test_reset_replaces_engine() {
        let (mut manager, stats) = manager();

        manager.ensure_ready().unwrap();
        let first = *manager.handles().unwrap().0;
        manager.reset().unwrap();
        let second = *manager.handles().unwrap().0;

        assert_ne!(first, second);
        assert_eq!(stats.launches.get(), 2);
        assert_eq!(stats.engines_closed.get(), 1);
        assert_eq!(stats.contexts_closed.get(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut manager, stats) = manager();

        manager.ensure_ready().unwrap();
        manager.close();
        manager.close();

        assert_eq!(manager.status(), SessionStatus::Closed);
        assert_eq!(stats.engines_closed.get(), 1);
        assert_eq!(stats.contexts_closed.get(), 1);
        assert!(manager.handles().is_none());
    }

    #[test]
    fn test_close_without_init_transitions_to_closed() {
        let (mut manager, stats) = manager();

        manager.close();

        assert_eq!(manager.status(), SessionStatus::Closed);
        assert_eq!(stats.engines_closed.get(), 0);
    }

    #[test]
    fn test_reopen_after_close() {
        let (mut manager, stats) = manager();

        manager.ensure_ready().unwrap();
        manager.close();
        manager.ensure_ready().unwrap();

        assert_eq!(manager.status(), SessionStatus::Ready);
        assert_eq!(stats.launches.get(), 2);
    }

    #[test]
    fn test_launch_failure_leaves_state_unchanged() {
        let (mut manager, stats) = manager();
        stats.fail_launch.set(true);

        let err = manager.ensure_ready().unwrap_err();
        assert!(matches!(err, Error::SessionInit(_)));
        assert_eq!(manager.status(), SessionStatus::Uninitialized);
    }

    #[test]
    fn test_context_failure_closes_engine_and_keeps_state() {
        let (mut manager, stats) = manager();
        stats.fail_context.set(true);

        let err = manager.ensure_ready().unwrap_err();
        assert!(matches!(err, Error::SessionInit(_)));
        assert_eq!(manager.status(), SessionStatus::Uninitialized);
        assert_eq!(stats.launches.get(), 1);
        assert_eq!(stats.engines_closed.get(), 1);
        assert_eq!(stats.contexts_closed.get(), 0);
    }

    #[test]
    fn test_drop_closes_live_session() {
        let (mut manager, stats) = manager();
        manager.ensure_ready().unwrap();

        drop(manager);

        assert_eq!(stats.engines_closed.get(), 1);
        assert_eq!(stats.contexts_closed.get(), 1);
    }
}
