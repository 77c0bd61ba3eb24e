//! Production [`BrowserBackend`] over Chrome/Chromium.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, Tab};

use crate::browser::config::LaunchOptions;
use crate::browser::session::BrowserBackend;
use crate::error::{Error, Result};

/// Arguments required in restricted and containerized environments, where
/// Chrome runs as root without a usable /dev/shm or GPU.
const COMPAT_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu-sandbox",
    "--disable-software-rasterizer",
];

/// Drives Chrome over the DevTools protocol via `headless_chrome`.
///
/// The engine handle is the [`Browser`] process, the context handle is a
/// single [`Tab`] reused across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBackend;

impl BrowserBackend for ChromeBackend {
    type Engine = Browser;
    type Context = Arc<Tab>;

    fn launch(&self, options: &LaunchOptions) -> Result<Browser> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts
            .ignore_default_args
            .push(OsStr::new("--enable-automation"));
        launch_opts
            .args
            .push(OsStr::new("--disable-blink-features=AutomationControlled"));

        for arg in COMPAT_ARGS {
            launch_opts.args.push(OsStr::new(arg));
        }

        // The session persists across tasks; raise the idle timeout from the
        // 30 second default so Chrome does not shut down between them.
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.sandbox = false;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(ref path) = options.chrome_path {
            launch_opts.path = Some(path.clone());
        }

        if let Some(ref dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir.clone());
        }

        Browser::new(launch_opts).map_err(|e| Error::SessionInit(e.to_string()))
    }

    fn open_context(&self, engine: &Browser) -> Result<Arc<Tab>> {
        engine
            .new_tab()
            .map_err(|e| Error::SessionInit(format!("failed to open tab: {}", e)))
    }

    fn close_context(&self, context: &Arc<Tab>) -> Result<()> {
        context
            .close(true)
            .map_err(|e| Error::Browser(format!("failed to close tab: {}", e)))?;
        Ok(())
    }

    fn close_engine(&self, engine: &Browser) -> Result<()> {
        // Browser exposes no close method; shutting every tab ends the
        // process once the handle drops.
        let tabs = engine
            .get_tabs()
            .lock()
            .map_err(|e| Error::Browser(format!("failed to list tabs: {}", e)))?
            .clone();
        for tab in tabs {
            let _ = tab.close(false);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::session::{SessionManager, SessionStatus};

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_launch_and_close() {
        let options = LaunchOptions::new().headless(true);
        let mut manager = SessionManager::new(ChromeBackend, options);

        manager.ensure_ready().expect("failed to launch browser");
        assert_eq!(manager.status(), SessionStatus::Ready);

        let (_, tab) = manager.handles().expect("handles present");
        tab.navigate_to("about:blank").expect("navigation failed");

        manager.close();
        assert_eq!(manager.status(), SessionStatus::Closed);
    }

    #[test]
    #[ignore]
    fn test_ensure_ready_reuses_running_browser() {
        let options = LaunchOptions::new().headless(true);
        let mut manager = SessionManager::new(ChromeBackend, options);

        manager.ensure_ready().expect("failed to launch browser");
        let first = manager.handles().expect("handles present").1.clone();
        manager.ensure_ready().expect("second ensure_ready failed");
        let second = manager.handles().expect("handles present").1;

        assert!(Arc::ptr_eq(&first, second));
    }
}
