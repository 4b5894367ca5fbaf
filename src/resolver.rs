//! Redirect resolution through a headless Chrome instance.
//!
//! Some listing links bounce through JavaScript redirects that a plain HTTP
//! client never follows. The resolver loads the link in a throwaway browser,
//! lets the page settle, and reads back the address bar. It is strictly
//! best-effort: any failure hands back the original URL.

use crate::error::ResolveError;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Something that can settle a URL through client-side redirects.
pub trait ResolveRedirect {
    /// Final URL, or `url` itself when resolution fails.
    async fn resolve(&self, url: &str) -> String;
}

/// [`ResolveRedirect`] that launches one Chrome process per call.
#[derive(Debug, Clone)]
pub struct ChromeResolver {
    page_load_timeout: Duration,
    settle: Duration,
    /// Browser binary; `None` lets headless_chrome locate one.
    executable: Option<PathBuf>,
}

impl ChromeResolver {
    pub fn new(page_load_timeout: Duration, settle: Duration) -> Self {
        Self {
            page_load_timeout,
            settle,
            executable: None,
        }
    }

    /// Launch a specific Chrome/Chromium binary instead of auto-detecting one.
    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }

    /// Resolve, reporting why it failed instead of swallowing the error.
    pub async fn try_resolve(&self, url: &str) -> Result<String, ResolveError> {
        let url = url.to_string();
        let resolver = self.clone();
        tokio::task::spawn_blocking(move || resolver.resolve_blocking(&url)).await?
    }

    fn resolve_blocking(&self, url: &str) -> Result<String, ResolveError> {
        let navigation = |reason: String| ResolveError::Navigation {
            url: url.to_string(),
            reason,
        };

        let session = BrowserSession::launch(self.page_load_timeout, self.executable.clone())?;
        debug!(%url, "Opening in headless browser");
        session.tab.navigate_to(url).map_err(|e| navigation(e.to_string()))?;
        session
            .tab
            .wait_until_navigated()
            .map_err(|e| navigation(e.to_string()))?;

        // JavaScript redirects fire after the load event.
        std::thread::sleep(self.settle);
        Ok(session.tab.get_url())
    }
}

impl ResolveRedirect for ChromeResolver {
    #[instrument(level = "info", skip(self))]
    async fn resolve(&self, url: &str) -> String {
        match self.try_resolve(url).await {
            Ok(final_url) => {
                info!(%final_url, changed = final_url != url, "Resolved final URL");
                final_url
            }
            Err(e) => {
                warn!(error = %e, "Redirect resolution failed; keeping original URL");
                url.to_string()
            }
        }
    }
}

/// A launched browser with one open tab.
///
/// Dropping the session closes the tab and then the browser process on
/// every exit path. Teardown errors are logged and discarded so they never
/// replace the outcome of the resolution itself.
struct BrowserSession {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl BrowserSession {
    fn launch(page_load_timeout: Duration, executable: Option<PathBuf>) -> Result<Self, ResolveError> {
        let args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-extensions"),
            OsStr::new("--ignore-certificate-errors"),
            OsStr::new("--ignore-ssl-errors"),
        ];
        let browser = Browser::new(LaunchOptions {
            headless: true,
            window_size: Some((1280, 900)),
            args,
            path: executable,
            ..Default::default()
        })
        .map_err(|e| ResolveError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ResolveError::Launch(e.to_string()))?;
        tab.set_default_timeout(page_load_timeout);

        Ok(Self {
            tab,
            _browser: browser,
        })
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            debug!(error = %e, "Ignoring tab close failure during teardown");
        }
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Maps URLs to their "final" URL; unknown URLs resolve to themselves.
    #[derive(Default)]
    pub struct StubResolver {
        redirects: HashMap<String, String>,
        pub calls: RefCell<Vec<String>>,
    }

    impl StubResolver {
        pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }
    }

    impl ResolveRedirect for StubResolver {
        async fn resolve(&self, url: &str) -> String {
            self.calls.borrow_mut().push(url.to_string());
            self.redirects
                .get(url)
                .cloned()
                .unwrap_or_else(|| url.to_string())
        }
    }
}
