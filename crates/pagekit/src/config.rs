//! Session configuration.
//!
//! All timing budgets used by the page objects live here so a slow CI
//! machine can stretch them without code changes. Loadable from YAML or JSON;
//! missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{PagekitError, PagekitResult};
use crate::scroll::{DEFAULT_MAX_SCROLL_PAGES, DEFAULT_PAGE_UP_BUDGET, DEFAULT_SCROLL_SETTLE_MS};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Timing budgets and locator selection for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Application release whose built-in locator table is used
    pub locator_version: String,
    /// Default budget for displayed/exists waits
    pub wait_timeout_ms: u64,
    /// Interval between predicate evaluations
    pub poll_interval_ms: u64,
    /// Pause after clicking a menu item, before probing for a submenu
    pub select_settle_ms: u64,
    /// Pause after each Page Down while seeking through a list
    pub scroll_settle_ms: u64,
    /// Budget for a menu's item count to stop changing
    pub menu_stabilize_ms: u64,
    /// Budget for each wait while entering a webview frame
    pub frame_timeout_ms: u64,
    /// Page Up presses allowed while waiting for the first row
    pub page_up_budget: u32,
    /// Page Down presses allowed before a seek gives up
    pub max_scroll_pages: u32,
    /// Window title marking a detached virtual-document window
    pub virtual_document_title: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locator_version: "1.61.0".to_string(),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            select_settle_ms: 500,
            scroll_settle_ms: DEFAULT_SCROLL_SETTLE_MS,
            menu_stabilize_ms: 1_000,
            frame_timeout_ms: 5_000,
            page_up_budget: DEFAULT_PAGE_UP_BUDGET,
            max_scroll_pages: DEFAULT_MAX_SCROLL_PAGES,
            virtual_document_title: "Virtual Document".to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the locator table version
    #[must_use]
    pub fn with_locator_version(mut self, version: impl Into<String>) -> Self {
        self.locator_version = version.into();
        self
    }

    /// Set the default wait budget
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the submenu settle delay
    #[must_use]
    pub const fn with_select_settle(mut self, settle_ms: u64) -> Self {
        self.select_settle_ms = settle_ms;
        self
    }

    /// Set the per-page scroll settle delay
    #[must_use]
    pub const fn with_scroll_settle(mut self, settle_ms: u64) -> Self {
        self.scroll_settle_ms = settle_ms;
        self
    }

    /// Set the menu count-convergence budget
    #[must_use]
    pub const fn with_menu_stabilize(mut self, budget_ms: u64) -> Self {
        self.menu_stabilize_ms = budget_ms;
        self
    }

    /// Set the per-step frame entry budget
    #[must_use]
    pub const fn with_frame_timeout(mut self, timeout_ms: u64) -> Self {
        self.frame_timeout_ms = timeout_ms;
        self
    }

    /// Set both scroll budgets
    #[must_use]
    pub const fn with_scroll_budgets(mut self, page_up: u32, page_down: u32) -> Self {
        self.page_up_budget = page_up;
        self.max_scroll_pages = page_down;
        self
    }

    /// Set the virtual-document window title marker
    #[must_use]
    pub fn with_virtual_document_title(mut self, title: impl Into<String>) -> Self {
        self.virtual_document_title = title.into();
        self
    }

    /// Parse from YAML
    pub fn from_yaml(source: &str) -> PagekitResult<Self> {
        let config: Self = serde_yaml_ng::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON
    pub fn from_json(source: &str) -> PagekitResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> PagekitResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&source),
            _ => Self::from_yaml(&source),
        }
    }

    /// Reject values the polling loops cannot work with
    pub fn validate(&self) -> PagekitResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PagekitError::InvalidConfig {
                message: "poll_interval_ms cannot be zero".to_string(),
            });
        }
        if self.locator_version.is_empty() {
            return Err(PagekitError::InvalidConfig {
                message: "locator_version not specified".to_string(),
            });
        }
        Ok(())
    }

    /// Wait options for a budget, using the configured poll interval
    #[must_use]
    pub const fn wait_options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions {
            timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
            reverse: false,
        }
    }

    /// Wait options with the default wait budget
    #[must_use]
    pub const fn default_wait(&self) -> WaitOptions {
        self.wait_options(self.wait_timeout_ms)
    }
}
