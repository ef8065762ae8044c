//! Automation session: one driver, one locator table, one anchor window.
//!
//! Page objects share a session through an `Arc`. The anchor window slot
//! belongs to the session, so two sessions driving two application
//! instances never see each other's anchor.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::SessionConfig;
use crate::driver::{UiDriver, WindowHandle};
use crate::locator::{Locator, LocatorTable};
use crate::result::{PagekitError, PagekitResult};

/// Shared state behind every page object of one automation session
pub struct Session<D> {
    driver: D,
    locators: LocatorTable,
    config: SessionConfig,
    anchor: OnceCell<WindowHandle>,
}

impl<D> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("locators", &self.locators.version)
            .field("config", &self.config)
            .field("anchor", &self.anchor.get())
            .finish_non_exhaustive()
    }
}

impl<D: UiDriver> Session<D> {
    /// Session with default config and the matching built-in locator table
    pub fn new(driver: D) -> PagekitResult<Arc<Self>> {
        Self::with_config(driver, SessionConfig::default())
    }

    /// Session with explicit config; the locator table is the built-in one
    /// for `config.locator_version`
    pub fn with_config(driver: D, config: SessionConfig) -> PagekitResult<Arc<Self>> {
        config.validate()?;
        let locators = LocatorTable::builtin(&config.locator_version)?;
        Ok(Self::with_locators(driver, locators, config))
    }

    /// Session with an externally loaded locator table
    #[must_use]
    pub fn with_locators(driver: D, locators: LocatorTable, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            driver,
            locators,
            config,
            anchor: OnceCell::new(),
        })
    }

    /// The remote driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The locator table in use
    pub const fn locators(&self) -> &LocatorTable {
        &self.locators
    }

    /// Timing budgets
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Locator for `component.key`
    pub fn locator(&self, component: &str, key: &str) -> PagekitResult<Locator> {
        self.locators.locator(component, key)
    }

    /// The recorded anchor window, if any
    pub fn anchor(&self) -> Option<&WindowHandle> {
        self.anchor.get()
    }

    /// The anchor window, recording the current window on first use.
    ///
    /// Later calls return the first recorded handle even if focus has moved.
    pub async fn capture_anchor(&self) -> PagekitResult<&WindowHandle> {
        self.anchor
            .get_or_try_init(|| async {
                let handle = self.driver.window_handle().await?;
                debug!(anchor = %handle, "anchor window recorded");
                Ok::<_, PagekitError>(handle)
            })
            .await
    }
}
