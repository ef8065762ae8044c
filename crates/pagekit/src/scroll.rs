//! Scroll-Seek Search
//!
//! Finds a named item in a virtualized list, where only a window of rows is
//! rendered at any time. The seek first pages up until the list's first row
//! is rendered, then reads the visible window, compares labels, and pages
//! down until a row carrying the last-element marker has been seen.
//!
//! Rewinding to the first row on every call makes repeated seeks on a static
//! list return the same result no matter where the previous seek left the
//! scroll position.

use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::driver::{Key, UiDriver};
use crate::element::ElementRef;
use crate::page_object::PageObject;
use crate::pages::menu::{Menu, MenuItem};
use crate::result::PagekitResult;
use crate::wait::settle;

/// Pause after each Page Down (100ms)
pub const DEFAULT_SCROLL_SETTLE_MS: u64 = 100;

/// Page Up presses allowed while waiting for the first row
pub const DEFAULT_PAGE_UP_BUDGET: u32 = 50;

/// Page Down presses allowed before giving up
pub const DEFAULT_MAX_SCROLL_PAGES: u32 = 500;

/// Value of the last-element marker attribute on the final row
const LAST_ELEMENT_VALUE: &str = "true";

/// Paging search over one scrollable list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSeek {
    scrollable: ElementRef,
    first_row: ElementRef,
    last_element_attr: String,
    settle_ms: u64,
    page_up_budget: u32,
    max_pages: u32,
}

impl ScrollSeek {
    /// Seek over `scrollable`, rewinding until `first_row` is rendered
    #[must_use]
    pub fn new(
        scrollable: ElementRef,
        first_row: ElementRef,
        last_element_attr: impl Into<String>,
    ) -> Self {
        Self {
            scrollable,
            first_row,
            last_element_attr: last_element_attr.into(),
            settle_ms: DEFAULT_SCROLL_SETTLE_MS,
            page_up_budget: DEFAULT_PAGE_UP_BUDGET,
            max_pages: DEFAULT_MAX_SCROLL_PAGES,
        }
    }

    /// Take settle delay and budgets from a session config
    #[must_use]
    pub const fn configured(mut self, config: &SessionConfig) -> Self {
        self.settle_ms = config.scroll_settle_ms;
        self.page_up_budget = config.page_up_budget;
        self.max_pages = config.max_scroll_pages;
        self
    }

    /// Set the pause after each Page Down
    #[must_use]
    pub const fn with_settle(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Set the Page Up and Page Down budgets
    #[must_use]
    pub const fn with_budgets(mut self, page_up: u32, max_pages: u32) -> Self {
        self.page_up_budget = page_up;
        self.max_pages = max_pages;
        self
    }

    /// Page up until the first row is rendered.
    ///
    /// Returns `false` when the budget runs out first.
    pub async fn rewind<D: UiDriver>(&self, driver: &D) -> PagekitResult<bool> {
        let mut presses = 0;
        while !self.first_row.exists(driver).await? {
            if presses >= self.page_up_budget {
                warn!(
                    scrollable = %self.scrollable,
                    presses,
                    "first row never rendered, giving up"
                );
                return Ok(false);
            }
            self.scrollable.send_keys(driver, &[Key::PageUp]).await?;
            presses += 1;
        }
        trace!(presses, "first row rendered");
        Ok(true)
    }

    /// First item of `menu` labelled exactly `target`, or `None` once the
    /// marked last row has been read without a match.
    ///
    /// A list that never finishes loading or is gone altogether also yields
    /// `None`; other driver errors are returned.
    pub async fn seek<D, M>(&self, menu: &M, target: &str) -> PagekitResult<Option<M::Item>>
    where
        D: UiDriver,
        M: Menu<D>,
    {
        match self.seek_pages(menu, target).await {
            Err(err) if err.is_timeout() || err.is_not_found() => {
                debug!(target, error = %err, "seek abandoned");
                Ok(None)
            }
            found => found,
        }
    }

    async fn seek_pages<D, M>(&self, menu: &M, target: &str) -> PagekitResult<Option<M::Item>>
    where
        D: UiDriver,
        M: Menu<D>,
    {
        let driver = menu.base().driver();
        if !self.rewind(driver).await? {
            return Ok(None);
        }

        let mut pages = 0;
        loop {
            let mut reached_end = false;
            for mut item in menu.items().await? {
                if item.read_label().await? == target {
                    debug!(target, pages, "seek matched");
                    return Ok(Some(item));
                }
                let marker = item.elem().attribute(driver, &self.last_element_attr).await?;
                reached_end = reached_end || marker.as_deref() == Some(LAST_ELEMENT_VALUE);
            }
            if reached_end {
                debug!(target, pages, "seek reached last row without a match");
                return Ok(None);
            }
            if pages >= self.max_pages {
                warn!(target, pages, "page budget exhausted before the last row");
                return Ok(None);
            }
            self.scrollable.send_keys(driver, &[Key::PageDown]).await?;
            pages += 1;
            settle(self.settle_ms).await;
        }
    }
}
