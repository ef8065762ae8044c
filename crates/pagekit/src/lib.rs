//! Pagekit: Page Objects for Editor Workbench UIs
//!
//! Typed page objects for an Electron/VS Code style workbench, driven over a
//! WebDriver-style protocol. Page objects hold lazy element handles that are
//! re-resolved on every use, so a virtualized list re-rendering underneath
//! a test never leaves it holding a stale reference.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PAGEKIT Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page       │    │ Session    │    │ UiDriver   │            │
//! │   │ Objects    │───►│ (locators, │───►│ (mock or   │            │
//! │   │ (pages::*) │    │  config)   │    │  WebDriver)│            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                                                       │
//! │         ▼                                                       │
//! │   collection · scroll · frame · wait                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagekit::prelude::*;
//!
//! let session = Session::new(driver)?;
//! let menu = ContextMenu::new(session)?.wait().await?;
//! if let Some(item) = menu.item("Copy").await? {
//!     item.select().await?;
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Collection reading over list rows
pub mod collection;

/// Session configuration
pub mod config;

mod driver;

/// Lazy element handles
pub mod element;

/// Webview frame switching
pub mod frame;

mod locator;

/// Mock driver for unit testing
pub mod mock;

mod page_object;

pub mod pages;

mod result;

/// Scroll-seek over virtualized lists
pub mod scroll;

mod session;

/// Logging setup
pub mod telemetry;

/// Wait mechanisms
pub mod wait;

/// WebDriver adapter (feature `webdriver`)
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use collection::{CollectionReader, RowFilter};
pub use config::SessionConfig;
pub use driver::{FrameTarget, Key, UiDriver, WindowHandle};
pub use element::{ElementRef, Step};
pub use frame::{FrameState, FrameSwitcher};
pub use locator::{Locator, LocatorTable, Selector};
pub use mock::{MockDom, MockDriver, MockNode, NodeId};
pub use page_object::{PageBase, PageObject};
pub use result::{PagekitError, PagekitResult};
pub use scroll::ScrollSeek;
pub use session::Session;
pub use wait::{
    poll_until, settle, wait_for_displayed, wait_for_exists, wait_for_stable_count, wait_until,
    Probe, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverAdapter;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::pages::{
        ContentAssist, ContentAssistItem, ContextMenu, ContextMenuItem, CustomTreeItem,
        CustomTreeSection, Menu, MenuItem, SideBarView, ViewContent, ViewSection, ViewTitlePart,
        WebView,
    };
    pub use super::{
        ElementRef, FrameState, Key, Locator, LocatorTable, PageBase, PageObject, PagekitError,
        PagekitResult, Session, SessionConfig, UiDriver, WaitOptions,
    };
}
