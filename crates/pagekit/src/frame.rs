//! Frame/Context Switcher
//!
//! Moves automation focus into a webview's embedded document and back.
//!
//! ```text
//! Outside --switch_to_frame--> Inside --switch_back--> Outside
//! ```
//!
//! The window to come back to (the anchor) is recorded in the [`Session`]
//! on the first transition and never overwritten, so a round trip leaves
//! the next `switch_to_frame` starting from the same place.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::driver::{FrameTarget, UiDriver};
use crate::element::ElementRef;
use crate::locator::Locator;
use crate::result::{PagekitError, PagekitResult};
use crate::session::Session;
use crate::wait::{poll_until, wait_for_exists, Probe};

/// Attribute on the editor's webview placeholder naming the container id
pub const FLOW_TO_ATTRIBUTE: &str = "aria-flowto";

/// Where automation focus currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Top-level workbench document
    #[default]
    Outside,
    /// Inside the webview's embedded document
    Inside,
}

/// Enters and leaves the embedded document of one webview
pub struct FrameSwitcher<D> {
    session: Arc<Session<D>>,
    view_root: ElementRef,
    state: FrameState,
}

impl<D> fmt::Debug for FrameSwitcher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSwitcher")
            .field("view_root", &self.view_root.to_string())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<D: UiDriver> FrameSwitcher<D> {
    /// Switcher for the webview hosted under `view_root`
    #[must_use]
    pub const fn new(session: Arc<Session<D>>, view_root: ElementRef) -> Self {
        Self {
            session,
            view_root,
            state: FrameState::Outside,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Enter the webview's innermost frame.
    ///
    /// A window whose title carries the virtual-document marker is entered
    /// directly at its first frame. Otherwise the webview is reached from
    /// the anchor window through its container and two nested frames, each
    /// step bounded by the frame budget. On failure focus is returned to the
    /// anchor window and the state stays [`FrameState::Outside`].
    pub async fn switch_to_frame(&mut self) -> PagekitResult<()> {
        let driver = self.session.driver();
        let config = self.session.config();
        let anchor = self.session.capture_anchor().await?.clone();

        for handle in driver.window_handles().await? {
            driver.switch_to_window(&handle).await?;
            if driver.title().await?.contains(&config.virtual_document_title) {
                driver.switch_to_frame(FrameTarget::Index(0)).await?;
                self.state = FrameState::Inside;
                debug!(window = %handle, "entered virtual document frame");
                return Ok(());
            }
        }
        driver.switch_to_window(&anchor).await?;

        match self.enter_webview().await {
            Ok(container_id) => {
                self.state = FrameState::Inside;
                debug!(container = %container_id, "entered webview frame");
                Ok(())
            }
            Err(err) => {
                // a partial switch may have left focus inside the outer iframe
                if let Err(restore) = driver.switch_to_window(&anchor).await {
                    warn!(anchor = %anchor, error = %restore, "could not restore anchor window");
                }
                debug!(error = %err, "webview frame switch failed");
                Err(err)
            }
        }
    }

    /// Walk reference -> container -> iframe -> active frame from the
    /// anchor window; returns the container id
    async fn enter_webview(&self) -> PagekitResult<String> {
        let driver = self.session.driver();
        let config = self.session.config();
        let options = config.wait_options(config.frame_timeout_ms);
        let reference = self
            .view_root
            .child(self.session.locator("EditorView", "webView")?);
        let container_id = reference
            .attribute(driver, FLOW_TO_ATTRIBUTE)
            .await?
            .ok_or_else(|| PagekitError::not_found(format!("{reference} [{FLOW_TO_ATTRIBUTE}]")))?;
        let container = ElementRef::new(Locator::new(format!("#{container_id}")));
        let _ = wait_for_exists(driver, &container, &options).await?;

        let iframe_locator = self.session.locator("WebView", "iframe")?;
        let (view, _) = poll_until(
            || {
                let container = &container;
                let iframe_locator = &iframe_locator;
                async move {
                    let mut frames = container.find_all(driver, iframe_locator).await?;
                    Ok::<_, PagekitError>(if frames.is_empty() {
                        Probe::Pending("no webview iframe".to_string())
                    } else {
                        Probe::Ready(frames.swap_remove(0))
                    })
                }
            },
            &options,
            "webview iframe",
        )
        .await?;
        driver.switch_to_frame(FrameTarget::Element(&view)).await?;

        let active = ElementRef::new(self.session.locator("WebView", "activeFrame")?);
        let _ = wait_for_exists(driver, &active, &options).await?;
        let active_frame = active.resolve(driver).await?;
        driver
            .switch_to_frame(FrameTarget::Element(&active_frame))
            .await?;
        Ok(container_id)
    }

    /// Return focus to the anchor window, recording the current window as
    /// anchor if none was recorded yet
    pub async fn switch_back(&mut self) -> PagekitResult<()> {
        let anchor = self.session.capture_anchor().await?;
        self.session.driver().switch_to_window(anchor).await?;
        self.state = FrameState::Outside;
        debug!(anchor = %anchor, "switched back to anchor window");
        Ok(())
    }
}
