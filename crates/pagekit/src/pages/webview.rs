//! Editor tab hosting a webview.

use std::fmt;
use std::sync::Arc;

use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::frame::{FrameState, FrameSwitcher};
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject};
use crate::result::PagekitResult;
use crate::session::Session;

/// An open editor whose content is a webview
pub struct WebView<D> {
    base: PageBase<D>,
    switcher: FrameSwitcher<D>,
}

impl<D> fmt::Debug for WebView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebView")
            .field("base", &self.base)
            .field("switcher", &self.switcher)
            .finish()
    }
}

impl<D: UiDriver> WebView<D> {
    /// Webview hosted by the editor rooted at `editor`
    #[must_use]
    pub fn new(session: Arc<Session<D>>, editor: ElementRef) -> Self {
        Self::from_base(PageBase::new(session, editor, Self::COMPONENT))
    }

    /// Handle for the first match of `locator` in the webview.
    ///
    /// Inside the frame the search starts at the embedded document root;
    /// outside it is scoped to the editor.
    #[must_use]
    pub fn find_web_element(&self, locator: Locator) -> ElementRef {
        self.search_root().child(locator)
    }

    /// Handles for every current match of `locator` in the webview
    pub async fn find_web_elements(&self, locator: Locator) -> PagekitResult<Vec<ElementRef>> {
        let scope = self.search_root();
        let count = scope.count(self.base.driver(), &locator).await?;
        Ok((0..count).map(|i| scope.nth(locator.clone(), i)).collect())
    }

    /// Move automation focus into the webview
    pub async fn switch_to_frame(&mut self) -> PagekitResult<()> {
        self.switcher.switch_to_frame().await
    }

    /// Move automation focus back to the workbench window
    pub async fn switch_back(&mut self) -> PagekitResult<()> {
        self.switcher.switch_back().await
    }

    /// Whether focus is inside the webview
    #[must_use]
    pub const fn frame_state(&self) -> FrameState {
        self.switcher.state()
    }

    fn search_root(&self) -> ElementRef {
        match self.switcher.state() {
            FrameState::Inside => ElementRef::root(),
            FrameState::Outside => self.elem().clone(),
        }
    }
}

impl<D: UiDriver> PageObject<D> for WebView<D> {
    const COMPONENT: &'static str = "WebView";

    fn from_base(base: PageBase<D>) -> Self {
        let switcher = FrameSwitcher::new(Arc::clone(base.session()), base.root().clone());
        Self { base, switcher }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }
}
