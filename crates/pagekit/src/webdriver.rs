//! WebDriver adapter over a [`fantoccini::Client`].
//!
//! Only compiled with the `webdriver` feature. Connect the client yourself
//! (any capabilities, any driver server) and hand it over:
//!
//! ```ignore
//! let client = fantoccini::ClientBuilder::rustls()?.connect("http://localhost:9515").await?;
//! let session = Session::new(WebDriverAdapter::new(client))?;
//! ```

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::Client;
use tracing::trace;

use crate::driver::{FrameTarget, Key, UiDriver, WindowHandle};
use crate::locator::{Locator, Selector};
use crate::result::{PagekitError, PagekitResult};

/// Frames addressable by index in the current document
const FRAME_ELEMENTS: &str = "iframe, frame";

/// [`UiDriver`] backed by a live WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverAdapter {
    client: Client,
}

impl WebDriverAdapter {
    /// Wrap a connected client
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// End the WebDriver session
    pub async fn close(self) -> PagekitResult<()> {
        self.client.close().await.map_err(PagekitError::driver)
    }
}

fn wire_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator.selector() {
        Selector::Css(css) => fantoccini::Locator::Css(css),
        Selector::XPath(xpath) => fantoccini::Locator::XPath(xpath),
    }
}

fn absent_as_none<T>(result: Result<T, CmdError>) -> PagekitResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_no_such_element() => Ok(None),
        Err(err) => Err(PagekitError::driver(err)),
    }
}

#[async_trait]
impl UiDriver for WebDriverAdapter {
    type Element = Element;

    async fn find_element(
        &self,
        scope: Option<&Element>,
        locator: &Locator,
    ) -> PagekitResult<Option<Element>> {
        trace!(%locator, "find_element");
        let query = wire_locator(locator);
        let found = match scope {
            Some(element) => element.find(query).await,
            None => self.client.find(query).await,
        };
        absent_as_none(found)
    }

    async fn find_elements(
        &self,
        scope: Option<&Element>,
        locator: &Locator,
    ) -> PagekitResult<Vec<Element>> {
        trace!(%locator, "find_elements");
        let query = wire_locator(locator);
        let found = match scope {
            Some(element) => element.find_all(query).await,
            None => self.client.find_all(query).await,
        };
        found.map_err(PagekitError::driver)
    }

    async fn text(&self, element: &Element) -> PagekitResult<String> {
        element.text().await.map_err(PagekitError::driver)
    }

    async fn attribute(&self, element: &Element, name: &str) -> PagekitResult<Option<String>> {
        element.attr(name).await.map_err(PagekitError::driver)
    }

    async fn is_displayed(&self, element: &Element) -> PagekitResult<bool> {
        element.is_displayed().await.map_err(PagekitError::driver)
    }

    async fn click(&self, element: &Element) -> PagekitResult<()> {
        element.click().await.map_err(PagekitError::driver)
    }

    async fn send_keys_to(&self, element: &Element, keys: &[Key]) -> PagekitResult<()> {
        element
            .send_keys(&Key::sequence(keys))
            .await
            .map_err(PagekitError::driver)
    }

    async fn send_keys(&self, keys: &[Key]) -> PagekitResult<()> {
        let focused = self
            .client
            .active_element()
            .await
            .map_err(PagekitError::driver)?;
        self.send_keys_to(&focused, keys).await
    }

    async fn window_handles(&self) -> PagekitResult<Vec<WindowHandle>> {
        let handles = self.client.windows().await.map_err(PagekitError::driver)?;
        Ok(handles
            .into_iter()
            .map(|h| WindowHandle::new(String::from(h)))
            .collect())
    }

    async fn window_handle(&self) -> PagekitResult<WindowHandle> {
        let handle = self.client.window().await.map_err(PagekitError::driver)?;
        Ok(WindowHandle::new(String::from(handle)))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> PagekitResult<()> {
        let wire = fantoccini::wd::WindowHandle::try_from(handle.as_str().to_string())
            .map_err(PagekitError::driver)?;
        self.client
            .switch_to_window(wire)
            .await
            .map_err(PagekitError::driver)
    }

    async fn title(&self) -> PagekitResult<String> {
        self.client.title().await.map_err(PagekitError::driver)
    }

    async fn switch_to_frame(&self, target: FrameTarget<'_, Element>) -> PagekitResult<()> {
        let frame = match target {
            FrameTarget::Element(element) => element.clone(),
            FrameTarget::Index(index) => {
                let mut frames = self
                    .client
                    .find_all(fantoccini::Locator::Css(FRAME_ELEMENTS))
                    .await
                    .map_err(PagekitError::driver)?;
                let index = usize::from(index);
                if index >= frames.len() {
                    return Err(PagekitError::driver(format!("no such frame: {index}")));
                }
                frames.swap_remove(index)
            }
        };
        frame.enter_frame().await.map_err(PagekitError::driver)
    }
}
