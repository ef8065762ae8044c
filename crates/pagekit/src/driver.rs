//! UiDriver - Abstract Remote UI Protocol
//!
//! Page objects never talk to a WebDriver client directly. They consume the
//! capability set below, which keeps the polling and resolution logic
//! independent of the transport.
//!
//! # Implementations
//!
//! - [`crate::mock::MockDriver`] - in-memory node tree for tests
//! - `WebDriverAdapter` - fantoccini client (feature `webdriver`)
//!
//! All methods take `&self`: one session is driven by one logical caller and
//! the remote end serializes commands anyway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Locator;
use crate::result::PagekitResult;

/// Opaque identifier of a top-level window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(String);

impl WindowHandle {
    /// Wrap a raw handle string
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The raw handle string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Keyboard input understood by the remote end
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Page Up
    PageUp,
    /// Page Down
    PageDown,
    /// Home
    Home,
    /// End
    End,
    /// Escape
    Escape,
    /// Enter
    Enter,
    /// Arrow up
    ArrowUp,
    /// Arrow down
    ArrowDown,
    /// Literal text
    Text(String),
}

impl Key {
    /// WebDriver key code point(s) for this key
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::PageUp => "\u{E00E}".to_string(),
            Self::PageDown => "\u{E00F}".to_string(),
            Self::End => "\u{E010}".to_string(),
            Self::Home => "\u{E011}".to_string(),
            Self::Escape => "\u{E00C}".to_string(),
            Self::Enter => "\u{E007}".to_string(),
            Self::ArrowUp => "\u{E013}".to_string(),
            Self::ArrowDown => "\u{E015}".to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Concatenate a key sequence into one wire string
    #[must_use]
    pub fn sequence(keys: &[Self]) -> String {
        keys.iter().map(Self::to_wire).collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::Escape => f.write_str("Escape"),
            Self::Enter => f.write_str("Enter"),
            Self::ArrowUp => f.write_str("ArrowUp"),
            Self::ArrowDown => f.write_str("ArrowDown"),
            Self::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// Frame to enter with [`UiDriver::switch_to_frame`]
#[derive(Debug, Clone, Copy)]
pub enum FrameTarget<'a, E> {
    /// Frame by index in the current document
    Index(u16),
    /// Frame backed by a resolved `<iframe>` element
    Element(&'a E),
}

/// Capability set the page objects consume from a remote UI driver.
///
/// `find_element` reports absence as `Ok(None)`; errors are reserved for
/// transport or protocol failures.
#[async_trait]
pub trait UiDriver: Send + Sync + 'static {
    /// A materialized remote node, valid until the UI mutates
    type Element: Clone + fmt::Debug + Send + Sync;

    /// First match of `locator` under `scope` (document root when `None`)
    async fn find_element(
        &self,
        scope: Option<&Self::Element>,
        locator: &Locator,
    ) -> PagekitResult<Option<Self::Element>>;

    /// All matches of `locator` under `scope`, in document order
    async fn find_elements(
        &self,
        scope: Option<&Self::Element>,
        locator: &Locator,
    ) -> PagekitResult<Vec<Self::Element>>;

    /// Rendered text of an element
    async fn text(&self, element: &Self::Element) -> PagekitResult<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &Self::Element, name: &str)
        -> PagekitResult<Option<String>>;

    /// Whether the element is painted
    async fn is_displayed(&self, element: &Self::Element) -> PagekitResult<bool>;

    /// Click an element
    async fn click(&self, element: &Self::Element) -> PagekitResult<()>;

    /// Type keys into a specific element
    async fn send_keys_to(&self, element: &Self::Element, keys: &[Key]) -> PagekitResult<()>;

    /// Type keys into whatever has focus
    async fn send_keys(&self, keys: &[Key]) -> PagekitResult<()>;

    /// All open top-level windows
    async fn window_handles(&self) -> PagekitResult<Vec<WindowHandle>>;

    /// The window that currently has automation focus
    async fn window_handle(&self) -> PagekitResult<WindowHandle>;

    /// Move automation focus to a window (top-level browsing context)
    async fn switch_to_window(&self, handle: &WindowHandle) -> PagekitResult<()>;

    /// Title of the current window
    async fn title(&self) -> PagekitResult<String>;

    /// Enter a child frame of the current browsing context
    async fn switch_to_frame(&self, target: FrameTarget<'_, Self::Element>) -> PagekitResult<()>;
}
