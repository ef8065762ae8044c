//! Page objects for workbench components.
//!
//! Every type here wraps a [`PageBase`](crate::page_object::PageBase) and
//! looks up its selectors under its own component name in the session's
//! locator table.

pub mod content_assist;
pub mod context_menu;
pub mod menu;
pub mod sidebar;
pub mod tree;
pub mod webview;

pub use content_assist::{ContentAssist, ContentAssistItem};
pub use context_menu::{ContextMenu, ContextMenuItem};
pub use menu::{Menu, MenuItem};
pub use sidebar::{SideBarView, ViewContent, ViewSection, ViewTitlePart};
pub use tree::{CustomTreeItem, CustomTreeSection};
pub use webview::WebView;
