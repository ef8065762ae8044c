//! Context menus and their (possibly nesting) items.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::collection::{CollectionReader, RowFilter};
use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::page_object::{PageBase, PageObject};
use crate::pages::menu::{Menu, MenuItem};
use crate::result::{PagekitError, PagekitResult};
use crate::session::Session;
use crate::wait::{settle, wait_for_displayed, wait_for_stable_count};

/// An open context menu
pub struct ContextMenu<D> {
    base: PageBase<D>,
}

impl<D> Clone for ContextMenu<D> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<D> fmt::Debug for ContextMenu<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenu").field("base", &self.base).finish()
    }
}

impl<D: UiDriver> ContextMenu<D> {
    /// The top-level context menu container
    pub fn new(session: Arc<Session<D>>) -> PagekitResult<Self> {
        let base = PageBase::at(session, &ElementRef::root(), Self::COMPONENT, "contextMenu")?;
        Ok(Self { base })
    }

    fn reader(&self) -> PagekitResult<CollectionReader> {
        Ok(
            CollectionReader::new(self.elem().clone(), self.base.locator("itemElement")?)
                .with_filter(RowFilter::disabled()),
        )
    }

    /// Wait up to `timeout_ms` for the menu to show, then until its item
    /// count stops changing
    pub async fn wait_for(self, timeout_ms: u64) -> PagekitResult<Self> {
        let config = self.base.config();
        let _ = wait_for_displayed(
            self.base.driver(),
            self.elem(),
            &config.wait_options(timeout_ms),
        )
        .await?;

        let menu = &self;
        let count = wait_for_stable_count(
            || async move { Ok::<_, PagekitError>(menu.items().await?.len()) },
            &config.wait_options(config.menu_stabilize_ms),
            "context menu items to stop changing",
        )
        .await?;
        debug!(menu = %self.elem(), count, "context menu loaded");
        Ok(self)
    }

    /// Select `path[0]`, then `path[1]` in the submenu it opened, and so on.
    ///
    /// Returns whatever the last selection opened.
    pub async fn select_path(&self, path: &[&str]) -> PagekitResult<Option<Self>> {
        let mut menu = self.clone();
        for (depth, name) in path.iter().enumerate() {
            let item = menu.item(name).await?.ok_or_else(|| {
                PagekitError::not_found(format!("{} > item labelled {name:?}", menu.elem()))
            })?;
            let opened = item.select().await?;
            if depth + 1 == path.len() {
                return Ok(opened);
            }
            menu = opened.ok_or_else(|| {
                PagekitError::not_found(format!("submenu of item labelled {name:?}"))
            })?;
        }
        Ok(None)
    }

    async fn labelled(&self, name: &str) -> PagekitResult<Option<ContextMenuItem<D>>> {
        for mut item in self.items().await? {
            if item.read_label().await? == name {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<D: UiDriver> PageObject<D> for ContextMenu<D> {
    const COMPONENT: &'static str = "ContextMenu";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }

    async fn wait(self) -> PagekitResult<Self> {
        let timeout_ms = self.base.config().wait_timeout_ms;
        self.wait_for(timeout_ms).await
    }
}

#[async_trait]
impl<D: UiDriver> Menu<D> for ContextMenu<D> {
    type Item = ContextMenuItem<D>;

    /// Enabled items in DOM order
    async fn items(&self) -> PagekitResult<Vec<ContextMenuItem<D>>> {
        self.reader()?.read(&self.base).await
    }

    /// Any failure while reading counts as "not there"
    async fn item(&self, name: &str) -> PagekitResult<Option<ContextMenuItem<D>>> {
        match self.labelled(name).await {
            Ok(found) => Ok(found),
            Err(err) => {
                debug!(name, error = %err, "context menu lookup failed");
                Ok(None)
            }
        }
    }
}

/// One entry of a [`ContextMenu`]
pub struct ContextMenuItem<D> {
    base: PageBase<D>,
    label: Option<String>,
}

impl<D> fmt::Debug for ContextMenuItem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuItem")
            .field("base", &self.base)
            .field("label", &self.label)
            .finish()
    }
}

impl<D: UiDriver> ContextMenuItem<D> {
    /// Whether a submenu marker shows up within the default wait
    async fn is_nesting(&self) -> PagekitResult<bool> {
        let marker = self.base.child("itemNesting")?;
        match wait_for_displayed(self.base.driver(), &marker, &self.base.default_wait()).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() || err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl<D: UiDriver> PageObject<D> for ContextMenuItem<D> {
    const COMPONENT: &'static str = "ContextMenu";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base, label: None }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }
}

#[async_trait]
impl<D: UiDriver> MenuItem<D> for ContextMenuItem<D> {
    type Selected = Option<ContextMenu<D>>;

    async fn read_label(&mut self) -> PagekitResult<String> {
        let attribute = self.base.value("itemText")?;
        let label = self
            .base
            .child("itemLabel")?
            .attribute(self.base.driver(), attribute)
            .await?
            .unwrap_or_default();
        self.label = Some(label.clone());
        Ok(label)
    }

    fn cached_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Click, let a submenu animate in, and return it fully loaded if one
    /// opened
    async fn select(&self) -> PagekitResult<Option<ContextMenu<D>>> {
        self.elem().click(self.base.driver()).await?;
        settle(self.base.config().select_settle_ms).await;
        if !self.is_nesting().await? {
            return Ok(None);
        }
        let submenu: ContextMenu<D> = self.base.load(self.elem().clone());
        Ok(Some(submenu.wait().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::Key;
    use crate::mock::{MockDom, MockDriver, MockNode, NodeId};
    use tokio::time::Instant;

    fn add_item(dom: &mut MockDom, parent: NodeId, label: &str, class: &str) -> NodeId {
        let item = dom.add(parent, MockNode::matching(".action-item").with_attr("class", class));
        let _ = dom.add(
            item,
            MockNode::matching(".action-label").with_attr("aria-label", label),
        );
        item
    }

    fn menu(driver: &MockDriver, items: &[(&str, bool)]) -> NodeId {
        driver.with_dom(|dom| {
            let menu = dom.add(dom.root(), MockNode::matching(".monaco-menu-container"));
            for (label, disabled) in items {
                let class = if *disabled {
                    "action-item disabled"
                } else {
                    "action-item"
                };
                let _ = add_item(dom, menu, label, class);
            }
            menu
        })
    }

    mod items_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_disabled_items_excluded() {
            let driver = MockDriver::new();
            let _ = menu(
                &driver,
                &[("Cut", false), ("Copy", true), ("Paste", false)],
            );
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            assert_eq!(menu.labels().await.unwrap(), ["Cut", "Paste"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_item_by_name() {
            let driver = MockDriver::new();
            let _ = menu(&driver, &[("Cut", false), ("Paste", false)]);
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            let item = menu.item("Paste").await.unwrap().unwrap();
            assert_eq!(item.cached_label(), Some("Paste"));
            assert_eq!(item.parent_root(), Some(menu.elem()));
            assert!(menu.item("Delete").await.unwrap().is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_item_swallows_lookup_failures() {
            let menu = ContextMenu::new(Session::new(MockDriver::new()).unwrap()).unwrap();
            assert!(menu.items().await.unwrap_err().is_not_found());
            assert!(menu.item("Cut").await.unwrap().is_none());
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_wait_converges_on_growing_menu() {
            let driver = MockDriver::new();
            let container = menu(&driver, &[("One", false)]);
            let mut added = 0;
            driver.on_find(move |dom, locator| {
                if locator.selector().as_str() == ".action-item" && added < 3 {
                    added += 1;
                    let _ = add_item(dom, container, &format!("Late {added}"), "action-item");
                }
            });
            let menu = ContextMenu::new(Session::new(driver).unwrap())
                .unwrap()
                .wait()
                .await
                .unwrap();
            let first = menu.items().await.unwrap().len();
            let second = menu.items().await.unwrap().len();
            assert_eq!((first, second), (4, 4));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_times_out_when_never_shown() {
            let session =
                Session::with_config(MockDriver::new(), SessionConfig::new().with_wait_timeout(800))
                    .unwrap();
            let start = Instant::now();
            let err = ContextMenu::new(session).unwrap().wait().await.unwrap_err();
            assert!(err.is_timeout());
            assert!(start.elapsed().as_millis() >= 800);
        }

        #[tokio::test(start_paused = true)]
        async fn test_close_presses_escape_and_waits_hidden() {
            let driver = MockDriver::new();
            let container = menu(&driver, &[("Cut", false)]);
            driver.on_keys(move |dom, target, keys| {
                if target.is_none() && keys == [Key::Escape] {
                    dom.set_displayed(container, false);
                }
            });
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            menu.close().await.unwrap();
            assert!(menu.base().driver().was_called("send_keys:Escape"));
            assert!(!menu.elem().is_displayed(menu.base().driver()).await.unwrap());
        }
    }

    mod select_tests {
        use super::*;

        fn nesting_menu(driver: &MockDriver) -> NodeId {
            let container = menu(driver, &[("Plain", false)]);
            let parent = driver.with_dom(|dom| {
                let item = add_item(dom, container, "More", "action-item");
                let _ = dom.add(item, MockNode::matching(".submenu-indicator"));
                item
            });
            driver.on_click(move |dom, clicked| {
                if clicked == parent && dom.children(parent).len() == 2 {
                    let _ = add_item(dom, parent, "Inner A", "action-item");
                    let _ = add_item(dom, parent, "Inner B", "action-item disabled");
                    let _ = add_item(dom, parent, "Inner C", "action-item");
                }
            });
            parent
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_without_marker_returns_none() {
            let driver = MockDriver::new();
            let _ = nesting_menu(&driver);
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            let item = menu.item("Plain").await.unwrap().unwrap();
            let start = Instant::now();
            assert!(item.select().await.unwrap().is_none());
            // settle delay plus the full probe budget
            assert!(start.elapsed().as_millis() >= 500 + 5_000);
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_nesting_returns_loaded_submenu() {
            let driver = MockDriver::new();
            let parent = nesting_menu(&driver);
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            let item = menu.item("More").await.unwrap().unwrap();

            let submenu = item.select().await.unwrap().unwrap();
            assert_eq!(submenu.elem(), item.elem());
            assert_eq!(submenu.labels().await.unwrap(), ["Inner A", "Inner C"]);
            assert_eq!(
                submenu.base().driver().with_dom(|dom| dom.children(parent).len()),
                5
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_path_walks_nested_menus() {
            let driver = MockDriver::new();
            let _ = nesting_menu(&driver);
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();

            let opened = menu.select_path(&["More", "Inner C"]).await.unwrap();
            assert!(opened.is_none());
            assert_eq!(menu.base().driver().call_count("click"), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_path_missing_item_is_not_found() {
            let driver = MockDriver::new();
            let _ = nesting_menu(&driver);
            let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
            let err = menu.select_path(&["Nope"]).await.unwrap_err();
            assert!(err.is_not_found());
        }
    }
}
