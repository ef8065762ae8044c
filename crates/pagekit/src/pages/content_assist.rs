//! Content assist (suggestion popup) of an editor or the debug console.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::collection::CollectionReader;
use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::page_object::{PageBase, PageObject};
use crate::pages::menu::{Menu, MenuItem};
use crate::result::PagekitResult;
use crate::scroll::ScrollSeek;
use crate::session::Session;
use crate::wait::wait_until;

/// Prefix of the message shown when there is nothing to suggest
const NO_SUGGESTIONS: &str = "No suggestions";

/// The suggestion widget, scoped under its editor
pub struct ContentAssist<D> {
    base: PageBase<D>,
}

impl<D> fmt::Debug for ContentAssist<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentAssist").field("base", &self.base).finish()
    }
}

impl<D: UiDriver> ContentAssist<D> {
    /// The widget inside `editor` (a text editor or debug console root)
    pub fn new(session: Arc<Session<D>>, editor: &ElementRef) -> PagekitResult<Self> {
        let base =
            PageBase::at(session, editor, Self::COMPONENT, "elem")?.with_parent(editor.clone());
        Ok(Self { base })
    }

    fn seeker(&self) -> PagekitResult<ScrollSeek> {
        Ok(ScrollSeek::new(
            self.base.child("itemList")?,
            self.base.child("firstItem")?,
            self.base.value("lastElement")?,
        )
        .configured(self.base.config()))
    }
}

#[async_trait]
impl<D: UiDriver> PageObject<D> for ContentAssist<D> {
    const COMPONENT: &'static str = "ContentAssist";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }

    /// `false` while the loading message is shown
    async fn is_loaded(&self) -> PagekitResult<bool> {
        let driver = self.base.driver();
        let message = self.base.child("message")?;
        if !message.is_displayed_or_absent(driver).await? {
            return Ok(true);
        }
        // the message may disappear between the two lookups
        match message.text(driver).await {
            Ok(text) => Ok(text.starts_with(NO_SUGGESTIONS)),
            Err(err) if err.is_not_found() => Ok(true),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<D: UiDriver> Menu<D> for ContentAssist<D> {
    type Item = ContentAssistItem<D>;

    async fn items(&self) -> PagekitResult<Vec<ContentAssistItem<D>>> {
        let _ = wait_until(
            || self.is_loaded(),
            &self.base.default_wait(),
            "content assist to finish loading",
        )
        .await?;
        CollectionReader::new(self.base.child("itemRows")?, self.base.locator("itemRow")?)
            .read(&self.base)
            .await
    }

    /// Pages through the virtualized list until `name` or the last row
    async fn item(&self, name: &str) -> PagekitResult<Option<ContentAssistItem<D>>> {
        self.seeker()?.seek::<D, _>(self, name).await
    }
}

/// One suggestion row
pub struct ContentAssistItem<D> {
    base: PageBase<D>,
    label: Option<String>,
}

impl<D> fmt::Debug for ContentAssistItem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentAssistItem")
            .field("base", &self.base)
            .field("label", &self.label)
            .finish()
    }
}

impl<D: UiDriver> PageObject<D> for ContentAssistItem<D> {
    const COMPONENT: &'static str = "ContentAssist";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base, label: None }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }
}

#[async_trait]
impl<D: UiDriver> MenuItem<D> for ContentAssistItem<D> {
    type Selected = ();

    async fn read_label(&mut self) -> PagekitResult<String> {
        let label = self.base.child("itemLabel")?.text(self.base.driver()).await?;
        self.label = Some(label.clone());
        Ok(label)
    }

    fn cached_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    async fn select(&self) -> PagekitResult<()> {
        self.elem().click(self.base.driver()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::locator::Locator;
    use crate::mock::{MockDriver, MockNode, NodeId};

    fn editor() -> ElementRef {
        ElementRef::new(Locator::new(".editor-instance"))
    }

    /// Suggest widget with static rows; returns the message node
    fn widget(driver: &MockDriver, labels: &[&str], message: Option<&str>) -> NodeId {
        driver.with_dom(|dom| {
            let editor = dom.add(dom.root(), MockNode::matching(".editor-instance"));
            let widget = dom.add(editor, MockNode::matching(".suggest-widget"));
            let msg = dom.add(
                widget,
                MockNode::matching(".message").with_text(message.unwrap_or_default()),
            );
            dom.set_displayed(msg, message.is_some());
            let list = dom.add(widget, MockNode::matching(".monaco-list"));
            let rows = dom.add(list, MockNode::matching(".monaco-list-rows"));
            for (i, label) in labels.iter().enumerate() {
                let mut node = MockNode::matching(".monaco-list-row");
                if i == 0 {
                    node = node.also(".monaco-list-row[data-index=\"0\"]");
                }
                if i + 1 == labels.len() {
                    node = node.with_attr("data-last-element", "true");
                }
                let row = dom.add(rows, node);
                let _ = dom.add(row, MockNode::matching(".label-name").with_text(label));
            }
            msg
        })
    }

    mod loading_tests {
        use super::*;

        #[tokio::test]
        async fn test_loaded_without_message() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &["a"], None);
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert!(assist.is_loaded().await.unwrap());
        }

        #[tokio::test]
        async fn test_loading_message_means_not_loaded() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &[], Some("Loading..."));
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert!(!assist.is_loaded().await.unwrap());
        }

        #[tokio::test]
        async fn test_no_suggestions_counts_as_loaded() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &[], Some("No suggestions."));
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert!(assist.is_loaded().await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_items_wait_for_loading_to_finish() {
            let driver = MockDriver::new();
            let msg = widget(&driver, &["first", "second"], Some("Loading..."));
            let mut lookups = 0;
            driver.on_find(move |dom, locator| {
                if locator.selector().as_str() == ".message" {
                    lookups += 1;
                    if lookups == 3 {
                        dom.set_displayed(msg, false);
                    }
                }
            });
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert_eq!(assist.labels().await.unwrap(), ["first", "second"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_message_vanishing_mid_check_counts_as_loaded() {
            let driver = MockDriver::new();
            let msg = widget(&driver, &["after"], Some("Loading..."));
            let mut lookups = 0;
            driver.on_find(move |dom, locator| {
                if locator.selector().as_str() == ".message" {
                    lookups += 1;
                    if lookups == 2 {
                        dom.detach(msg);
                    }
                }
            });
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert!(assist.is_loaded().await.unwrap());
            assert_eq!(assist.labels().await.unwrap(), ["after"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_items_time_out_while_loading() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &["x"], Some("Loading..."));
            let session =
                Session::with_config(driver, SessionConfig::new().with_wait_timeout(500)).unwrap();
            let assist = ContentAssist::new(session, &editor()).unwrap();
            assert!(assist.items().await.unwrap_err().is_timeout());
        }
    }

    mod item_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_item_label_and_parent() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &["println", "print"], None);
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            let item = assist.item("print").await.unwrap().unwrap();
            assert_eq!(item.cached_label(), Some("print"));
            assert_eq!(item.parent_root(), Some(assist.elem()));
        }

        #[tokio::test(start_paused = true)]
        async fn test_exact_match_only() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &["println"], None);
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            assert!(!assist.has_item("print").await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_clicks_row() {
            let driver = MockDriver::new();
            let _ = widget(&driver, &["only"], None);
            let assist = ContentAssist::new(Session::new(driver).unwrap(), &editor()).unwrap();
            let item = assist.item("only").await.unwrap().unwrap();
            item.select().await.unwrap();
            assert_eq!(assist.base().driver().call_count("click"), 1);
        }
    }
}
