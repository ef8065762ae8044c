//! Menu abstractions shared by context menus and content assist.

use async_trait::async_trait;

use crate::driver::{Key, UiDriver};
use crate::element::ElementRef;
use crate::page_object::PageObject;
use crate::result::PagekitResult;
use crate::wait::wait_for_displayed;

/// A container of selectable items
#[async_trait]
pub trait Menu<D: UiDriver>: PageObject<D> {
    /// Item page object type
    type Item: MenuItem<D>;

    /// Fresh snapshot of the items, in rendered order
    async fn items(&self) -> PagekitResult<Vec<Self::Item>>;

    /// First item whose label equals `name`, or `None`
    async fn item(&self, name: &str) -> PagekitResult<Option<Self::Item>> {
        for mut item in self.items().await? {
            if item.read_label().await? == name {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Whether an item labelled `name` is present
    async fn has_item(&self, name: &str) -> PagekitResult<bool> {
        Ok(self.item(name).await?.is_some())
    }

    /// Labels of every item, in rendered order
    async fn labels(&self) -> PagekitResult<Vec<String>> {
        let mut labels = Vec::new();
        for mut item in self.items().await? {
            labels.push(item.read_label().await?);
        }
        Ok(labels)
    }

    /// Dismiss with Escape and wait for the root to be hidden
    async fn close(&self) -> PagekitResult<()> {
        let base = self.base();
        base.driver().send_keys(&[Key::Escape]).await?;
        let options = base.default_wait().reverse();
        let _ = wait_for_displayed(base.driver(), self.elem(), &options).await?;
        Ok(())
    }
}

/// One selectable row of a [`Menu`]
#[async_trait]
pub trait MenuItem<D: UiDriver>: PageObject<D> {
    /// What selecting the item yields
    type Selected: Send;

    /// Read the label from the UI and cache it
    async fn read_label(&mut self) -> PagekitResult<String>;

    /// Label from the last [`Self::read_label`]
    fn cached_label(&self) -> Option<&str>;

    /// Activate the item
    async fn select(&self) -> PagekitResult<Self::Selected>;

    /// Root of the menu this item was read from
    fn parent_root(&self) -> Option<&ElementRef> {
        self.base().parent()
    }
}
