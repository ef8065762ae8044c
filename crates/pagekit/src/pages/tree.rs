//! Custom tree sections contributed by extensions.

use std::fmt;

use tracing::debug;

use crate::collection::CollectionReader;
use crate::driver::{Key, UiDriver};
use crate::page_object::{PageBase, PageObject};
use crate::result::{PagekitError, PagekitResult};
use crate::wait::{wait_for_exists, wait_until};

/// Locator component shared by every view section
const VIEW_SECTION: &str = "ViewSection";

/// A side bar section rendering an extension's tree
pub struct CustomTreeSection<D> {
    base: PageBase<D>,
}

impl<D> fmt::Debug for CustomTreeSection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTreeSection").field("base", &self.base).finish()
    }
}

impl<D: UiDriver> CustomTreeSection<D> {
    /// Expand the section if its header reports it collapsed
    pub async fn expand(&self) -> PagekitResult<()> {
        let driver = self.base.driver();
        let header = self.elem().child(self.base.locator_in(VIEW_SECTION, "header")?);
        let expanded = self.base.value_in(VIEW_SECTION, "headerExpanded")?;
        if header.attribute(driver, expanded).await?.as_deref() != Some("false") {
            return Ok(());
        }
        header.click(driver).await?;
        let header = &header;
        let _ = wait_until(
            move || async move {
                Ok::<_, PagekitError>(
                    header.attribute(driver, expanded).await?.as_deref() != Some("false"),
                )
            },
            &self.base.default_wait(),
            "tree section to expand",
        )
        .await?;
        Ok(())
    }

    /// Rows currently rendered, in order
    pub async fn visible_items(&self) -> PagekitResult<Vec<CustomTreeItem<D>>> {
        CollectionReader::new(self.elem().clone(), self.base.locator("itemRow")?)
            .read(&self.base)
            .await
    }

    /// Row labelled `label` with level at most `max_level` (`0` = any level).
    ///
    /// Every rendered row is checked and the last match wins. Absence is
    /// `Ok(None)`.
    pub async fn find_item(
        &self,
        label: &str,
        max_level: u32,
    ) -> PagekitResult<Option<CustomTreeItem<D>>> {
        self.expand().await?;

        let driver = self.base.driver();
        let container = self.base.child("rowContainer")?;
        let _ = wait_for_exists(driver, &container, &self.base.default_wait()).await?;
        container.send_keys(driver, &[Key::Home]).await?;

        let row_locator = self.base.locator("itemRow")?;
        let label_locator = self.base.locator("rowWithLabel")?.fill("label", label);
        let level_attr = self.base.value_in(VIEW_SECTION, "level")?;

        let mut found = None;
        let rows = container.count(driver, &row_locator).await?;
        for index in 0..rows {
            let row = container.nth(row_locator.clone(), index);
            if row.count(driver, &label_locator).await? == 0 {
                continue;
            }
            let level = parse_level(row.attribute(driver, level_attr).await?);
            if max_level < 1 || level <= max_level {
                debug!(label, index, level, "tree row matched");
                found = Some(self.base.load::<CustomTreeItem<D>>(row).wait().await?);
            }
        }
        Ok(found)
    }
}

impl<D: UiDriver> PageObject<D> for CustomTreeSection<D> {
    const COMPONENT: &'static str = "CustomTreeSection";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }
}

fn parse_level(raw: Option<String>) -> u32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// One row of a [`CustomTreeSection`]
pub struct CustomTreeItem<D> {
    base: PageBase<D>,
    label: Option<String>,
}

impl<D> fmt::Debug for CustomTreeItem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTreeItem")
            .field("base", &self.base)
            .field("label", &self.label)
            .finish()
    }
}

impl<D: UiDriver> CustomTreeItem<D> {
    /// Read the label from the UI and cache it
    pub async fn read_label(&mut self) -> PagekitResult<String> {
        let label = self.base.child("label")?.text(self.base.driver()).await?;
        self.label = Some(label.clone());
        Ok(label)
    }

    /// Label from the last [`Self::read_label`]
    #[must_use]
    pub fn cached_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Nesting depth, 1 for top-level rows
    pub async fn level(&self) -> PagekitResult<u32> {
        let attr = self.base.value_in(VIEW_SECTION, "level")?;
        Ok(parse_level(self.elem().attribute(self.base.driver(), attr).await?))
    }

    /// Whether the row's children are shown
    pub async fn is_expanded(&self) -> PagekitResult<bool> {
        let attr = self.base.value("expanded")?;
        let value = self.elem().attribute(self.base.driver(), attr).await?;
        Ok(value.as_deref() == Some("true"))
    }
}

impl<D: UiDriver> PageObject<D> for CustomTreeItem<D> {
    const COMPONENT: &'static str = "CustomTreeItem";

    fn from_base(base: PageBase<D>) -> Self {
        Self { base, label: None }
    }

    fn base(&self) -> &PageBase<D> {
        &self.base
    }
}
