//! Collection Reader
//!
//! Reads the live rows of a container. Each read is a fresh snapshot: rows
//! are matched, filtered, wrapped into item page objects and individually
//! awaited before being returned, so a half-rendered row never reaches the
//! caller.
//!
//! Rows are addressed by position (`container > row[i]`), so an item stays
//! a lazy handle like every other [`ElementRef`].

use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject};
use crate::result::PagekitResult;

/// Attribute inspected by the default disabled filter
pub const DISABLED_ATTRIBUTE: &str = "class";

/// Token marking a disabled row
pub const DISABLED_MARKER: &str = "disabled";

/// Which rows a read keeps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowFilter {
    /// Every matching row
    #[default]
    All,
    /// Rows whose `attribute` does not contain `marker` as a substring
    ExcludeMarked {
        /// Attribute to inspect
        attribute: String,
        /// Substring that excludes the row
        marker: String,
    },
}

impl RowFilter {
    /// Drop rows whose `class` contains `disabled`
    #[must_use]
    pub fn disabled() -> Self {
        Self::ExcludeMarked {
            attribute: DISABLED_ATTRIBUTE.to_string(),
            marker: DISABLED_MARKER.to_string(),
        }
    }

    /// Whether `element` passes the filter
    pub async fn keeps<D: UiDriver>(&self, driver: &D, element: &D::Element) -> PagekitResult<bool> {
        match self {
            Self::All => Ok(true),
            Self::ExcludeMarked { attribute, marker } => {
                let value = driver.attribute(element, attribute).await?;
                Ok(!value.is_some_and(|v| v.contains(marker.as_str())))
            }
        }
    }
}

/// Reads the rows of one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReader {
    container: ElementRef,
    row: Locator,
    filter: RowFilter,
}

impl CollectionReader {
    /// Reader over `row` matches under `container`
    #[must_use]
    pub fn new(container: ElementRef, row: Locator) -> Self {
        Self {
            container,
            row,
            filter: RowFilter::All,
        }
    }

    /// Apply a row filter
    #[must_use]
    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The container handle
    #[must_use]
    pub const fn container(&self) -> &ElementRef {
        &self.container
    }

    /// Handles for the rows that pass the filter, in DOM order
    pub async fn handles<D: UiDriver>(&self, driver: &D) -> PagekitResult<Vec<ElementRef>> {
        let rows = self.container.find_all(driver, &self.row).await?;
        let mut kept = Vec::with_capacity(rows.len());
        for (index, element) in rows.iter().enumerate() {
            if self.filter.keeps(driver, element).await? {
                kept.push(self.container.nth(self.row.clone(), index));
            }
        }
        Ok(kept)
    }

    /// Number of rows that pass the filter
    pub async fn count<D: UiDriver>(&self, driver: &D) -> PagekitResult<usize> {
        Ok(self.handles(driver).await?.len())
    }

    /// Build one `P` per kept row under `parent`, waiting for each before
    /// appending it
    pub async fn read<D, P>(&self, parent: &PageBase<D>) -> PagekitResult<Vec<P>>
    where
        D: UiDriver,
        P: PageObject<D>,
    {
        let handles = self.handles(parent.driver()).await?;
        let mut items = Vec::with_capacity(handles.len());
        for handle in handles {
            items.push(parent.load::<P>(handle).wait().await?);
        }
        Ok(items)
    }
}
