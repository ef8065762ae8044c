//! Lazily-resolved element handles.
//!
//! An [`ElementRef`] is a chain of locator steps from the document root. It
//! never holds a remote node: every read walks the chain again, so a handle
//! taken before the UI re-rendered still reaches the post-render node.
//! Construction cannot fail; absence surfaces as
//! [`PagekitError::ElementNotFound`] on first use.

use std::fmt;

use crate::driver::{Key, UiDriver};
use crate::locator::Locator;
use crate::result::{PagekitError, PagekitResult};

/// One hop in a handle's chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    locator: Locator,
    index: Option<usize>,
}

impl Step {
    /// The step's locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Position among all matches, `None` for the first match
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.locator),
            None => write!(f, "{}", self.locator),
        }
    }
}

/// A (locator, scope) pair resolved at the moment of use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementRef {
    steps: Vec<Step>,
}

impl ElementRef {
    /// The document root of the current browsing context
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A handle for the first match of `locator` under the document root
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self::root().child(locator)
    }

    /// First match of `locator` under this handle
    #[must_use]
    pub fn child(&self, locator: Locator) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            locator,
            index: None,
        });
        Self { steps }
    }

    /// The `index`-th match of `locator` under this handle
    #[must_use]
    pub fn nth(&self, locator: Locator, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            locator,
            index: Some(index),
        });
        Self { steps }
    }

    /// Same locator, evaluated under `parent` instead of the current scope
    #[must_use]
    pub fn within_scope(&self, parent: &Self) -> Self {
        let mut steps = parent.steps.clone();
        if let Some(own) = self.steps.last() {
            steps.push(own.clone());
        }
        Self { steps }
    }

    /// The scope this handle is evaluated in
    #[must_use]
    pub fn scope(&self) -> Self {
        let mut steps = self.steps.clone();
        let _ = steps.pop();
        Self { steps }
    }

    /// Whether this is the document root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps of the chain, outermost first
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the chain; `Ok(None)` when a step has no match.
    ///
    /// The document root resolves to `Some(None)`: there is no node, and
    /// searches under it use the driver's root.
    pub async fn try_resolve<D: UiDriver>(
        &self,
        driver: &D,
    ) -> PagekitResult<Option<Option<D::Element>>> {
        let mut current: Option<D::Element> = None;
        for step in &self.steps {
            let next = match step.index {
                None => driver.find_element(current.as_ref(), &step.locator).await?,
                Some(i) => driver
                    .find_elements(current.as_ref(), &step.locator)
                    .await?
                    .into_iter()
                    .nth(i),
            };
            match next {
                Some(element) => current = Some(element),
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolve to a scope usable for searches (`None` = document root)
    pub async fn resolve_scope<D: UiDriver>(&self, driver: &D) -> PagekitResult<Option<D::Element>> {
        self.try_resolve(driver)
            .await?
            .ok_or_else(|| PagekitError::not_found(self.to_string()))
    }

    /// Resolve to a concrete element
    pub async fn resolve<D: UiDriver>(&self, driver: &D) -> PagekitResult<D::Element> {
        self.resolve_scope(driver)
            .await?
            .ok_or_else(|| PagekitError::not_found("<document root>"))
    }

    /// Whether the chain currently resolves
    pub async fn exists<D: UiDriver>(&self, driver: &D) -> PagekitResult<bool> {
        Ok(self.try_resolve(driver).await?.is_some())
    }

    /// All current matches of `locator` under this handle
    pub async fn find_all<D: UiDriver>(
        &self,
        driver: &D,
        locator: &Locator,
    ) -> PagekitResult<Vec<D::Element>> {
        let scope = self.resolve_scope(driver).await?;
        driver.find_elements(scope.as_ref(), locator).await
    }

    /// Number of current matches of `locator` under this handle
    pub async fn count<D: UiDriver>(&self, driver: &D, locator: &Locator) -> PagekitResult<usize> {
        Ok(self.find_all(driver, locator).await?.len())
    }

    /// Rendered text
    pub async fn text<D: UiDriver>(&self, driver: &D) -> PagekitResult<String> {
        let element = self.resolve(driver).await?;
        driver.text(&element).await
    }

    /// Attribute value
    pub async fn attribute<D: UiDriver>(
        &self,
        driver: &D,
        name: &str,
    ) -> PagekitResult<Option<String>> {
        let element = self.resolve(driver).await?;
        driver.attribute(&element, name).await
    }

    /// Whether the element is painted
    pub async fn is_displayed<D: UiDriver>(&self, driver: &D) -> PagekitResult<bool> {
        let element = self.resolve(driver).await?;
        driver.is_displayed(&element).await
    }

    /// Like [`Self::is_displayed`], with absence counted as hidden
    pub async fn is_displayed_or_absent<D: UiDriver>(&self, driver: &D) -> PagekitResult<bool> {
        match self.try_resolve(driver).await? {
            Some(Some(element)) => driver.is_displayed(&element).await,
            Some(None) => Ok(true),
            None => Ok(false),
        }
    }

    /// Click the element
    pub async fn click<D: UiDriver>(&self, driver: &D) -> PagekitResult<()> {
        let element = self.resolve(driver).await?;
        driver.click(&element).await
    }

    /// Type keys into the element
    pub async fn send_keys<D: UiDriver>(&self, driver: &D, keys: &[Key]) -> PagekitResult<()> {
        let element = self.resolve(driver).await?;
        driver.send_keys_to(&element, keys).await
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<document root>");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};

    fn loc(s: &str) -> Locator {
        Locator::new(s)
    }

    mod chain_tests {
        use super::*;

        #[test]
        fn test_root_is_empty() {
            assert!(ElementRef::root().is_root());
            assert_eq!(ElementRef::root().to_string(), "<document root>");
        }

        #[test]
        fn test_within_scope_rebinds() {
            let item = ElementRef::new(loc(".menu")).child(loc(".label"));
            let other = ElementRef::new(loc(".panel"));
            let rebound = item.within_scope(&other);
            assert_eq!(rebound.to_string(), "css=.panel > css=.label");
            assert_eq!(rebound.scope(), other);
        }

        #[test]
        fn test_display_with_index() {
            let row = ElementRef::new(loc(".list")).nth(loc(".row"), 2);
            assert_eq!(row.to_string(), "css=.list > css=.row[2]");
        }
    }

    mod resolution_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_reports_not_found_lazily() {
            let driver = MockDriver::new();
            let handle = ElementRef::new(loc(".later"));
            let err = handle.text(&driver).await.unwrap_err();
            assert!(err.is_not_found());

            driver.with_dom(|dom| {
                let _ = dom.add(dom.root(), MockNode::matching(".later").with_text("now"));
            });
            assert_eq!(handle.text(&driver).await.unwrap(), "now");
        }

        #[tokio::test]
        async fn test_reresolves_after_rerender() {
            let driver = MockDriver::new();
            let first = driver.with_dom(|dom| {
                dom.add(dom.root(), MockNode::matching(".title").with_text("old"))
            });
            let handle = ElementRef::new(loc(".title"));
            assert_eq!(handle.text(&driver).await.unwrap(), "old");

            driver.with_dom(|dom| {
                dom.detach(first);
                let _ = dom.add(dom.root(), MockNode::matching(".title").with_text("new"));
            });
            assert_eq!(handle.text(&driver).await.unwrap(), "new");
        }

        #[tokio::test]
        async fn test_nth_step_picks_index() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let list = dom.add(dom.root(), MockNode::matching(".list"));
                for label in ["a", "b", "c"] {
                    let _ = dom.add(list, MockNode::matching(".row").with_text(label));
                }
            });
            let list = ElementRef::new(loc(".list"));
            assert_eq!(list.nth(loc(".row"), 1).text(&driver).await.unwrap(), "b");
            assert!(!list.nth(loc(".row"), 5).exists(&driver).await.unwrap());
            assert_eq!(list.count(&driver, &loc(".row")).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_displayed_or_absent() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.add(dom.root(), MockNode::matching(".hidden").hidden());
            });
            assert!(!ElementRef::new(loc(".hidden"))
                .is_displayed_or_absent(&driver)
                .await
                .unwrap());
            assert!(!ElementRef::new(loc(".gone"))
                .is_displayed_or_absent(&driver)
                .await
                .unwrap());
        }
    }
}
