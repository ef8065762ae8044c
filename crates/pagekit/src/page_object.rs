//! Scoped Page Object Support
//!
//! Every UI region is a page object: a root [`ElementRef`], the locator
//! component it reads its selectors from, and the shared [`Session`].
//! Children are loaded with [`PageBase::load`], which roots the child at a
//! handle and records the parent's root for re-scoping. The parent link is a
//! copy of a handle, never an owning reference, so page objects form no
//! cycles.
//!
//! # Example
//!
//! ```ignore
//! struct Toolbar<D> {
//!     base: PageBase<D>,
//! }
//!
//! impl<D: UiDriver> PageObject<D> for Toolbar<D> {
//!     const COMPONENT: &'static str = "Toolbar";
//!
//!     fn from_base(base: PageBase<D>) -> Self {
//!         Self { base }
//!     }
//!
//!     fn base(&self) -> &PageBase<D> {
//!         &self.base
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::locator::Locator;
use crate::result::PagekitResult;
use crate::session::Session;
use crate::wait::{wait_for_displayed, WaitOptions};

/// State shared by every page object
pub struct PageBase<D> {
    session: Arc<Session<D>>,
    root: ElementRef,
    component: &'static str,
    parent: Option<ElementRef>,
}

impl<D> Clone for PageBase<D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            root: self.root.clone(),
            component: self.component,
            parent: self.parent.clone(),
        }
    }
}

impl<D> fmt::Debug for PageBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBase")
            .field("component", &self.component)
            .field("root", &self.root.to_string())
            .field("parent", &self.parent.as_ref().map(ToString::to_string))
            .finish_non_exhaustive()
    }
}

impl<D: UiDriver> PageBase<D> {
    /// A page object rooted at `root` reading locators from `component`
    #[must_use]
    pub fn new(session: Arc<Session<D>>, root: ElementRef, component: &'static str) -> Self {
        Self {
            session,
            root,
            component,
            parent: None,
        }
    }

    /// Root a page object at `component.key` under `scope`
    pub fn at(
        session: Arc<Session<D>>,
        scope: &ElementRef,
        component: &'static str,
        key: &str,
    ) -> PagekitResult<Self> {
        let root = scope.child(session.locator(component, key)?);
        Ok(Self::new(session, root, component))
    }

    /// Record the parent's root handle
    #[must_use]
    pub fn with_parent(mut self, parent: ElementRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The shared session
    pub const fn session(&self) -> &Arc<Session<D>> {
        &self.session
    }

    /// The remote driver
    pub fn driver(&self) -> &D {
        self.session.driver()
    }

    /// Timing budgets
    pub fn config(&self) -> &SessionConfig {
        self.session.config()
    }

    /// The root handle
    pub const fn root(&self) -> &ElementRef {
        &self.root
    }

    /// Locator component name
    pub const fn component(&self) -> &'static str {
        self.component
    }

    /// The parent's root handle, when loaded as a child
    pub const fn parent(&self) -> Option<&ElementRef> {
        self.parent.as_ref()
    }

    /// Locator for `key` in this page object's component
    pub fn locator(&self, key: &str) -> PagekitResult<Locator> {
        self.session.locator(self.component, key)
    }

    /// Locator for `key` in another component
    pub fn locator_in(&self, component: &str, key: &str) -> PagekitResult<Locator> {
        self.session.locator(component, key)
    }

    /// Raw table string for `key` (attribute names and the like)
    pub fn value(&self, key: &str) -> PagekitResult<&str> {
        self.session.locators().value(self.component, key)
    }

    /// Raw table string for `key` in another component
    pub fn value_in(&self, component: &str, key: &str) -> PagekitResult<&str> {
        self.session.locators().value(component, key)
    }

    /// Handle for the first match of `key` under the root
    pub fn child(&self, key: &str) -> PagekitResult<ElementRef> {
        Ok(self.root.child(self.locator(key)?))
    }

    /// Load a child page object rooted at `root`, with this object as parent
    #[must_use]
    pub fn load<P: PageObject<D>>(&self, root: ElementRef) -> P {
        P::from_base(
            PageBase::new(Arc::clone(&self.session), root, P::COMPONENT)
                .with_parent(self.root.clone()),
        )
    }

    /// Default budget with the configured poll interval
    pub fn default_wait(&self) -> WaitOptions {
        self.config().default_wait()
    }
}

/// A UI region backed by one root handle.
///
/// Implementors only supply construction and access to their [`PageBase`];
/// loading and waiting have defaults that region types override when
/// "displayed" is not the right readiness signal.
#[async_trait]
pub trait PageObject<D: UiDriver>: Sized + Send + Sync {
    /// Locator table component this page object reads
    const COMPONENT: &'static str;

    /// Wrap a base
    fn from_base(base: PageBase<D>) -> Self;

    /// Access the base
    fn base(&self) -> &PageBase<D>;

    /// The root handle
    fn elem(&self) -> &ElementRef {
        self.base().root()
    }

    /// Whether the region is ready for reads
    async fn is_loaded(&self) -> PagekitResult<bool> {
        self.elem().is_displayed_or_absent(self.base().driver()).await
    }

    /// Wait until the root is displayed, then hand the object back
    async fn wait(self) -> PagekitResult<Self> {
        let options = self.base().default_wait();
        let _ = wait_for_displayed(self.base().driver(), self.elem(), &options).await?;
        Ok(self)
    }
}
