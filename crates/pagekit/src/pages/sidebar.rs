//! Side bar view: title part and content sections.

use std::fmt;
use std::sync::Arc;

use crate::collection::CollectionReader;
use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::page_object::{PageBase, PageObject};
use crate::pages::tree::CustomTreeSection;
use crate::result::PagekitResult;
use crate::session::Session;

macro_rules! page_object {
    ($name:ident, $component:literal) => {
        impl<D> fmt::Debug for $name<D> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("base", &self.base)
                    .finish()
            }
        }

        impl<D: UiDriver> PageObject<D> for $name<D> {
            const COMPONENT: &'static str = $component;

            fn from_base(base: PageBase<D>) -> Self {
                Self { base }
            }

            fn base(&self) -> &PageBase<D> {
                &self.base
            }
        }
    };
}

/// The side bar of the workbench
pub struct SideBarView<D> {
    base: PageBase<D>,
}

page_object!(SideBarView, "SideBarView");

impl<D: UiDriver> SideBarView<D> {
    /// The side bar part of the workbench
    pub fn new(session: Arc<Session<D>>) -> PagekitResult<Self> {
        Ok(Self::from_base(PageBase::at(
            session,
            &ElementRef::root(),
            Self::COMPONENT,
            "elem",
        )?))
    }

    /// Top part of the open view (title and actions)
    pub fn title_part(&self) -> PagekitResult<ViewTitlePart<D>> {
        let locator = self.base.locator_in(ViewTitlePart::<D>::COMPONENT, "elem")?;
        Ok(self.base.load(self.elem().child(locator)))
    }

    /// Content part of the open view
    pub fn content(&self) -> PagekitResult<ViewContent<D>> {
        let locator = self.base.locator_in(ViewContent::<D>::COMPONENT, "elem")?;
        Ok(self.base.load(self.elem().child(locator)))
    }
}

/// Title bar of a side bar view
pub struct ViewTitlePart<D> {
    base: PageBase<D>,
}

page_object!(ViewTitlePart, "ViewTitlePart");

impl<D: UiDriver> ViewTitlePart<D> {
    /// Displayed title
    pub async fn title(&self) -> PagekitResult<String> {
        self.base.child("title")?.text(self.base.driver()).await
    }
}

/// Content area of a side bar view, made of collapsible sections
pub struct ViewContent<D> {
    base: PageBase<D>,
}

page_object!(ViewContent, "ViewContent");

impl<D: UiDriver> ViewContent<D> {
    /// All sections, in rendered order
    pub async fn sections(&self) -> PagekitResult<Vec<ViewSection<D>>> {
        CollectionReader::new(self.elem().clone(), self.base.locator("section")?)
            .read(&self.base)
            .await
    }

    /// The section titled `title`, as a custom tree section
    pub async fn custom_tree_section(
        &self,
        title: &str,
    ) -> PagekitResult<Option<CustomTreeSection<D>>> {
        for section in self.sections().await? {
            if section.title().await? == title {
                return Ok(Some(section.into_custom_tree()));
            }
        }
        Ok(None)
    }
}

/// One collapsible section of a [`ViewContent`]
pub struct ViewSection<D> {
    base: PageBase<D>,
}

page_object!(ViewSection, "ViewSection");

impl<D: UiDriver> ViewSection<D> {
    /// Section title from its header
    pub async fn title(&self) -> PagekitResult<String> {
        let locator = self.base.locator_in(ViewContent::<D>::COMPONENT, "sectionTitle")?;
        self.elem().child(locator).text(self.base.driver()).await
    }

    /// Reinterpret the section as a custom tree
    #[must_use]
    pub fn into_custom_tree(self) -> CustomTreeSection<D> {
        let mut base = PageBase::new(
            Arc::clone(self.base.session()),
            self.base.root().clone(),
            CustomTreeSection::<D>::COMPONENT,
        );
        if let Some(parent) = self.base.parent() {
            base = base.with_parent(parent.clone());
        }
        CustomTreeSection::from_base(base)
    }
}
