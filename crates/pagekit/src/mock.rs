//! Mock driver for unit testing
//!
//! [`MockDriver`] keeps an in-memory node tree instead of a real browser.
//! Nodes list the raw selector strings they answer to, so a lookup matches
//! when the locator's selector string is one of them. Windows each own a
//! document; iframe nodes own a nested document that is only searchable after
//! switching into the frame.
//!
//! Dynamic behaviour (virtualized scrolling, lists growing while read,
//! submenus opening on click) is scripted with hooks that receive the tree
//! mutably.
//!
//! ```ignore
//! let driver = MockDriver::new();
//! let menu = driver.with_dom(|dom| dom.add(dom.root(), MockNode::matching(".menu")));
//! driver.on_click(move |dom, clicked| dom.set_displayed(menu, clicked != menu));
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::driver::{FrameTarget, Key, UiDriver, WindowHandle};
use crate::locator::Locator;
use crate::result::{PagekitError, PagekitResult};

/// Index of a node in the mock tree
pub type NodeId = usize;

/// A node in the mock tree
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Raw selector strings this node matches
    pub selectors: Vec<String>,
    /// Rendered text
    pub text: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Whether the node is painted
    pub displayed: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    document: NodeId,
    frame_content: Option<NodeId>,
    detached: bool,
}

impl MockNode {
    /// A displayed node answering to one selector
    #[must_use]
    pub fn matching(selector: &str) -> Self {
        Self {
            selectors: vec![selector.to_string()],
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
            children: Vec::new(),
            parent: None,
            document: 0,
            frame_content: None,
            detached: false,
        }
    }

    /// Answer to one more selector
    #[must_use]
    pub fn also(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Mark the node as not painted
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }
}

#[derive(Debug, Clone)]
struct MockWindow {
    handle: WindowHandle,
    title: String,
    root: NodeId,
}

/// The mutable state behind a [`MockDriver`]
#[derive(Debug)]
pub struct MockDom {
    nodes: Vec<MockNode>,
    windows: Vec<MockWindow>,
    current_window: usize,
    current_document: NodeId,
}

impl Default for MockDom {
    fn default() -> Self {
        let mut root = MockNode::matching(":root");
        root.document = 0;
        Self {
            nodes: vec![root],
            windows: vec![MockWindow {
                handle: WindowHandle::new("window-0"),
                title: "Workbench".to_string(),
                root: 0,
            }],
            current_window: 0,
            current_document: 0,
        }
    }
}

impl MockDom {
    /// Document root of the first window
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.windows[0].root
    }

    /// Append a node under `parent`
    pub fn add(&mut self, parent: NodeId, mut node: MockNode) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.document = self.nodes[parent].document;
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Append an iframe node under `parent`; returns `(iframe, content_root)`
    pub fn add_frame(&mut self, parent: NodeId, node: MockNode) -> (NodeId, NodeId) {
        let frame = self.add(parent, node);
        let content = self.new_document();
        self.nodes[frame].frame_content = Some(content);
        (frame, content)
    }

    /// Open another top-level window; returns its document root
    pub fn add_window(&mut self, handle: &str, title: &str) -> NodeId {
        let root = self.new_document();
        self.windows.push(MockWindow {
            handle: WindowHandle::new(handle),
            title: title.to_string(),
            root,
        });
        root
    }

    fn new_document(&mut self) -> NodeId {
        let id = self.nodes.len();
        let mut root = MockNode::matching(":root");
        root.document = id;
        self.nodes.push(root);
        id
    }

    /// Borrow a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &MockNode {
        &self.nodes[id]
    }

    /// Children of a node, in order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Replace a node's text
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id].text = text.to_string();
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let _ = self.nodes[id]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        let _ = self.nodes[id].attributes.remove(name);
    }

    /// Show or hide a node
    pub fn set_displayed(&mut self, id: NodeId, displayed: bool) {
        self.nodes[id].displayed = displayed;
    }

    /// Detach a node (and its subtree) from the tree
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.nodes[next].detached = true;
            stack.extend(self.nodes[next].children.iter().copied());
        }
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.nodes[id].children.clone() {
            self.detach(child);
        }
    }

    /// Change a window's title
    pub fn set_title(&mut self, handle: &str, title: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.handle.as_str() == handle) {
            window.title = title.to_string();
        }
    }

    /// Document the driver currently searches in
    #[must_use]
    pub const fn current_document(&self) -> NodeId {
        self.current_document
    }

    /// Handle of the window with automation focus
    #[must_use]
    pub fn current_window(&self) -> &WindowHandle {
        &self.windows[self.current_window].handle
    }

    fn check_live(&self, id: NodeId) -> PagekitResult<()> {
        let node = self.nodes.get(id).ok_or_else(|| PagekitError::driver("unknown node"))?;
        if node.detached {
            return Err(PagekitError::driver(format!(
                "stale element reference: node {id} is detached"
            )));
        }
        if node.document != self.current_document {
            return Err(PagekitError::driver(format!(
                "stale element reference: node {id} is not in the current frame"
            )));
        }
        Ok(())
    }

    fn descendants(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(scope, selector, &mut out);
        out
    }

    fn walk(&self, id: NodeId, selector: &str, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            if self.nodes[child].selectors.iter().any(|s| s == selector) {
                out.push(child);
            }
            self.walk(child, selector, out);
        }
    }
}

type KeysHook = Box<dyn FnMut(&mut MockDom, Option<NodeId>, &[Key]) + Send>;
type ClickHook = Box<dyn FnMut(&mut MockDom, NodeId) + Send>;
type FindHook = Box<dyn FnMut(&mut MockDom, &Locator) + Send>;

#[derive(Default)]
struct MockHooks {
    keys: Vec<KeysHook>,
    click: Vec<ClickHook>,
    find: Vec<FindHook>,
}

/// In-memory [`UiDriver`] with scripted behaviour and a call log
#[derive(Default)]
pub struct MockDriver {
    dom: Mutex<MockDom>,
    hooks: Mutex<MockHooks>,
    calls: Mutex<Vec<String>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("dom", &self.dom)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDriver {
    /// Create new mock driver with a single empty window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect or mutate the tree
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        f(&mut lock(&self.dom))
    }

    /// Run `hook` on every key input; receives the target node (`None` for
    /// focused-element input)
    pub fn on_keys(&self, hook: impl FnMut(&mut MockDom, Option<NodeId>, &[Key]) + Send + 'static) {
        lock(&self.hooks).keys.push(Box::new(hook));
    }

    /// Run `hook` after every click
    pub fn on_click(&self, hook: impl FnMut(&mut MockDom, NodeId) + Send + 'static) {
        lock(&self.hooks).click.push(Box::new(hook));
    }

    /// Run `hook` before every lookup
    pub fn on_find(&self, hook: impl FnMut(&mut MockDom, &Locator) + Send + 'static) {
        lock(&self.hooks).find.push(Box::new(hook));
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        lock(&self.calls).iter().any(|c| c.starts_with(method))
    }

    /// Count calls whose log line starts with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Forget the call history
    pub fn clear_history(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn run_find_hooks(&self, locator: &Locator) {
        let mut hooks = lock(&self.hooks);
        let mut dom = lock(&self.dom);
        for hook in &mut hooks.find {
            hook(&mut dom, locator);
        }
    }

    fn lookup(&self, scope: Option<&NodeId>, locator: &Locator) -> PagekitResult<Vec<NodeId>> {
        self.run_find_hooks(locator);
        let dom = lock(&self.dom);
        let scope = match scope {
            Some(&id) => {
                dom.check_live(id)?;
                id
            }
            None => dom.current_document,
        };
        Ok(dom.descendants(scope, locator.selector().as_str()))
    }

    fn read_node<R>(&self, id: NodeId, f: impl FnOnce(&MockNode) -> R) -> PagekitResult<R> {
        let dom = lock(&self.dom);
        dom.check_live(id)?;
        Ok(f(&dom.nodes[id]))
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    type Element = NodeId;

    async fn find_element(
        &self,
        scope: Option<&NodeId>,
        locator: &Locator,
    ) -> PagekitResult<Option<NodeId>> {
        self.record(format!("find_element:{}", locator.selector().as_str()));
        Ok(self.lookup(scope, locator)?.into_iter().next())
    }

    async fn find_elements(
        &self,
        scope: Option<&NodeId>,
        locator: &Locator,
    ) -> PagekitResult<Vec<NodeId>> {
        self.record(format!("find_elements:{}", locator.selector().as_str()));
        self.lookup(scope, locator)
    }

    async fn text(&self, element: &NodeId) -> PagekitResult<String> {
        self.read_node(*element, |n| n.text.clone())
    }

    async fn attribute(&self, element: &NodeId, name: &str) -> PagekitResult<Option<String>> {
        self.read_node(*element, |n| n.attributes.get(name).cloned())
    }

    async fn is_displayed(&self, element: &NodeId) -> PagekitResult<bool> {
        self.read_node(*element, |n| n.displayed)
    }

    async fn click(&self, element: &NodeId) -> PagekitResult<()> {
        self.record(format!("click:{element}"));
        self.read_node(*element, |_| ())?;
        let mut hooks = lock(&self.hooks);
        let mut dom = lock(&self.dom);
        for hook in &mut hooks.click {
            hook(&mut dom, *element);
        }
        Ok(())
    }

    async fn send_keys_to(&self, element: &NodeId, keys: &[Key]) -> PagekitResult<()> {
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        self.record(format!("send_keys_to:{element}:{}", names.join("+")));
        self.read_node(*element, |_| ())?;
        let mut hooks = lock(&self.hooks);
        let mut dom = lock(&self.dom);
        for hook in &mut hooks.keys {
            hook(&mut dom, Some(*element), keys);
        }
        Ok(())
    }

    async fn send_keys(&self, keys: &[Key]) -> PagekitResult<()> {
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        self.record(format!("send_keys:{}", names.join("+")));
        let mut hooks = lock(&self.hooks);
        let mut dom = lock(&self.dom);
        for hook in &mut hooks.keys {
            hook(&mut dom, None, keys);
        }
        Ok(())
    }

    async fn window_handles(&self) -> PagekitResult<Vec<WindowHandle>> {
        self.record("window_handles".to_string());
        Ok(lock(&self.dom).windows.iter().map(|w| w.handle.clone()).collect())
    }

    async fn window_handle(&self) -> PagekitResult<WindowHandle> {
        self.record("window_handle".to_string());
        let dom = lock(&self.dom);
        Ok(dom.windows[dom.current_window].handle.clone())
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> PagekitResult<()> {
        self.record(format!("switch_to_window:{handle}"));
        let mut dom = lock(&self.dom);
        let index = dom
            .windows
            .iter()
            .position(|w| &w.handle == handle)
            .ok_or_else(|| PagekitError::driver(format!("no such window: {handle}")))?;
        dom.current_window = index;
        dom.current_document = dom.windows[index].root;
        Ok(())
    }

    async fn title(&self) -> PagekitResult<String> {
        self.record("title".to_string());
        let dom = lock(&self.dom);
        Ok(dom.windows[dom.current_window].title.clone())
    }

    async fn switch_to_frame(&self, target: FrameTarget<'_, NodeId>) -> PagekitResult<()> {
        let mut dom = lock(&self.dom);
        let frame = match target {
            FrameTarget::Index(index) => {
                self.record(format!("switch_to_frame:index:{index}"));
                let mut frames = Vec::new();
                collect_frames(&dom, dom.current_document, &mut frames);
                frames
                    .get(usize::from(index))
                    .copied()
                    .ok_or_else(|| PagekitError::driver(format!("no such frame: {index}")))?
            }
            FrameTarget::Element(&id) => {
                self.record(format!("switch_to_frame:element:{id}"));
                dom.check_live(id)?;
                id
            }
        };
        let content = dom.nodes[frame]
            .frame_content
            .ok_or_else(|| PagekitError::driver(format!("node {frame} is not a frame")))?;
        dom.current_document = content;
        Ok(())
    }
}

fn collect_frames(dom: &MockDom, id: NodeId, out: &mut Vec<NodeId>) {
    for &child in &dom.nodes[id].children {
        if dom.nodes[child].frame_content.is_some() {
            out.push(child);
        }
        collect_frames(dom, child, out);
    }
}
