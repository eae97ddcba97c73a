//! In-memory browser driver for tests.
//!
//! [`MockDriver`] holds a tree of [`MockElement`]s, each answering to exactly
//! one [`Selector`]. It records every interaction and counts driver calls so
//! tests can assert that authoring errors never reach the browser.
//!
//! ## Example
//!
//! ```
//! use pagebind::mock::{MockDriver, MockElement};
//! use pagebind::{BrowserDriver, Selector};
//!
//! let driver = MockDriver::new();
//! let list = driver.add(MockElement::new("#results"));
//! let row = driver.add_child(&list, MockElement::new("li"));
//! driver.add_child(&row, MockElement::new(".last").text("Alexander"));
//!
//! let found = driver.find_elements(Some(&list), &Selector::css("li")).unwrap();
//! assert_eq!(found, vec![row]);
//! ```

use crate::driver::{BoundingBox, BrowserDriver, ControlHandle};
use crate::locator::Selector;
use crate::result::{AutomationError, AutomationResult};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Declarative description of a mock control
#[derive(Debug, Clone)]
pub struct MockElement {
    selector: Selector,
    text: String,
    attributes: HashMap<String, String>,
    enabled: bool,
    visible: bool,
    bounds: BoundingBox,
}

impl MockElement {
    /// Element answering to a CSS selector
    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self::with_selector(Selector::css(css))
    }

    /// Element answering to an arbitrary selector
    #[must_use]
    pub fn with_selector(selector: Selector) -> Self {
        Self {
            selector,
            text: String::new(),
            attributes: HashMap::new(),
            enabled: true,
            visible: true,
            bounds: BoundingBox::new(0.0, 0.0, 100.0, 20.0),
        }
    }

    /// Set the rendered text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Render the element disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Render the element hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Interaction recorded by the mock driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockInteraction {
    /// Left click on an element id
    Click(String),
    /// Double click on an element id
    DoubleClick(String),
    /// Right click on an element id
    RightClick(String),
    /// Hover over an element id
    Hover(String),
    /// Highlight of an element id
    Highlight(String),
}

#[derive(Debug)]
struct Node {
    handle: ControlHandle,
    parent: Option<usize>,
    element: MockElement,
    present: bool,
    hidden_lookups: usize,
    enable_after: Option<usize>,
    enabled_checks: usize,
    frames: VecDeque<BoundingBox>,
}

#[derive(Debug, Default)]
struct MockState {
    nodes: Vec<Node>,
    interactions: Vec<MockInteraction>,
    calls: usize,
}

impl MockState {
    fn index_of(&self, handle: &ControlHandle) -> AutomationResult<usize> {
        self.nodes
            .iter()
            .position(|node| &node.handle == handle)
            .ok_or_else(|| AutomationError::driver(format!("stale element reference '{}'", handle.id)))
    }

    fn is_within(&self, mut index: usize, scope: usize) -> bool {
        while let Some(parent) = self.nodes[index].parent {
            if parent == scope {
                return true;
            }
            index = parent;
        }
        false
    }

    fn matching(
        &mut self,
        scope: Option<&ControlHandle>,
        selector: &Selector,
    ) -> AutomationResult<Vec<ControlHandle>> {
        self.calls += 1;
        let scope = scope.map(|s| self.index_of(s)).transpose()?;
        let mut found = Vec::new();
        for index in 0..self.nodes.len() {
            if self.nodes[index].element.selector != *selector || !self.nodes[index].present {
                continue;
            }
            if let Some(scope) = scope {
                if !self.is_within(index, scope) {
                    continue;
                }
            }
            let node = &mut self.nodes[index];
            if node.hidden_lookups > 0 {
                node.hidden_lookups -= 1;
                continue;
            }
            found.push(node.handle.clone());
        }
        Ok(found)
    }

    fn node(&mut self, handle: &ControlHandle) -> AutomationResult<&mut Node> {
        self.calls += 1;
        let index = self.index_of(handle)?;
        Ok(&mut self.nodes[index])
    }
}

/// In-memory [`BrowserDriver`]
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, parent: Option<&ControlHandle>, element: MockElement) -> ControlHandle {
        let mut state = self.lock();
        let parent = parent.and_then(|p| state.index_of(p).ok());
        let handle = ControlHandle::new(format!("e{}", state.nodes.len()));
        state.nodes.push(Node {
            handle: handle.clone(),
            parent,
            element,
            present: true,
            hidden_lookups: 0,
            enable_after: None,
            enabled_checks: 0,
            frames: VecDeque::new(),
        });
        handle
    }

    /// Add a top-level element
    pub fn add(&self, element: MockElement) -> ControlHandle {
        self.insert(None, element)
    }

    /// Add an element inside `parent`
    pub fn add_child(&self, parent: &ControlHandle, element: MockElement) -> ControlHandle {
        self.insert(Some(parent), element)
    }

    /// Hide the element from the next `lookups` matching searches
    pub fn appear_after_lookups(&self, handle: &ControlHandle, lookups: usize) {
        let mut state = self.lock();
        if let Ok(index) = state.index_of(handle) {
            state.nodes[index].hidden_lookups = lookups;
        }
    }

    /// Report the element enabled from the `checks`-th enabled check onward
    pub fn enable_after_checks(&self, handle: &ControlHandle, checks: usize) {
        let mut state = self.lock();
        if let Ok(index) = state.index_of(handle) {
            state.nodes[index].enable_after = Some(checks);
        }
    }

    /// Play `frames` as successive bounding boxes; the last frame sticks
    pub fn animate(&self, handle: &ControlHandle, frames: Vec<BoundingBox>) {
        let mut state = self.lock();
        if let Ok(index) = state.index_of(handle) {
            state.nodes[index].frames = frames.into();
        }
    }

    /// Detach the element from the document
    pub fn detach(&self, handle: &ControlHandle) {
        let mut state = self.lock();
        if let Ok(index) = state.index_of(handle) {
            state.nodes[index].present = false;
        }
    }

    /// Interactions performed so far
    #[must_use]
    pub fn interactions(&self) -> Vec<MockInteraction> {
        self.lock().interactions.clone()
    }

    /// Number of driver calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    fn record(
        &self,
        handle: &ControlHandle,
        interaction: fn(String) -> MockInteraction,
    ) -> AutomationResult<()> {
        let mut state = self.lock();
        let node = state.node(handle)?;
        if !node.present {
            return Err(AutomationError::driver(format!(
                "element '{}' is detached",
                handle.id
            )));
        }
        state.interactions.push(interaction(handle.id.clone()));
        Ok(())
    }
}

impl BrowserDriver for MockDriver {
    fn find_element(
        &self,
        scope: Option<&ControlHandle>,
        selector: &Selector,
    ) -> AutomationResult<Option<ControlHandle>> {
        Ok(self.lock().matching(scope, selector)?.into_iter().next())
    }

    fn find_elements(
        &self,
        scope: Option<&ControlHandle>,
        selector: &Selector,
    ) -> AutomationResult<Vec<ControlHandle>> {
        self.lock().matching(scope, selector)
    }

    fn click(&self, handle: &ControlHandle) -> AutomationResult<()> {
        self.record(handle, MockInteraction::Click)
    }

    fn double_click(&self, handle: &ControlHandle) -> AutomationResult<()> {
        self.record(handle, MockInteraction::DoubleClick)
    }

    fn right_click(&self, handle: &ControlHandle) -> AutomationResult<()> {
        self.record(handle, MockInteraction::RightClick)
    }

    fn hover(&self, handle: &ControlHandle) -> AutomationResult<()> {
        self.record(handle, MockInteraction::Hover)
    }

    fn highlight(&self, handle: &ControlHandle) -> AutomationResult<()> {
        self.record(handle, MockInteraction::Highlight)
    }

    fn text(&self, handle: &ControlHandle) -> AutomationResult<String> {
        Ok(self.lock().node(handle)?.element.text.clone())
    }

    fn attribute(&self, handle: &ControlHandle, name: &str) -> AutomationResult<Option<String>> {
        Ok(self.lock().node(handle)?.element.attributes.get(name).cloned())
    }

    fn is_present(&self, handle: &ControlHandle) -> AutomationResult<bool> {
        Ok(self.lock().node(handle)?.present)
    }

    fn is_enabled(&self, handle: &ControlHandle) -> AutomationResult<bool> {
        let mut state = self.lock();
        let node = state.node(handle)?;
        match node.enable_after {
            Some(after) => {
                node.enabled_checks += 1;
                Ok(node.enabled_checks >= after)
            }
            None => Ok(node.element.enabled),
        }
    }

    fn is_visible(&self, handle: &ControlHandle) -> AutomationResult<bool> {
        let mut state = self.lock();
        let node = state.node(handle)?;
        Ok(node.present && node.element.visible)
    }

    fn bounding_box(&self, handle: &ControlHandle) -> AutomationResult<Option<BoundingBox>> {
        let mut state = self.lock();
        let node = state.node(handle)?;
        if !node.present || !node.element.visible {
            return Ok(None);
        }
        if node.frames.len() > 1 {
            return Ok(node.frames.pop_front());
        }
        Ok(Some(node.frames.front().copied().unwrap_or(node.element.bounds)))
    }
}
