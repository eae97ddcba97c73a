//! Browser driver abstraction.
//!
//! pagebind never talks to a browser directly. Everything it needs from the
//! rendered document goes through [`BrowserDriver`], so a WebDriver client, a
//! CDP session or the in-memory [`crate::mock::MockDriver`] can sit behind it.

use crate::locator::Selector;
use crate::result::AutomationResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Opaque handle to a live control in the rendered document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlHandle {
    /// Driver-assigned element identifier
    pub id: String,
}

impl ControlHandle {
    /// Create a new control handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Position and size of a rendered control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Primitive browser operations used by the element locator and actions.
///
/// `scope` restricts a search to descendants of a control; `None` searches
/// the whole document. Lookups report absence as `Ok(None)` / an empty vec and
/// reserve `Err` for driver failures.
pub trait BrowserDriver: Debug + Send + Sync {
    /// Find the first control matching `selector`
    fn find_element(
        &self,
        scope: Option<&ControlHandle>,
        selector: &Selector,
    ) -> AutomationResult<Option<ControlHandle>>;

    /// Find every control matching `selector`, in document order
    fn find_elements(
        &self,
        scope: Option<&ControlHandle>,
        selector: &Selector,
    ) -> AutomationResult<Vec<ControlHandle>>;

    /// Left-click a control
    fn click(&self, handle: &ControlHandle) -> AutomationResult<()>;

    /// Double-click a control
    fn double_click(&self, handle: &ControlHandle) -> AutomationResult<()>;

    /// Right-click a control
    fn right_click(&self, handle: &ControlHandle) -> AutomationResult<()>;

    /// Move the pointer over a control
    fn hover(&self, handle: &ControlHandle) -> AutomationResult<()>;

    /// Visually mark a control before it is acted on
    fn highlight(&self, handle: &ControlHandle) -> AutomationResult<()>;

    /// Rendered text of a control
    fn text(&self, handle: &ControlHandle) -> AutomationResult<String>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, handle: &ControlHandle, name: &str) -> AutomationResult<Option<String>>;

    /// Whether the control is still attached to the document
    fn is_present(&self, handle: &ControlHandle) -> AutomationResult<bool>;

    /// Whether the control accepts input
    fn is_enabled(&self, handle: &ControlHandle) -> AutomationResult<bool>;

    /// Whether the control is displayed
    fn is_visible(&self, handle: &ControlHandle) -> AutomationResult<bool>;

    /// Current bounding box, `None` when not rendered
    fn bounding_box(&self, handle: &ControlHandle) -> AutomationResult<Option<BoundingBox>>;
}
