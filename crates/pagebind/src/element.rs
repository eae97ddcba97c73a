//! Element Locator Chain
//!
//! Turns a logical element name into a live control:
//!
//! 1. normalize the name and look it up on the page definition, failing with
//!    [`AutomationError::ElementNotDefined`] before touching the driver;
//! 2. run every locator hook in registration order;
//! 3. poll the driver until the declared selector is attached, scoped to the
//!    page's scope control for list items.

use crate::action::hooks::ActionHook;
use crate::driver::{BrowserDriver, ControlHandle};
use crate::locator::LookupKey;
use crate::page::{Page, PropertyMetadata};
use crate::result::{AutomationError, AutomationResult};
use crate::wait::{WaitCondition, WaitEngine, WaitOutcome};
use std::sync::Arc;
use std::time::Duration;

/// Extra waits applied after an element is attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Wait for the element to stop moving and become enabled
    pub wait_for_stillness: bool,
}

impl ResolvePolicy {
    /// Only wait for the element to be attached
    #[must_use]
    pub const fn attached() -> Self {
        Self {
            wait_for_stillness: false,
        }
    }

    /// Also wait for the element to settle and become enabled
    #[must_use]
    pub const fn settled() -> Self {
        Self {
            wait_for_stillness: true,
        }
    }
}

/// Resolves logical element names against a page
#[derive(Debug, Clone, Copy)]
pub struct ElementLocator<'a> {
    driver: &'a dyn BrowserDriver,
    wait: &'a WaitEngine,
    hooks: &'a [Arc<dyn ActionHook>],
}

impl<'a> ElementLocator<'a> {
    /// Create a locator with no locator hooks
    #[must_use]
    pub const fn new(driver: &'a dyn BrowserDriver, wait: &'a WaitEngine) -> Self {
        Self {
            driver,
            wait,
            hooks: &[],
        }
    }

    /// Run `hooks` before every lookup
    #[must_use]
    pub const fn with_hooks(mut self, hooks: &'a [Arc<dyn ActionHook>]) -> Self {
        self.hooks = hooks;
        self
    }

    /// Driver used for lookups
    #[must_use]
    pub fn driver(&self) -> &'a dyn BrowserDriver {
        self.driver
    }

    /// Wait engine used for lookups
    #[must_use]
    pub const fn wait_engine(&self) -> &'a WaitEngine {
        self.wait
    }

    /// Declared metadata for `name`.
    ///
    /// # Errors
    ///
    /// [`AutomationError::ElementNotDefined`] if the page does not declare it.
    pub fn property<'p>(&self, page: &'p Page, name: &str) -> AutomationResult<&'p PropertyMetadata> {
        let key = LookupKey::new(name);
        page.property(&key)
            .ok_or_else(|| AutomationError::ElementNotDefined {
                page: page.name().to_string(),
                element: key.as_str().to_string(),
            })
    }

    /// Resolve `name` to an attached control.
    ///
    /// # Errors
    ///
    /// [`AutomationError::ElementNotDefined`], a locator hook's error,
    /// [`AutomationError::Timeout`] if the control never attaches, or a driver error.
    pub fn resolve(&self, page: &Page, name: &str) -> AutomationResult<ResolvedElement<'a>> {
        self.resolve_with(page, name, ResolvePolicy::attached())
    }

    /// Resolve `name`, applying the extra waits in `policy`
    pub fn resolve_with(
        &self,
        page: &Page,
        name: &str,
        policy: ResolvePolicy,
    ) -> AutomationResult<ResolvedElement<'a>> {
        let property = self.property(page, name)?;
        let key = LookupKey::new(name);

        for hook in self.hooks {
            hook.on_locate(page, &key)?;
        }

        let mut found = None;
        self.wait.wait_for_named(
            || {
                found = self.driver.find_element(page.scope(), &property.selector)?;
                Ok(found.is_some())
            },
            WaitCondition::Exists,
            &property.name,
            None,
        )?;
        let handle = found.ok_or_else(|| {
            AutomationError::driver(format!("'{}' reported attached without a handle", property.name))
        })?;

        tracing::debug!(
            page = page.name(),
            element = %property.name,
            selector = %property.selector,
            handle = %handle.id,
            "element resolved"
        );

        let element = ResolvedElement {
            name: property.name.clone(),
            handle,
            driver: self.driver,
            wait: self.wait,
        };
        if policy.wait_for_stillness {
            let _ = element.wait_for(WaitCondition::NotMoving, None)?;
            let _ = element.wait_for(WaitCondition::BecomesEnabled, None)?;
        }
        Ok(element)
    }
}

/// A located control bound to the driver that found it
#[derive(Debug, Clone)]
pub struct ResolvedElement<'a> {
    name: String,
    handle: ControlHandle,
    driver: &'a dyn BrowserDriver,
    wait: &'a WaitEngine,
}

impl ResolvedElement<'_> {
    /// Declared element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live control handle
    #[must_use]
    pub const fn handle(&self) -> &ControlHandle {
        &self.handle
    }

    /// Left click
    pub fn click(&self) -> AutomationResult<()> {
        self.driver.click(&self.handle)
    }

    /// Double click
    pub fn double_click(&self) -> AutomationResult<()> {
        self.driver.double_click(&self.handle)
    }

    /// Right click
    pub fn right_click(&self) -> AutomationResult<()> {
        self.driver.right_click(&self.handle)
    }

    /// Move the pointer over the element
    pub fn hover(&self) -> AutomationResult<()> {
        self.driver.hover(&self.handle)
    }

    /// Rendered text
    pub fn text(&self) -> AutomationResult<String> {
        self.driver.text(&self.handle)
    }

    /// Attribute value, if set
    pub fn attribute(&self, name: &str) -> AutomationResult<Option<String>> {
        self.driver.attribute(&self.handle, name)
    }

    /// Whether the element accepts input
    pub fn is_enabled(&self) -> AutomationResult<bool> {
        self.driver.is_enabled(&self.handle)
    }

    /// Wait for the element to reach `condition`
    pub fn wait_for(
        &self,
        condition: WaitCondition,
        timeout: Option<Duration>,
    ) -> AutomationResult<WaitOutcome> {
        self.wait
            .wait_for_element(self.driver, &self.handle, &self.name, condition, timeout)
    }
}
