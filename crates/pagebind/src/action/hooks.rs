//! Pre-action, post-action and locator hooks.
//!
//! A hook is one type implementing [`ActionHook`]. Which pipeline points it
//! takes part in is declared by [`HookType::CAPABILITIES`]; a hook with several
//! capabilities is instantiated once and shared between them.

use super::container::Container;
use super::{Action, ActionContext, ActionResult, ActionScope};
use crate::config::AutomationConfig;
use crate::locator::LookupKey;
use crate::page::Page;
use crate::result::AutomationResult;
use bitflags::bitflags;
use std::any::TypeId;
use std::fmt::{self, Debug};
use std::sync::Arc;

bitflags! {
    /// Pipeline points a hook takes part in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Runs before each action
        const PRE_ACTION = 0b001;
        /// Runs after each action
        const POST_ACTION = 0b010;
        /// Runs before each element lookup
        const LOCATOR_ACTION = 0b100;
    }
}

/// Cross-cutting behaviour around actions and lookups.
///
/// Every method defaults to a no-op, so a hook only overrides the points it
/// declared in its capabilities.
pub trait ActionHook: Debug + Send + Sync {
    /// Called before `action` runs against `scope`; an error stops the pipeline
    fn on_pre_action(
        &self,
        action: &dyn Action,
        scope: &ActionScope<'_>,
        context: &ActionContext,
    ) -> AutomationResult<()> {
        let _ = (action, scope, context);
        Ok(())
    }

    /// Called after `action` ran, whatever its outcome
    fn on_post_action(&self, action: &dyn Action, context: &ActionContext, result: &ActionResult) {
        let _ = (action, context, result);
    }

    /// Called before an element is looked up; an error aborts the lookup
    fn on_locate(&self, page: &Page, key: &LookupKey) -> AutomationResult<()> {
        let _ = (page, key);
        Ok(())
    }
}

/// Static registration data for a hook type
pub trait HookType: ActionHook + Sized + 'static {
    /// Name used in logs
    const NAME: &'static str;
    /// Pipeline points the hook takes part in
    const CAPABILITIES: Capabilities;
}

/// Builds a hook instance through the container
pub type HookFactory = fn(&Container) -> AutomationResult<Arc<dyn ActionHook>>;

/// A hook type known to the repository
#[derive(Clone, Copy)]
pub struct HookRegistration {
    type_id: TypeId,
    name: &'static str,
    capabilities: Capabilities,
    factory: HookFactory,
}

impl Debug for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistration")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl HookRegistration {
    /// Registration for `H`, resolved from the container on instantiation
    #[must_use]
    pub fn of<H: HookType>() -> Self {
        Self {
            type_id: TypeId::of::<H>(),
            name: H::NAME,
            capabilities: H::CAPABILITIES,
            factory: resolve_hook::<H>,
        }
    }

    /// Type identity
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Hook name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared capabilities
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Build an instance
    pub fn instantiate(&self, container: &Container) -> AutomationResult<Arc<dyn ActionHook>> {
        (self.factory)(container)
    }
}

fn resolve_hook<H: HookType>(container: &Container) -> AutomationResult<Arc<dyn ActionHook>> {
    Ok(Arc::new(container.resolve::<H>()?))
}

/// Logs every action and element lookup through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl ActionHook for TracingHook {
    fn on_pre_action(
        &self,
        action: &dyn Action,
        _scope: &ActionScope<'_>,
        context: &ActionContext,
    ) -> AutomationResult<()> {
        tracing::debug!(action = action.name(), element = %context.key(), "action starting");
        Ok(())
    }

    fn on_post_action(&self, action: &dyn Action, context: &ActionContext, result: &ActionResult) {
        match result.error() {
            None => tracing::debug!(action = action.name(), element = %context.key(), "action succeeded"),
            Some(error) => tracing::warn!(
                action = action.name(),
                element = %context.key(),
                error = %error,
                "action failed"
            ),
        }
    }

    fn on_locate(&self, page: &Page, key: &LookupKey) -> AutomationResult<()> {
        tracing::debug!(page = page.name(), element = %key, "locating element");
        Ok(())
    }
}

impl HookType for TracingHook {
    const NAME: &'static str = "tracing";
    const CAPABILITIES: Capabilities = Capabilities::PRE_ACTION
        .union(Capabilities::POST_ACTION)
        .union(Capabilities::LOCATOR_ACTION);
}

/// Highlights each action's target when `highlight_elements` is set.
///
/// The target is looked up once, without waiting and without locator hooks.
/// A target that is undeclared, not yet rendered or cannot be highlighted is
/// left to the action itself to report.
#[derive(Debug, Clone, Default)]
pub struct HighlightPreAction {
    config: AutomationConfig,
}

impl HighlightPreAction {
    /// Create the hook
    #[must_use]
    pub const fn new(config: AutomationConfig) -> Self {
        Self { config }
    }
}

impl ActionHook for HighlightPreAction {
    fn on_pre_action(
        &self,
        _action: &dyn Action,
        scope: &ActionScope<'_>,
        context: &ActionContext,
    ) -> AutomationResult<()> {
        if !self.config.highlight_elements {
            return Ok(());
        }
        let page = scope.page();
        let Ok(property) = scope.locator().property(page, context.key().as_str()) else {
            return Ok(());
        };
        let highlighted = scope
            .driver()
            .find_element(page.scope(), &property.selector)
            .and_then(|found| found.map_or(Ok(()), |handle| scope.driver().highlight(&handle)));
        if let Err(error) = highlighted {
            tracing::debug!(element = %property.name, error = %error, "highlight skipped");
        }
        Ok(())
    }
}

impl HookType for HighlightPreAction {
    const NAME: &'static str = "highlight";
    const CAPABILITIES: Capabilities = Capabilities::PRE_ACTION;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct PreOnly;

    impl ActionHook for PreOnly {}

    impl HookType for PreOnly {
        const NAME: &'static str = "pre-only";
        const CAPABILITIES: Capabilities = Capabilities::PRE_ACTION;
    }

    #[test]
    fn test_registration_carries_declared_data() {
        let registration = HookRegistration::of::<TracingHook>();
        assert_eq!(registration.name(), "tracing");
        assert_eq!(registration.type_id(), TypeId::of::<TracingHook>());
        assert!(registration.capabilities().contains(Capabilities::all()));

        let registration = HookRegistration::of::<PreOnly>();
        assert_eq!(registration.capabilities(), Capabilities::PRE_ACTION);
    }

    #[test]
    fn test_instantiate_resolves_through_container() {
        let mut container = Container::new();
        let registration = HookRegistration::of::<PreOnly>();
        assert!(registration.instantiate(&container).is_err());

        container.register_default::<PreOnly>();
        let hook = registration.instantiate(&container).unwrap();
        let page = Page::new(crate::page::PageDefinition::builder("Home").build());
        hook.on_locate(&page, &LookupKey::new("x")).unwrap();
    }

    mod highlight_tests {
        use super::*;
        use crate::action::builtin::ButtonClickAction;
        use crate::clock::ManualClock;
        use crate::element::ElementLocator;
        use crate::locator::Selector;
        use crate::mock::{MockDriver, MockElement, MockInteraction};
        use crate::page::PageDefinition;
        use crate::wait::WaitEngine;
        use std::time::Duration;

        fn home() -> Page {
            Page::new(
                PageDefinition::builder("Home")
                    .button("Save", Selector::id("save"))
                    .button("Later", Selector::id("later"))
                    .build(),
            )
        }

        fn run(hook: &HighlightPreAction, driver: &MockDriver, element: &str) -> AutomationResult<()> {
            let wait = WaitEngine::new(Duration::from_millis(300), Duration::from_millis(100))
                .with_clock(Arc::new(ManualClock::new()));
            let page = home();
            let scope = ActionScope::new(&page, ElementLocator::new(driver, &wait));
            hook.on_pre_action(
                &ButtonClickAction::default(),
                &scope,
                &ActionContext::new(element),
            )
        }

        fn enabled() -> HighlightPreAction {
            HighlightPreAction::new(AutomationConfig::default().with_highlight_elements(true))
        }

        #[test]
        fn test_highlights_declared_target() {
            let driver = MockDriver::new();
            let save = driver.add(MockElement::with_selector(Selector::id("save")));

            run(&enabled(), &driver, "save").unwrap();
            assert_eq!(driver.interactions(), vec![MockInteraction::Highlight(save.id)]);
        }

        #[test]
        fn test_disabled_by_default() {
            let driver = MockDriver::new();
            let _ = driver.add(MockElement::with_selector(Selector::id("save")));

            run(&HighlightPreAction::default(), &driver, "Save").unwrap();
            assert_eq!(driver.call_count(), 0);
            assert!(driver.interactions().is_empty());
        }

        #[test]
        fn test_missing_targets_never_veto_the_action() {
            let driver = MockDriver::new();

            run(&enabled(), &driver, "Delete").unwrap();
            assert_eq!(driver.call_count(), 0);

            run(&enabled(), &driver, "Later").unwrap();
            assert_eq!(driver.call_count(), 1);
            assert!(driver.interactions().is_empty());
        }

        #[test]
        fn test_registered_as_pre_action_only() {
            let registration = HookRegistration::of::<HighlightPreAction>();
            assert_eq!(registration.name(), "highlight");
            assert_eq!(registration.capabilities(), Capabilities::PRE_ACTION);
        }
    }

    #[test]
    fn test_debug_names_the_hook() {
        let text = format!("{:?}", HookRegistration::of::<TracingHook>());
        assert!(text.contains("tracing"));
    }
}
