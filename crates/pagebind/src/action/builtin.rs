//! Built-in actions behind the selection steps.

use super::{Action, ActionContext, ActionResult, ActionScope};
use crate::config::AutomationConfig;
use crate::element::{ResolvePolicy, ResolvedElement};
use crate::page::Page;
use crate::result::{AutomationError, AutomationResult};

fn click_policy(config: &AutomationConfig) -> ResolvePolicy {
    if config.wait_for_still_element_before_clicking {
        ResolvePolicy::settled()
    } else {
        ResolvePolicy::attached()
    }
}

fn target<'a>(
    scope: &ActionScope<'a>,
    context: &ActionContext,
    policy: ResolvePolicy,
) -> AutomationResult<ResolvedElement<'a>> {
    scope
        .locator()
        .resolve_with(scope.page(), context.key().as_str(), policy)
}

// =============================================================================
// CLICKS
// =============================================================================

/// Left-clicks a button or link
#[derive(Debug, Clone, Default)]
pub struct ButtonClickAction {
    config: AutomationConfig,
}

impl ButtonClickAction {
    /// Create the action
    #[must_use]
    pub const fn new(config: AutomationConfig) -> Self {
        Self { config }
    }
}

impl Action for ButtonClickAction {
    fn name(&self) -> &'static str {
        "ButtonClickAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        target(scope, context, click_policy(&self.config))
            .and_then(|element| element.click())
            .into()
    }
}

/// Double-clicks an element
#[derive(Debug, Clone, Default)]
pub struct ButtonDoubleClickAction {
    config: AutomationConfig,
}

impl ButtonDoubleClickAction {
    /// Create the action
    #[must_use]
    pub const fn new(config: AutomationConfig) -> Self {
        Self { config }
    }
}

impl Action for ButtonDoubleClickAction {
    fn name(&self) -> &'static str {
        "ButtonDoubleClickAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        target(scope, context, click_policy(&self.config))
            .and_then(|element| element.double_click())
            .into()
    }
}

/// Right-clicks an element
#[derive(Debug, Clone, Default)]
pub struct ButtonRightClickAction {
    config: AutomationConfig,
}

impl ButtonRightClickAction {
    /// Create the action
    #[must_use]
    pub const fn new(config: AutomationConfig) -> Self {
        Self { config }
    }
}

impl Action for ButtonRightClickAction {
    fn name(&self) -> &'static str {
        "ButtonRightClickAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        target(scope, context, click_policy(&self.config))
            .and_then(|element| element.right_click())
            .into()
    }
}

/// Moves the pointer over an element
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverOverElementAction;

impl Action for HoverOverElementAction {
    fn name(&self) -> &'static str {
        "HoverOverElementAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        target(scope, context, ResolvePolicy::attached())
            .and_then(|element| element.hover())
            .into()
    }
}

// =============================================================================
// LIST ITEMS
// =============================================================================

/// Selects a list item by 1-based position; yields the item page
#[derive(Debug, Clone, Copy, Default)]
pub struct GetListItemByIndexAction;

impl GetListItemByIndexAction {
    fn item(scope: &ActionScope<'_>, context: &ActionContext) -> AutomationResult<Page> {
        let index = context.index().ok_or_else(|| AutomationError::InvalidContext {
            action: "GetListItemByIndexAction".to_string(),
            message: "an item index is required".to_string(),
        })?;
        scope
            .lists()
            .get_item_at(scope.page(), context.key().as_str(), index)
    }
}

impl Action for GetListItemByIndexAction {
    fn name(&self) -> &'static str {
        "GetListItemByIndexAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        Self::item(scope, context).into()
    }
}

/// Selects the first list item matching a criteria table; yields the item page
#[derive(Debug, Clone, Copy, Default)]
pub struct GetListItemByCriteriaAction;

impl GetListItemByCriteriaAction {
    fn item(scope: &ActionScope<'_>, context: &ActionContext) -> AutomationResult<Page> {
        let criteria = context.criteria().ok_or_else(|| AutomationError::InvalidContext {
            action: "GetListItemByCriteriaAction".to_string(),
            message: "a criteria table is required".to_string(),
        })?;
        scope
            .lists()
            .find_item(scope.page(), context.key().as_str(), criteria)
    }
}

impl Action for GetListItemByCriteriaAction {
    fn name(&self) -> &'static str {
        "GetListItemByCriteriaAction"
    }

    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult {
        Self::item(scope, context).into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::criteria::ValidationTable;
    use crate::driver::BoundingBox;
    use crate::element::ElementLocator;
    use crate::locator::Selector;
    use crate::mock::{MockDriver, MockElement, MockInteraction};
    use crate::page::PageDefinition;
    use crate::wait::{WaitCondition, WaitEngine};
    use std::sync::Arc;
    use std::time::Duration;

    fn page() -> Page {
        let item = PageDefinition::builder("Row")
            .text("Name", Selector::css(".name"))
            .build();
        Page::new(
            PageDefinition::builder("Toolbar")
                .button("Save", Selector::id("save"))
                .list("Rows", Selector::id("rows"), Selector::css("li"), item)
                .build(),
        )
    }

    fn engine() -> WaitEngine {
        WaitEngine::new(Duration::from_millis(400), Duration::from_millis(100))
            .with_clock(Arc::new(ManualClock::new()))
    }

    mod click_tests {
        use super::*;

        #[test]
        fn test_each_click_action_records_its_interaction() {
            let driver = MockDriver::new();
            let save = driver.add(MockElement::with_selector(Selector::id("save")));
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));
            let context = ActionContext::new("save");
            let config = AutomationConfig::default();

            ButtonClickAction::new(config.clone()).execute(&scope, &context).check().unwrap();
            ButtonDoubleClickAction::new(config.clone()).execute(&scope, &context).check().unwrap();
            ButtonRightClickAction::new(config).execute(&scope, &context).check().unwrap();
            HoverOverElementAction.execute(&scope, &context).check().unwrap();

            assert_eq!(
                driver.interactions(),
                vec![
                    MockInteraction::Click(save.id.clone()),
                    MockInteraction::DoubleClick(save.id.clone()),
                    MockInteraction::RightClick(save.id.clone()),
                    MockInteraction::Hover(save.id),
                ]
            );
        }

        #[test]
        fn test_right_click_waits_for_still_element_when_configured() {
            let driver = MockDriver::new();
            let save = driver.add(MockElement::with_selector(Selector::id("save")));
            driver.animate(
                &save,
                vec![
                    BoundingBox::new(0.0, 0.0, 80.0, 20.0),
                    BoundingBox::new(0.0, 30.0, 80.0, 20.0),
                ],
            );
            driver.enable_after_checks(&save, 3);
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));
            let config = AutomationConfig::default().with_wait_for_still_element(true);

            ButtonRightClickAction::new(config)
                .execute(&scope, &ActionContext::new("Save"))
                .check()
                .unwrap();
            assert_eq!(driver.interactions(), vec![MockInteraction::RightClick(save.id)]);
        }

        #[test]
        fn test_click_without_stillness_ignores_disabled_state() {
            let driver = MockDriver::new();
            let _ = driver.add(MockElement::with_selector(Selector::id("save")).disabled());
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));

            ButtonClickAction::default()
                .execute(&scope, &ActionContext::new("Save"))
                .check()
                .unwrap();
        }

        #[test]
        fn test_click_with_stillness_times_out_on_disabled_element() {
            let driver = MockDriver::new();
            let _ = driver.add(MockElement::with_selector(Selector::id("save")).disabled());
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));
            let config = AutomationConfig::default().with_wait_for_still_element(true);

            let result = ButtonClickAction::new(config).execute(&scope, &ActionContext::new("Save"));
            assert!(matches!(
                result.error(),
                Some(AutomationError::Timeout { condition: WaitCondition::BecomesEnabled, .. })
            ));
            assert!(driver.interactions().is_empty());
        }

        #[test]
        fn test_undeclared_target_fails() {
            let driver = MockDriver::new();
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));

            let result = HoverOverElementAction.execute(&scope, &ActionContext::new("Cancel"));
            assert!(matches!(result.error(), Some(AutomationError::ElementNotDefined { .. })));
        }
    }

    mod list_tests {
        use super::*;

        fn render(driver: &MockDriver) {
            let rows = driver.add(MockElement::with_selector(Selector::id("rows")));
            for name in ["alpha", "beta"] {
                let row = driver.add_child(&rows, MockElement::new("li"));
                let _ = driver.add_child(&row, MockElement::new(".name").text(name));
            }
        }

        #[test]
        fn test_index_and_criteria_yield_item_pages() {
            let driver = MockDriver::new();
            render(&driver);
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));

            let by_index = GetListItemByIndexAction
                .execute(&scope, &ActionContext::with_index("Rows", 2))
                .into_page()
                .unwrap();
            let criteria = ValidationTable::from_rows([["Name", "Equals", "beta"]]).unwrap();
            let by_criteria = GetListItemByCriteriaAction
                .execute(&scope, &ActionContext::with_criteria("Rows", criteria))
                .into_page()
                .unwrap();

            assert_eq!(by_index, by_criteria);
            assert_eq!(by_index.name(), "Row");
        }

        #[test]
        fn test_missing_parameters_are_invalid_context() {
            let driver = MockDriver::new();
            let wait = engine();
            let page = page();
            let scope = ActionScope::new(&page, ElementLocator::new(&driver, &wait));

            let result = GetListItemByIndexAction.execute(&scope, &ActionContext::new("Rows"));
            assert!(matches!(result.error(), Some(AutomationError::InvalidContext { .. })));

            let result = GetListItemByCriteriaAction.execute(&scope, &ActionContext::with_index("Rows", 1));
            assert!(matches!(result.error(), Some(AutomationError::InvalidContext { .. })));
        }
    }
}
