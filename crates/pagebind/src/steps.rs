//! Selection step handlers.
//!
//! Entry points a BDD runner binds its step text to, once it has extracted the
//! arguments. Each handler reads the current page from the
//! [`ScenarioContext`], dispatches a built-in action through the
//! [`ActionPipeline`] and, for list steps, replaces the page context with the
//! selected item.

use crate::action::builtin::{
    ButtonClickAction, ButtonDoubleClickAction, ButtonRightClickAction, GetListItemByCriteriaAction,
    GetListItemByIndexAction, HoverOverElementAction,
};
use crate::action::pipeline::ActionPipeline;
use crate::action::{Action, ActionContext};
use crate::criteria::ValidationTable;
use crate::page::Page;
use crate::result::{AutomationError, AutomationResult};

/// Per-scenario state shared between steps
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    page: Option<Page>,
}

impl ScenarioContext {
    /// Create a context with no page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page.
    ///
    /// # Errors
    ///
    /// [`AutomationError::NoPageContext`] before any page was set.
    pub fn current_page(&self) -> AutomationResult<&Page> {
        self.page.as_ref().ok_or(AutomationError::NoPageContext)
    }

    /// Replace the current page
    pub fn set_page(&mut self, page: Page) {
        tracing::debug!(page = page.name(), scoped = page.scope().is_some(), "page context updated");
        self.page = Some(page);
    }
}

/// Click, hover and list selection steps
#[derive(Debug)]
pub struct SelectionSteps {
    pipeline: ActionPipeline,
    scenario: ScenarioContext,
}

impl SelectionSteps {
    /// Create handlers over `pipeline` with an empty scenario
    #[must_use]
    pub fn new(pipeline: ActionPipeline) -> Self {
        Self {
            pipeline,
            scenario: ScenarioContext::new(),
        }
    }

    /// Scenario state
    #[must_use]
    pub const fn scenario(&self) -> &ScenarioContext {
        &self.scenario
    }

    /// Mutable scenario state, for navigation steps
    pub fn scenario_mut(&mut self) -> &mut ScenarioContext {
        &mut self.scenario
    }

    /// "I choose {element}"
    pub fn choose(&self, element: &str) -> AutomationResult<()> {
        self.run::<ButtonClickAction>(ActionContext::new(element))
    }

    /// "I click {element}"
    pub fn click(&self, element: &str) -> AutomationResult<()> {
        self.run::<ButtonClickAction>(ActionContext::new(element))
    }

    /// "I double-click {element}"
    pub fn double_click(&self, element: &str) -> AutomationResult<()> {
        self.run::<ButtonDoubleClickAction>(ActionContext::new(element))
    }

    /// "I right-click {element}"
    pub fn right_click(&self, element: &str) -> AutomationResult<()> {
        self.run::<ButtonRightClickAction>(ActionContext::new(element))
    }

    /// "I hover over {element}"
    pub fn hover_over(&self, element: &str) -> AutomationResult<()> {
        self.run::<HoverOverElementAction>(ActionContext::new(element))
    }

    /// "I am on list {list} item {index}"; the item becomes the page context
    pub fn ensure_on_list_item(&mut self, list: &str, index: usize) -> AutomationResult<()> {
        let item = self
            .pipeline
            .perform::<GetListItemByIndexAction>(
                self.scenario.current_page()?,
                &ActionContext::with_index(list, index),
            )
            .into_page()?;
        self.scenario.set_page(item);
        Ok(())
    }

    /// "I am on {list} list item matching criteria"; the item becomes the page context
    pub fn go_to_list_item_matching(
        &mut self,
        list: &str,
        criteria: ValidationTable,
    ) -> AutomationResult<()> {
        let item = self
            .pipeline
            .perform::<GetListItemByCriteriaAction>(
                self.scenario.current_page()?,
                &ActionContext::with_criteria(list, criteria),
            )
            .into_page()?;
        self.scenario.set_page(item);
        Ok(())
    }

    fn run<A: Action + 'static>(&self, context: ActionContext) -> AutomationResult<()> {
        self.pipeline
            .perform::<A>(self.scenario.current_page()?, &context)
            .check()
    }
}
