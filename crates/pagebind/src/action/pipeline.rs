//! Action Pipeline
//!
//! Runs one action with its hooks:
//!
//! ```text
//! create A -> pre-actions (fail fast) -> A.execute -> post-actions -> result
//! ```
//!
//! Post-actions run whether the action succeeded or failed and never change
//! its result. A failing pre-action is returned as the result; neither the
//! action nor the post-actions run. Nothing is retried here.

use super::repository::ActionRepository;
use super::{Action, ActionContext, ActionResult, ActionScope};
use crate::config::AutomationConfig;
use crate::driver::BrowserDriver;
use crate::element::ElementLocator;
use crate::page::Page;
use crate::wait::WaitEngine;
use std::sync::Arc;
use uuid::Uuid;

/// Dispatches actions through the repository's hooks
#[derive(Debug, Clone)]
pub struct ActionPipeline {
    repository: Arc<ActionRepository>,
    driver: Arc<dyn BrowserDriver>,
    wait: WaitEngine,
}

impl ActionPipeline {
    /// Create a pipeline
    #[must_use]
    pub fn new(
        repository: Arc<ActionRepository>,
        driver: Arc<dyn BrowserDriver>,
        wait: WaitEngine,
    ) -> Self {
        Self {
            repository,
            driver,
            wait,
        }
    }

    /// Create a pipeline whose waits follow `config`
    #[must_use]
    pub fn from_config(
        repository: Arc<ActionRepository>,
        driver: Arc<dyn BrowserDriver>,
        config: &AutomationConfig,
    ) -> Self {
        Self::new(repository, driver, WaitEngine::from_config(config))
    }

    /// Hook and action repository
    #[must_use]
    pub const fn repository(&self) -> &Arc<ActionRepository> {
        &self.repository
    }

    /// Browser driver
    #[must_use]
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Wait engine handed to actions
    #[must_use]
    pub const fn wait_engine(&self) -> &WaitEngine {
        &self.wait
    }

    /// Build `A` through the repository and run it against `page`
    pub fn perform<A: Action + 'static>(&self, page: &Page, context: &ActionContext) -> ActionResult {
        match self.repository.create_action::<A>() {
            Ok(action) => self.perform_action(&action, page, context),
            Err(error) => {
                tracing::warn!(
                    action = std::any::type_name::<A>(),
                    error = %error,
                    "action could not be constructed"
                );
                ActionResult::failure(error)
            }
        }
    }

    /// Run an already constructed action against `page`
    pub fn perform_action(
        &self,
        action: &dyn Action,
        page: &Page,
        context: &ActionContext,
    ) -> ActionResult {
        let invocation = Uuid::new_v4();
        let span = tracing::debug_span!(
            "perform",
            %invocation,
            action = action.name(),
            page = page.name(),
            element = %context.key()
        );
        let _entered = span.enter();

        let locator_hooks = self.repository.locator_actions();
        let locator = ElementLocator::new(self.driver.as_ref(), &self.wait).with_hooks(&locator_hooks);
        let scope = ActionScope::new(page, locator);

        for hook in self.repository.pre_actions() {
            if let Err(error) = hook.on_pre_action(action, &scope, context) {
                tracing::warn!(hook = ?hook, error = %error, "pre-action failed");
                return ActionResult::failure(error);
            }
        }

        let result = action.execute(&scope, context);

        for hook in self.repository.post_actions() {
            hook.on_post_action(action, context, &result);
        }

        tracing::debug!(success = result.is_success(), "action finished");
        result
    }
}
