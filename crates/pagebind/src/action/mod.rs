//! Actions and the values exchanged with the pipeline.
//!
//! An [`Action`] is the core of one step: click a button, pick a list item.
//! It receives an [`ActionScope`] with everything it may touch and an
//! [`ActionContext`] naming its target, and reports an [`ActionResult`].

pub mod builtin;
pub mod container;
pub mod hooks;
pub mod pipeline;
pub mod repository;

use crate::criteria::ValidationTable;
use crate::driver::BrowserDriver;
use crate::element::ElementLocator;
use crate::list::ListItemResolver;
use crate::locator::LookupKey;
use crate::page::Page;
use crate::result::{AutomationError, AutomationResult};
use std::fmt::Debug;

// =============================================================================
// ACTION CONTEXT
// =============================================================================

/// Action-specific parameters
#[derive(Debug, Clone, Default)]
pub enum ActionParameters {
    /// Target element only
    #[default]
    None,
    /// 1-based list position
    Index(usize),
    /// Criteria a list item must satisfy
    Criteria(ValidationTable),
}

/// Target and parameters of one action invocation
#[derive(Debug, Clone)]
pub struct ActionContext {
    key: LookupKey,
    parameters: ActionParameters,
}

impl ActionContext {
    /// Context targeting the element called `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            key: LookupKey::new(name),
            parameters: ActionParameters::None,
        }
    }

    /// Context targeting item `index` of list `name`
    #[must_use]
    pub fn with_index(name: &str, index: usize) -> Self {
        Self {
            key: LookupKey::new(name),
            parameters: ActionParameters::Index(index),
        }
    }

    /// Context targeting the item of list `name` matching `criteria`
    #[must_use]
    pub fn with_criteria(name: &str, criteria: ValidationTable) -> Self {
        Self {
            key: LookupKey::new(name),
            parameters: ActionParameters::Criteria(criteria),
        }
    }

    /// Normalized target key
    #[must_use]
    pub const fn key(&self) -> &LookupKey {
        &self.key
    }

    /// Parameters
    #[must_use]
    pub const fn parameters(&self) -> &ActionParameters {
        &self.parameters
    }

    /// Index parameter, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self.parameters {
            ActionParameters::Index(index) => Some(index),
            _ => None,
        }
    }

    /// Criteria parameter, if any
    #[must_use]
    pub const fn criteria(&self) -> Option<&ValidationTable> {
        match &self.parameters {
            ActionParameters::Criteria(table) => Some(table),
            _ => None,
        }
    }
}

// =============================================================================
// ACTION RESULT
// =============================================================================

/// Payload of a successful action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionValue {
    /// New page context
    Page(Page),
    /// Boolean outcome
    Bool(bool),
    /// Text read from the page
    Text(String),
}

impl ActionValue {
    /// Payload kind for diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Page(_) => "page",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

/// Outcome of an action
#[derive(Debug)]
pub enum ActionResult {
    /// Action succeeded, optionally with a payload
    Success(Option<ActionValue>),
    /// Action failed
    Failure(AutomationError),
}

impl ActionResult {
    /// Success without a payload
    #[must_use]
    pub const fn success() -> Self {
        Self::Success(None)
    }

    /// Success carrying a new page context
    #[must_use]
    pub const fn page(page: Page) -> Self {
        Self::Success(Some(ActionValue::Page(page)))
    }

    /// Failure
    #[must_use]
    pub const fn failure(error: AutomationError) -> Self {
        Self::Failure(error)
    }

    /// Check if the action succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure error, if any
    #[must_use]
    pub const fn error(&self) -> Option<&AutomationError> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) => None,
        }
    }

    /// Convert into a plain result, discarding any payload
    pub fn check(self) -> AutomationResult<()> {
        self.into_value().map(|_| ())
    }

    /// Convert into a plain result keeping the payload
    pub fn into_value(self) -> AutomationResult<Option<ActionValue>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }

    /// Page payload.
    ///
    /// # Errors
    ///
    /// The failure's error, or [`AutomationError::UnexpectedResult`] when the
    /// payload is missing or of another kind.
    pub fn into_page(self) -> AutomationResult<Page> {
        match self.into_value()? {
            Some(ActionValue::Page(page)) => Ok(page),
            other => Err(unexpected("page", other.as_ref())),
        }
    }

    /// Boolean payload
    pub fn into_bool(self) -> AutomationResult<bool> {
        match self.into_value()? {
            Some(ActionValue::Bool(value)) => Ok(value),
            other => Err(unexpected("bool", other.as_ref())),
        }
    }

    /// Text payload
    pub fn into_text(self) -> AutomationResult<String> {
        match self.into_value()? {
            Some(ActionValue::Text(text)) => Ok(text),
            other => Err(unexpected("text", other.as_ref())),
        }
    }
}

fn unexpected(expected: &'static str, actual: Option<&ActionValue>) -> AutomationError {
    AutomationError::UnexpectedResult {
        expected,
        actual: actual.map_or("nothing", ActionValue::kind),
    }
}

impl From<AutomationResult<Option<ActionValue>>> for ActionResult {
    fn from(result: AutomationResult<Option<ActionValue>>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl From<AutomationResult<()>> for ActionResult {
    fn from(result: AutomationResult<()>) -> Self {
        Self::from(result.map(|()| None::<ActionValue>))
    }
}

impl From<AutomationResult<Page>> for ActionResult {
    fn from(result: AutomationResult<Page>) -> Self {
        Self::from(result.map(|page| Some(ActionValue::Page(page))))
    }
}

// =============================================================================
// ACTION
// =============================================================================

/// Everything an action may touch during one invocation
#[derive(Debug, Clone, Copy)]
pub struct ActionScope<'a> {
    page: &'a Page,
    locator: ElementLocator<'a>,
}

impl<'a> ActionScope<'a> {
    /// Create a scope for `page`
    #[must_use]
    pub const fn new(page: &'a Page, locator: ElementLocator<'a>) -> Self {
        Self { page, locator }
    }

    /// Current page context
    #[must_use]
    pub const fn page(&self) -> &'a Page {
        self.page
    }

    /// Element locator bound to the pipeline's driver and hooks
    #[must_use]
    pub const fn locator(&self) -> &ElementLocator<'a> {
        &self.locator
    }

    /// List resolver sharing the scope's locator
    #[must_use]
    pub const fn lists(&self) -> ListItemResolver<'a> {
        ListItemResolver::new(self.locator)
    }

    /// Browser driver
    #[must_use]
    pub fn driver(&self) -> &'a dyn BrowserDriver {
        self.locator.driver()
    }
}

/// Core logic of one step
pub trait Action: Debug + Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run the action
    fn execute(&self, scope: &ActionScope<'_>, context: &ActionContext) -> ActionResult;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::page::PageDefinition;

    fn page() -> Page {
        Page::new(PageDefinition::builder("Home").build())
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_key_is_normalized() {
            let context = ActionContext::new("Save Changes");
            assert_eq!(context.key().as_str(), "savechanges");
            assert!(matches!(context.parameters(), ActionParameters::None));
        }

        #[test]
        fn test_parameter_accessors() {
            let by_index = ActionContext::with_index("Results", 2);
            assert_eq!(by_index.index(), Some(2));
            assert!(by_index.criteria().is_none());

            let table = ValidationTable::from_rows([["Last Name", "Equals", "Alexander"]]).unwrap();
            let by_criteria = ActionContext::with_criteria("Results", table);
            assert_eq!(by_criteria.index(), None);
            assert_eq!(by_criteria.criteria().unwrap().len(), 1);
        }
    }

    mod result_tests {
        use super::*;

        #[test]
        fn test_page_payload() {
            let result = ActionResult::page(page());
            assert!(result.is_success());
            assert_eq!(result.into_page().unwrap().name(), "Home");
        }

        #[test]
        fn test_missing_payload_is_unexpected() {
            let err = ActionResult::success().into_page().unwrap_err();
            assert!(matches!(
                err,
                AutomationError::UnexpectedResult { expected: "page", actual: "nothing" }
            ));
        }

        #[test]
        fn test_wrong_payload_is_unexpected() {
            let err = ActionResult::Success(Some(ActionValue::Bool(true)))
                .into_text()
                .unwrap_err();
            assert!(matches!(
                err,
                AutomationError::UnexpectedResult { expected: "text", actual: "bool" }
            ));
        }

        #[test]
        fn test_failure_surfaces_its_error() {
            let result = ActionResult::failure(AutomationError::NoPageContext);
            assert!(!result.is_success());
            assert!(matches!(result.error(), Some(AutomationError::NoPageContext)));
            assert!(matches!(result.into_page(), Err(AutomationError::NoPageContext)));
        }

        #[test]
        fn test_check_discards_payload() {
            ActionResult::Success(Some(ActionValue::Text("ok".into())))
                .check()
                .unwrap();
            assert!(ActionResult::failure(AutomationError::driver("gone")).check().is_err());
        }

        #[test]
        fn test_from_plain_results() {
            let ok: ActionResult = AutomationResult::Ok(()).into();
            assert!(matches!(ok, ActionResult::Success(None)));

            let page: ActionResult = AutomationResult::Ok(page()).into();
            assert!(page.into_page().is_ok());

            let err: ActionResult = AutomationResult::<()>::Err(AutomationError::NoPageContext).into();
            assert!(err.error().is_some());
        }
    }
}
