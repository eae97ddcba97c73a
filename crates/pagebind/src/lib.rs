//! pagebind: action pipeline and dynamic element resolution for
//! behavior-driven browser tests.
//!
//! Scenario steps such as "I choose Students" or "I am on list Results item 2"
//! arrive as an element name plus arguments. pagebind turns them into browser
//! operations:
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────────────────────────┐
//! │ Step handler │──►│ ActionPipeline                                │
//! │ (steps)      │   │  pre-actions ─► Action ─► post-actions        │
//! └──────────────┘   └───────────────┬───────────────────────────────┘
//!                                    │
//!              ┌─────────────────────┼────────────────────┐
//!              ▼                     ▼                    ▼
//!      ┌──────────────┐     ┌────────────────┐   ┌────────────────┐
//!      │ElementLocator│◄────│ListItemResolver│──►│CriteriaMatcher │
//!      └──────┬───────┘     └────────────────┘   └────────────────┘
//!             ▼
//!      ┌──────────────┐     ┌──────────────┐
//!      │ WaitEngine   │────►│BrowserDriver │
//!      └──────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pagebind::prelude::*;
//! use std::sync::Arc;
//!
//! let driver = Arc::new(MockDriver::new());
//! driver.add(MockElement::with_selector(Selector::link_text("Students")));
//!
//! let config = AutomationConfig::default();
//! let repository = ActionRepository::new(Arc::new(Container::with_defaults(config.clone())));
//! repository.initialize().unwrap();
//! let pipeline = ActionPipeline::from_config(Arc::new(repository), driver.clone(), &config);
//!
//! let home = PageDefinition::builder("Home")
//!     .link("Students", Selector::link_text("Students"))
//!     .build();
//! let mut steps = SelectionSteps::new(pipeline);
//! steps.scenario_mut().set_page(Page::new(home));
//! steps.choose("students").unwrap();
//! assert_eq!(driver.interactions().len(), 1);
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod action;
pub mod clock;
pub mod config;
pub mod criteria;
pub mod driver;
pub mod element;
pub mod list;
pub mod locator;
pub mod logging;
pub mod mock;
pub mod page;
mod result;
pub mod steps;
pub mod wait;

pub use action::builtin::{
    ButtonClickAction, ButtonDoubleClickAction, ButtonRightClickAction, GetListItemByCriteriaAction,
    GetListItemByIndexAction, HoverOverElementAction,
};
pub use action::container::Container;
pub use action::hooks::{
    ActionHook, Capabilities, HighlightPreAction, HookRegistration, HookType, TracingHook,
};
pub use action::pipeline::ActionPipeline;
pub use action::repository::ActionRepository;
pub use action::{Action, ActionContext, ActionParameters, ActionResult, ActionScope, ActionValue};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AutomationConfig;
pub use criteria::{
    ComparisonRule, CriteriaMatcher, FieldLookup, FieldMap, ValidationRow, ValidationTable,
};
pub use driver::{BoundingBox, BrowserDriver, ControlHandle};
pub use element::{ElementLocator, ResolvePolicy, ResolvedElement};
pub use list::{ListItemResolver, ListItems};
pub use locator::{LookupKey, Selector};
pub use page::{ElementKind, ListDefinition, Page, PageDefinition, PageDefinitionBuilder, PropertyMetadata};
pub use result::{AutomationError, AutomationResult, ErrorKind};
pub use steps::{ScenarioContext, SelectionSteps};
pub use wait::{WaitCondition, WaitEngine, WaitOutcome};

/// Common imports for step libraries and tests
pub mod prelude {
    pub use super::mock::{MockDriver, MockElement, MockInteraction};
    pub use super::{
        Action, ActionContext, ActionHook, ActionPipeline, ActionRepository, ActionResult,
        ActionScope, AutomationConfig, AutomationError, AutomationResult, BrowserDriver,
        Capabilities, ComparisonRule, Container, ElementLocator, HookRegistration, HookType,
        ListItemResolver, LookupKey, Page, PageDefinition, ScenarioContext, SelectionSteps,
        Selector, ValidationTable, WaitCondition, WaitEngine,
    };
}
