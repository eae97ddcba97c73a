//! Result and error types for pagebind.

use crate::wait::WaitCondition;
use thiserror::Error;

/// Result type for pagebind operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Broad classification of an [`AutomationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The scenario or page model references something that does not exist
    Authoring,
    /// An element never reached the required state
    Timeout,
    /// A list lookup found nothing
    NotFound,
    /// An action or hook could not be constructed
    Construction,
    /// The browser driver reported a failure
    Driver,
    /// Configuration could not be read
    Config,
}

/// Errors that can occur while performing actions
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Element is not declared on the page
    #[error("Element '{element}' is not defined on page '{page}'")]
    ElementNotDefined {
        /// Page name
        page: String,
        /// Lookup key that was requested
        element: String,
    },

    /// Comparison rule name is not recognised
    #[error("Unknown comparison rule '{rule}'")]
    UnknownRule {
        /// Rule name as written in the table
        rule: String,
    },

    /// Criteria row references a field the item does not declare
    #[error("Field '{field}' is not defined on '{page}'")]
    FieldNotFound {
        /// Field name as written in the table
        field: String,
        /// Item page name
        page: String,
    },

    /// A value could not be parsed for a typed comparison
    #[error("Cannot compare '{value}': expected a {expected}")]
    ValueParse {
        /// Offending value
        value: String,
        /// What the rule needed
        expected: &'static str,
    },

    /// Action received parameters it cannot work with
    #[error("Action '{action}' received an invalid context: {message}")]
    InvalidContext {
        /// Action name
        action: String,
        /// Error message
        message: String,
    },

    /// No page has been set on the scenario yet
    #[error("No page context is active for this scenario")]
    NoPageContext,

    /// The action result did not carry the requested payload
    #[error("Expected a {expected} result but the action returned {actual}")]
    UnexpectedResult {
        /// Requested payload kind
        expected: &'static str,
        /// Payload kind that was present
        actual: &'static str,
    },

    /// Element never reached the required state
    #[error("Timed out after {elapsed_ms}ms waiting for {}{condition}", element_prefix(.element))]
    Timeout {
        /// Condition that was waited for
        condition: WaitCondition,
        /// Element name, when known
        element: Option<String>,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// List has fewer items than requested
    #[error("List '{list}' has {count} item(s); item {requested} was requested")]
    IndexOutOfRange {
        /// List name
        list: String,
        /// 1-based index requested
        requested: usize,
        /// Items observed
        count: usize,
    },

    /// No list item satisfied the criteria
    #[error("No item in list '{list}' matched the criteria:\n{criteria}")]
    NoMatchFound {
        /// List name
        list: String,
        /// Rendered criteria table
        criteria: String,
    },

    /// Object container could not build a type
    #[error("Failed to construct '{type_name}': {reason}")]
    Construction {
        /// Type that was requested
        type_name: String,
        /// Why construction failed
        reason: String,
    },

    /// Browser driver failure
    #[error("Browser driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

fn element_prefix(element: &Option<String>) -> String {
    element
        .as_deref()
        .map(|name| format!("'{name}' "))
        .unwrap_or_default()
}

impl AutomationError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a construction error for type `T`
    #[must_use]
    pub fn construction<T: ?Sized>(reason: impl Into<String>) -> Self {
        Self::Construction {
            type_name: std::any::type_name::<T>().to_string(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ElementNotDefined { .. }
            | Self::UnknownRule { .. }
            | Self::FieldNotFound { .. }
            | Self::ValueParse { .. }
            | Self::InvalidContext { .. }
            | Self::NoPageContext
            | Self::UnexpectedResult { .. } => ErrorKind::Authoring,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::IndexOutOfRange { .. } | Self::NoMatchFound { .. } => ErrorKind::NotFound,
            Self::Construction { .. } => ErrorKind::Construction,
            Self::Driver { .. } => ErrorKind::Driver,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

impl From<serde_json::Error> for AutomationError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for AutomationError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::config(err.to_string())
    }
}
