//! Page Object Model
//!
//! A [`PageDefinition`] declares the logical elements of a page: their display
//! name, their [`Selector`] and their [`ElementKind`]. A [`Page`] is the
//! runtime page context: a shared definition plus, for list items, the control
//! that scopes every lookup. Pages are never mutated; navigating or drilling
//! into a list item produces a new `Page`.

use crate::criteria::FieldLookup;
use crate::driver::{BrowserDriver, ControlHandle};
use crate::locator::{LookupKey, Selector};
use crate::result::{AutomationError, AutomationResult};
use std::collections::HashMap;
use std::sync::Arc;

/// What kind of control a property is
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Clickable button
    Button,
    /// Navigation link
    Link,
    /// Read-only text
    Text,
    /// Text input
    Input,
    /// Repeating list of items
    List(ListDefinition),
}

impl ElementKind {
    /// Short name for diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Text => "text",
            Self::Input => "input",
            Self::List(_) => "list",
        }
    }
}

/// How the items of a list are found and what each item exposes
#[derive(Debug, Clone, PartialEq)]
pub struct ListDefinition {
    /// Selector for each item, relative to the list control
    pub item_selector: Selector,
    /// Definition of one item's fields
    pub item: Arc<PageDefinition>,
}

/// Metadata for one logical element
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    /// Name as declared
    pub name: String,
    /// How the driver finds the control
    pub selector: Selector,
    /// Kind of control
    pub kind: ElementKind,
}

impl PropertyMetadata {
    /// The list definition, if this property is a list
    #[must_use]
    pub const fn as_list(&self) -> Option<&ListDefinition> {
        match &self.kind {
            ElementKind::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Declared elements of a page or list item
#[derive(Debug, Clone, PartialEq)]
pub struct PageDefinition {
    name: String,
    properties: HashMap<LookupKey, PropertyMetadata>,
}

impl PageDefinition {
    /// Start building a definition
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PageDefinitionBuilder {
        PageDefinitionBuilder {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a property by key
    #[must_use]
    pub fn property(&self, key: &LookupKey) -> Option<&PropertyMetadata> {
        self.properties.get(key)
    }

    /// Number of declared properties
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if no properties are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Builder for [`PageDefinition`]
#[derive(Debug, Clone)]
pub struct PageDefinitionBuilder {
    name: String,
    properties: HashMap<LookupKey, PropertyMetadata>,
}

impl PageDefinitionBuilder {
    /// Declare an element of any kind
    #[must_use]
    pub fn element(mut self, name: impl Into<String>, selector: Selector, kind: ElementKind) -> Self {
        let name = name.into();
        let _ = self.properties.insert(
            LookupKey::new(&name),
            PropertyMetadata {
                name,
                selector,
                kind,
            },
        );
        self
    }

    /// Declare a button
    #[must_use]
    pub fn button(self, name: impl Into<String>, selector: Selector) -> Self {
        self.element(name, selector, ElementKind::Button)
    }

    /// Declare a link
    #[must_use]
    pub fn link(self, name: impl Into<String>, selector: Selector) -> Self {
        self.element(name, selector, ElementKind::Link)
    }

    /// Declare a text element
    #[must_use]
    pub fn text(self, name: impl Into<String>, selector: Selector) -> Self {
        self.element(name, selector, ElementKind::Text)
    }

    /// Declare an input
    #[must_use]
    pub fn input(self, name: impl Into<String>, selector: Selector) -> Self {
        self.element(name, selector, ElementKind::Input)
    }

    /// Declare a list whose items are found by `item_selector` inside it
    #[must_use]
    pub fn list(
        self,
        name: impl Into<String>,
        selector: Selector,
        item_selector: Selector,
        item: Arc<PageDefinition>,
    ) -> Self {
        self.element(
            name,
            selector,
            ElementKind::List(ListDefinition {
                item_selector,
                item,
            }),
        )
    }

    /// Finish the definition
    #[must_use]
    pub fn build(self) -> Arc<PageDefinition> {
        Arc::new(PageDefinition {
            name: self.name,
            properties: self.properties,
        })
    }
}

/// Runtime page context
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    definition: Arc<PageDefinition>,
    scope: Option<ControlHandle>,
}

impl Page {
    /// A whole-document page
    #[must_use]
    pub fn new(definition: Arc<PageDefinition>) -> Self {
        Self {
            definition,
            scope: None,
        }
    }

    /// A page whose lookups are restricted to descendants of `scope`
    #[must_use]
    pub fn scoped(definition: Arc<PageDefinition>, scope: ControlHandle) -> Self {
        Self {
            definition,
            scope: Some(scope),
        }
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Control scoping this page, if any
    #[must_use]
    pub const fn scope(&self) -> Option<&ControlHandle> {
        self.scope.as_ref()
    }

    /// Shared definition
    #[must_use]
    pub const fn definition(&self) -> &Arc<PageDefinition> {
        &self.definition
    }

    /// Look up a property by key
    #[must_use]
    pub fn property(&self, key: &LookupKey) -> Option<&PropertyMetadata> {
        self.definition.property(key)
    }

    /// Field values of this page read through `driver`
    #[must_use]
    pub fn fields<'a>(&'a self, driver: &'a dyn BrowserDriver) -> PageFields<'a> {
        PageFields { page: self, driver }
    }
}

/// Reads a page's declared fields as rendered text
#[derive(Debug, Clone, Copy)]
pub struct PageFields<'a> {
    page: &'a Page,
    driver: &'a dyn BrowserDriver,
}

impl FieldLookup for PageFields<'_> {
    fn field(&self, name: &str) -> AutomationResult<Option<String>> {
        let property = self
            .page
            .property(&LookupKey::new(name))
            .ok_or_else(|| AutomationError::FieldNotFound {
                field: name.to_string(),
                page: self.page.name().to_string(),
            })?;

        match self
            .driver
            .find_element(self.page.scope(), &property.selector)?
        {
            Some(handle) => self.driver.text(&handle).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};

    fn student_item() -> Arc<PageDefinition> {
        PageDefinition::builder("StudentItem")
            .text("Last Name", Selector::css(".last"))
            .text("First Name", Selector::css(".first"))
            .build()
    }

    mod definition_tests {
        use super::*;

        #[test]
        fn test_builder_normalizes_keys() {
            let page = PageDefinition::builder("StudentsSearch")
                .link("Students", Selector::link_text("Students"))
                .button("Search", Selector::id("search"))
                .build();

            assert_eq!(page.len(), 2);
            let students = page.property(&LookupKey::new("students")).unwrap();
            assert_eq!(students.name, "Students");
            assert_eq!(students.kind, ElementKind::Link);
            assert!(page.property(&LookupKey::new("Missing")).is_none());
        }

        #[test]
        fn test_list_property_exposes_item_definition() {
            let page = PageDefinition::builder("StudentsSearch")
                .list(
                    "Results",
                    Selector::id("results"),
                    Selector::css("li"),
                    student_item(),
                )
                .build();

            let results = page.property(&LookupKey::new("Results")).unwrap();
            let list = results.as_list().unwrap();
            assert_eq!(list.item.name(), "StudentItem");
            assert_eq!(results.kind.as_str(), "list");
        }

        #[test]
        fn test_non_list_has_no_list_definition() {
            let page = PageDefinition::builder("Home")
                .text("Title", Selector::css("h1"))
                .build();
            assert!(page.property(&LookupKey::new("title")).unwrap().as_list().is_none());
        }
    }

    mod field_tests {
        use super::*;

        #[test]
        fn test_fields_are_read_within_scope() {
            let driver = MockDriver::new();
            let first = driver.add(MockElement::new("li"));
            driver.add_child(&first, MockElement::new(".last").text("Alexander"));
            let second = driver.add(MockElement::new("li"));
            driver.add_child(&second, MockElement::new(".last").text("Alonso"));

            let page = Page::scoped(student_item(), second);
            let fields = page.fields(&driver);
            assert_eq!(fields.field("Last Name").unwrap().as_deref(), Some("Alonso"));
        }

        #[test]
        fn test_declared_but_absent_field_is_none() {
            let driver = MockDriver::new();
            let item = driver.add(MockElement::new("li"));

            let page = Page::scoped(student_item(), item);
            assert_eq!(page.fields(&driver).field("first name").unwrap(), None);
        }

        #[test]
        fn test_undeclared_field_is_an_error() {
            let driver = MockDriver::new();
            let item = driver.add(MockElement::new("li"));

            let page = Page::scoped(student_item(), item);
            let err = page.fields(&driver).field("Grade").unwrap_err();
            assert!(matches!(
                err,
                AutomationError::FieldNotFound { ref field, ref page } if field == "Grade" && page == "StudentItem"
            ));
            assert_eq!(driver.call_count(), 0);
        }
    }
}
