//! List Item Resolvers
//!
//! Locates one item of a repeating list, by 1-based position or by the first
//! item whose fields satisfy a [`ValidationTable`]. The result is a new
//! [`Page`] scoped to the item's control; the source page is left untouched.

use crate::criteria::{CriteriaMatcher, ValidationTable};
use crate::driver::ControlHandle;
use crate::element::ElementLocator;
use crate::page::{Page, PageDefinition};
use crate::result::{AutomationError, AutomationResult};
use std::sync::Arc;

/// Items of a located list, materialized into pages on demand
#[derive(Debug)]
pub struct ListItems {
    name: String,
    definition: Arc<PageDefinition>,
    handles: std::vec::IntoIter<ControlHandle>,
    count: usize,
}

impl ListItems {
    /// Declared list name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of items rendered when the list was enumerated
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl Iterator for ListItems {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        self.handles
            .next()
            .map(|handle| Page::scoped(Arc::clone(&self.definition), handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.handles.size_hint()
    }
}

/// Finds list items on a page
#[derive(Debug, Clone, Copy)]
pub struct ListItemResolver<'a> {
    locator: ElementLocator<'a>,
}

impl<'a> ListItemResolver<'a> {
    /// Create a resolver that locates lists through `locator`
    #[must_use]
    pub const fn new(locator: ElementLocator<'a>) -> Self {
        Self { locator }
    }

    /// Enumerate the items of `list` in rendered order.
    ///
    /// # Errors
    ///
    /// Any locator error for the list itself, or
    /// [`AutomationError::InvalidContext`] when `list` is not declared as a list.
    pub fn items(&self, page: &Page, list: &str) -> AutomationResult<ListItems> {
        let property = self.locator.property(page, list)?;
        let definition = property.as_list().ok_or_else(|| AutomationError::InvalidContext {
            action: "list lookup".to_string(),
            message: format!("'{}' is a {}, not a list", property.name, property.kind.as_str()),
        })?;

        let control = self.locator.resolve(page, list)?;
        let handles = self
            .locator
            .driver()
            .find_elements(Some(control.handle()), &definition.item_selector)?;

        tracing::debug!(list = %property.name, count = handles.len(), "list enumerated");
        Ok(ListItems {
            name: property.name.clone(),
            definition: Arc::clone(&definition.item),
            count: handles.len(),
            handles: handles.into_iter(),
        })
    }

    /// Item at 1-based `index`.
    ///
    /// # Errors
    ///
    /// [`AutomationError::IndexOutOfRange`] when `index` is 0 or past the end.
    pub fn get_item_at(&self, page: &Page, list: &str, index: usize) -> AutomationResult<Page> {
        let mut items = self.items(page, list)?;
        let out_of_range = |items: &ListItems| AutomationError::IndexOutOfRange {
            list: items.name().to_string(),
            requested: index,
            count: items.count(),
        };
        if index == 0 {
            return Err(out_of_range(&items));
        }
        match items.nth(index - 1) {
            Some(item) => Ok(item),
            None => Err(out_of_range(&items)),
        }
    }

    /// First item, in rendered order, matching every row of `criteria`.
    ///
    /// # Errors
    ///
    /// [`AutomationError::NoMatchFound`] when no item matches, or a matcher
    /// error such as [`AutomationError::FieldNotFound`].
    pub fn find_item(
        &self,
        page: &Page,
        list: &str,
        criteria: &ValidationTable,
    ) -> AutomationResult<Page> {
        let mut items = self.items(page, list)?;
        let driver = self.locator.driver();
        for item in items.by_ref() {
            if CriteriaMatcher::evaluate(&item.fields(driver), criteria)? {
                return Ok(item);
            }
        }
        Err(AutomationError::NoMatchFound {
            list: items.name().to_string(),
            criteria: criteria.to_string(),
        })
    }

    /// First item, in rendered order, that fails `criteria`; `None` when
    /// every item matches
    pub fn find_first_non_matching(
        &self,
        page: &Page,
        list: &str,
        criteria: &ValidationTable,
    ) -> AutomationResult<Option<Page>> {
        let driver = self.locator.driver();
        for item in self.items(page, list)? {
            if !CriteriaMatcher::evaluate(&item.fields(driver), criteria)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::locator::Selector;
    use crate::mock::{MockDriver, MockElement};
    use crate::wait::WaitEngine;
    use std::time::Duration;

    const STUDENTS: [(&str, &str); 3] = [
        ("Alexander", "Carson"),
        ("Alonso", "Meredith"),
        ("Anand", "Arturo"),
    ];

    fn search_page() -> Page {
        let item = PageDefinition::builder("StudentItem")
            .text("Last Name", Selector::css(".last"))
            .text("First Name", Selector::css(".first"))
            .build();
        Page::new(
            PageDefinition::builder("StudentsSearch")
                .list("Results", Selector::id("results"), Selector::css("tr"), item)
                .button("Search", Selector::id("search"))
                .build(),
        )
    }

    fn render(driver: &MockDriver) -> Vec<ControlHandle> {
        let table = driver.add(MockElement::with_selector(Selector::id("results")));
        STUDENTS
            .iter()
            .map(|(last, first)| {
                let row = driver.add_child(&table, MockElement::new("tr"));
                let _ = driver.add_child(&row, MockElement::new(".last").text(*last));
                let _ = driver.add_child(&row, MockElement::new(".first").text(*first));
                row
            })
            .collect()
    }

    fn engine() -> WaitEngine {
        WaitEngine::new(Duration::from_millis(300), Duration::from_millis(100))
            .with_clock(Arc::new(ManualClock::new()))
    }

    mod index_tests {
        use super::*;

        #[test]
        fn test_items_are_one_based() {
            let driver = MockDriver::new();
            let rows = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));
            let page = search_page();

            let first = resolver.get_item_at(&page, "Results", 1).unwrap();
            assert_eq!(first.scope(), Some(&rows[0]));
            assert_eq!(first.name(), "StudentItem");

            let last = resolver.get_item_at(&page, "results", 3).unwrap();
            assert_eq!(last.scope(), Some(&rows[2]));
            assert_eq!(page.scope(), None);
        }

        #[test]
        fn test_index_past_end_is_out_of_range() {
            let driver = MockDriver::new();
            let _ = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver.get_item_at(&search_page(), "Results", 4).unwrap_err();
            assert!(matches!(
                err,
                AutomationError::IndexOutOfRange { ref list, requested: 4, count: 3 } if list == "Results"
            ));
        }

        #[test]
        fn test_index_zero_is_out_of_range() {
            let driver = MockDriver::new();
            let _ = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver.get_item_at(&search_page(), "Results", 0).unwrap_err();
            assert!(matches!(err, AutomationError::IndexOutOfRange { requested: 0, count: 3, .. }));
        }

        #[test]
        fn test_empty_list_is_out_of_range() {
            let driver = MockDriver::new();
            let _ = driver.add(MockElement::with_selector(Selector::id("results")));
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver.get_item_at(&search_page(), "Results", 1).unwrap_err();
            assert!(matches!(err, AutomationError::IndexOutOfRange { count: 0, .. }));
        }

        #[test]
        fn test_non_list_property_is_rejected() {
            let driver = MockDriver::new();
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver.get_item_at(&search_page(), "Search", 1).unwrap_err();
            assert!(matches!(err, AutomationError::InvalidContext { .. }));
            assert_eq!(driver.call_count(), 0);
        }
    }

    mod criteria_tests {
        use super::*;

        fn criteria(rows: &[[&str; 3]]) -> ValidationTable {
            ValidationTable::from_rows(rows.iter().copied()).unwrap()
        }

        #[test]
        fn test_find_item_returns_first_match() {
            let driver = MockDriver::new();
            let rows = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let item = resolver
                .find_item(&search_page(), "Results", &criteria(&[["Last Name", "StartsWith", "Al"]]))
                .unwrap();
            assert_eq!(item.scope(), Some(&rows[0]));

            let item = resolver
                .find_item(
                    &search_page(),
                    "Results",
                    &criteria(&[["Last Name", "StartsWith", "A"], ["First Name", "Equals", "Arturo"]]),
                )
                .unwrap();
            assert_eq!(item.scope(), Some(&rows[2]));
        }

        #[test]
        fn test_find_item_without_match() {
            let driver = MockDriver::new();
            let _ = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver
                .find_item(&search_page(), "Results", &criteria(&[["Last Name", "Equals", "Zed"]]))
                .unwrap_err();
            match err {
                AutomationError::NoMatchFound { list, criteria } => {
                    assert_eq!(list, "Results");
                    assert!(criteria.contains("| Last Name | Equals | Zed |"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_unknown_field_is_an_error() {
            let driver = MockDriver::new();
            let _ = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let err = resolver
                .find_item(&search_page(), "Results", &criteria(&[["Grade", "Equals", "A"]]))
                .unwrap_err();
            assert!(matches!(err, AutomationError::FieldNotFound { .. }));
        }

        #[test]
        fn test_find_first_non_matching() {
            let driver = MockDriver::new();
            let rows = render(&driver);
            let wait = engine();
            let resolver = ListItemResolver::new(ElementLocator::new(&driver, &wait));

            let item = resolver
                .find_first_non_matching(
                    &search_page(),
                    "Results",
                    &criteria(&[["Last Name", "StartsWith", "Al"]]),
                )
                .unwrap();
            assert_eq!(item.unwrap().scope(), Some(&rows[2]));

            let none = resolver
                .find_first_non_matching(
                    &search_page(),
                    "Results",
                    &criteria(&[["Last Name", "StartsWith", "A"]]),
                )
                .unwrap();
            assert!(none.is_none());
        }
    }
}
