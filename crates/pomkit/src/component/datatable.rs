//! Paginated datatables.
//!
//! Pagination controls are ordinary children stored under reserved keys
//! ([`PaginationControl`]). Every navigation asserts its control is enabled
//! when the table declares one, clicks it, then moves `current_page`; the
//! counter never drops below 1.

use super::{Actionable, Button, Child, Column, Component, ComponentKind, Field, SortState};
use crate::assertion::{self, AssertionOutcome, AssertionResult};
use crate::config::{ColumnConfig, ElementConfig};
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use crate::wait::wait_timeout;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Row selector, relative to the table
const ROW_SELECTOR: &str = "tbody > tr";

/// Reserved child keys of a datatable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaginationControl {
    /// Label showing the row count
    Total,
    /// Page-size field
    PageSize,
    /// First-page button
    FirstPage,
    /// Next-page button
    NextPage,
    /// Previous-page button
    PreviousPage,
    /// Last-page button
    LastPage,
    /// Numbered page buttons
    IndexPage,
}

impl PaginationControl {
    /// Child key
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Total => "_total",
            Self::PageSize => "_pagesize",
            Self::FirstPage => "_firstpage",
            Self::NextPage => "_nextpage",
            Self::PreviousPage => "_previewspage",
            Self::LastPage => "_lastpage",
            Self::IndexPage => "_indexpage",
        }
    }
}

/// `ceil(total / size)`, or 0 for an empty page size
#[must_use]
pub const fn total_pages_for(total: u64, size: u64) -> u64 {
    if size == 0 {
        0
    } else {
        total.div_ceil(size)
    }
}

/// Paginated table of columns
#[derive(Debug, Clone, PartialEq)]
pub struct Datatable {
    base: Component,
    current_page: u32,
}

super::specialization!(Datatable, default_actions);

impl Datatable {
    /// Table at `locator`, on page 1
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<Locator>) -> Self {
        Self {
            base: Component::new(ComponentKind::Datatable, name).with_locator(locator),
            current_page: 1,
        }
    }

    /// Table from a declaration
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &ElementConfig) -> Self {
        let mut table = Self::new(name, config.selector.as_str());
        table.base.apply_requests(&config.request);
        table
    }

    /// Current page, starting at 1
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Move the page counter without clicking
    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    // =========================================================================
    // Columns and controls
    // =========================================================================

    /// Keys of the column children
    #[must_use]
    pub fn column_keys(&self) -> Vec<&str> {
        self.children()
            .iter()
            .filter(|(_, child)| child.kind() == ComponentKind::Column)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Store a column
    pub fn add_column(&mut self, key: impl Into<String>, column: Column) {
        self.base.set_element(key, column);
    }

    /// Columns named after their keys, indexed in declaration order
    pub fn add_columns<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, ColumnConfig)>,
        K: Into<String>,
    {
        for (index, (key, config)) in configs.into_iter().enumerate() {
            let key = key.into();
            let column = Column::from_config(key.clone(), &config, index);
            self.add_column(key, column);
        }
    }

    /// Store a pagination control
    pub fn set_control(&mut self, control: PaginationControl, child: impl Into<Child>) {
        self.base.set_element(control.key(), child);
    }

    /// Store the row-count label
    pub fn set_rows_total_label(&mut self, label: Component) {
        self.set_control(PaginationControl::Total, label);
    }

    /// Store the page-size field
    pub fn set_page_size_field(&mut self, field: Field) {
        self.set_control(PaginationControl::PageSize, field);
    }

    /// Store a navigation button
    pub fn set_pagination_button(&mut self, control: PaginationControl, button: Button) {
        self.set_control(control, button);
    }

    fn control_button(&self, control: PaginationControl) -> Option<&Button> {
        self.element(control.key()).and_then(Child::as_button)
    }

    /// Row count shown by the `_total` label, 0 without one
    pub async fn rows_total(&self, session: &Session) -> PomResult<u64> {
        let Some(label) = self.element(PaginationControl::Total.key()) else {
            return Ok(0);
        };
        let value = label.base().as_number(session).await?;
        Ok(value.map_or(0, |v| v.max(0.0) as u64))
    }

    /// Value of the `_pagesize` field, 0 without one
    pub async fn page_size(&self, session: &Session) -> PomResult<u64> {
        let Some(field) = self.element(PaginationControl::PageSize.key()) else {
            return Ok(0);
        };
        let elements = session
            .driver()
            .query_all(field.base().element_locator()?)
            .await?;
        Ok(elements
            .first()
            .and_then(|e| e.value.as_deref())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0))
    }

    /// `ceil(rows_total / page_size)`
    pub async fn total_pages(&self, session: &Session) -> PomResult<u64> {
        let total = self.rows_total(session).await?;
        let size = self.page_size(session).await?;
        Ok(total_pages_for(total, size))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    async fn press(&self, session: &Session, control: PaginationControl) -> PomResult<()> {
        if let Some(button) = self.control_button(control) {
            button.enabled(session).await?;
            button.click(session).await?;
        }
        Ok(())
    }

    /// Go to page 1
    pub async fn first_page(&mut self, session: &Session) -> PomResult<u32> {
        self.press(session, PaginationControl::FirstPage).await?;
        self.set_current_page(1);
        Ok(self.current_page)
    }

    /// Go one page forward
    pub async fn next_page(&mut self, session: &Session) -> PomResult<u32> {
        self.press(session, PaginationControl::NextPage).await?;
        self.set_current_page(self.current_page.saturating_add(1));
        Ok(self.current_page)
    }

    /// Go one page back, stopping at 1
    pub async fn previous_page(&mut self, session: &Session) -> PomResult<u32> {
        self.press(session, PaginationControl::PreviousPage).await?;
        self.set_current_page(self.current_page.saturating_sub(1));
        Ok(self.current_page)
    }

    /// Go to the last page
    pub async fn last_page(&mut self, session: &Session) -> PomResult<u32> {
        self.press(session, PaginationControl::LastPage).await?;
        let pages = self.total_pages(session).await?;
        self.set_current_page(u32::try_from(pages).unwrap_or(u32::MAX));
        Ok(self.current_page)
    }

    /// Click the numbered page button showing `page`
    pub async fn paginate(&mut self, session: &Session, page: u32) -> PomResult<u32> {
        if let Some(button) = self.control_button(PaginationControl::IndexPage) {
            let target = button.element_locator()?.containing(page.to_string()).first();
            assertion::assert_enabled(session, &target).await?;
            session
                .driver()
                .click(&target, session.action_options())
                .await?;
        }
        self.set_current_page(page);
        Ok(self.current_page)
    }

    async fn next_available(&self, session: &Session) -> PomResult<bool> {
        let Some(button) = self.control_button(PaginationControl::NextPage) else {
            return Ok(false);
        };
        let elements = session.driver().query_all(button.element_locator()?).await?;
        Ok(!elements.is_empty() && elements.iter().all(is_clickable))
    }

    async fn page_contains(&self, session: &Session, text: &str) -> PomResult<bool> {
        let elements = session.driver().query_all(self.element_locator()?).await?;
        Ok(elements.iter().any(|e| e.text().contains(text)))
    }

    /// Page forward until the table shows `text`, at most once per page.
    /// Returns the page it was found on.
    pub async fn find_page_containing(
        &mut self,
        session: &Session,
        text: &str,
    ) -> PomResult<Option<u32>> {
        let pages = self.total_pages(session).await?.max(1);
        for _ in 0..pages {
            if self.page_contains(session, text).await? {
                return Ok(Some(self.current_page));
            }
            if !self.next_available(session).await? {
                break;
            }
            self.next_page(session).await?;
        }
        tracing::info!(table = %self.name(), text, pages, "text not found on any page");
        Ok(None)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Sort by the column under `key`
    pub async fn sorting(&mut self, session: &Session, key: &str, state: SortState) -> PomResult<()> {
        let column = self
            .base
            .column_mut(key)
            .ok_or_else(|| not_found(key))?;
        column.sorting(session, state).await
    }

    /// Filter by the column under `key`, then await the table's own data
    pub async fn filtering(&self, session: &Session, key: &str, text: &str) -> PomResult<bool> {
        let column = self.column(key).ok_or_else(|| not_found(key))?;
        let filtered = column.filtering(session, text).await?;
        if filtered {
            self.wait_for_load_response(session, None).await?;
        }
        Ok(filtered)
    }

    /// Column under `key` contains `text`
    pub async fn assert_table_contains(
        &self,
        session: &Session,
        key: &str,
        text: &str,
    ) -> PomResult<AssertionOutcome> {
        let column = self.column(key).ok_or_else(|| not_found(key))?;
        column.contains(session, &[text]).await
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Assert the table has rows, optionally after a fixed delay; returns
    /// the row count
    pub async fn assert_has_rows(
        &self,
        session: &Session,
        delay: Option<Duration>,
    ) -> PomResult<usize> {
        self.wait_for_pending_load(session).await?;
        if let Some(delay) = delay {
            wait_timeout(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)).await;
        }
        let rows = session
            .driver()
            .query_all(&self.element_locator()?.find(ROW_SELECTOR))
            .await?;
        let result = if rows.is_empty() {
            AssertionResult::fail("Datatable should have rows")
        } else {
            AssertionResult::pass()
        };
        result.conclude(Some(session), &format!("Assert Datatable \"{}\" Has Rows", self.name()))?;
        Ok(rows.len())
    }

    /// Locator of the `index`-th row (0-based)
    pub fn row(&self, index: usize) -> PomResult<Locator> {
        Ok(self.element_locator()?.find(ROW_SELECTOR).nth(index))
    }

    /// Wait for the `index`-th row, then run `action` on it
    pub async fn interact_with_row<F, Fut, T>(
        &self,
        session: &Session,
        index: usize,
        action: F,
    ) -> PomResult<T>
    where
        F: FnOnce(Locator) -> Fut,
        Fut: Future<Output = PomResult<T>>,
    {
        let row = self.row(index)?;
        assertion::assert_exist(session, &row, None).await?;
        action(row).await
    }
}

fn is_clickable(element: &ElementHandle) -> bool {
    element.enabled && element.attr("aria-disabled") != Some("true")
}

fn not_found(key: &str) -> PomError {
    PomError::ComponentNotFound {
        kind: ComponentKind::Column.to_string(),
        key: key.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::component::{ButtonEntry, FieldEntry};
    use crate::config::SessionConfig;
    use crate::driver::{MockDriver, PageDriver};
    use std::sync::Arc;

    fn fast() -> (Session, Arc<MockDriver>) {
        Session::mock(
            SessionConfig::default()
                .with_assertion_timeout(30)
                .with_poll_interval(5),
        )
    }

    fn users() -> Datatable {
        let mut table = Datatable::new("users", Locator::new("table"));
        table.add_columns([
            ("name", ColumnConfig::new("td.name").with_filter("th.name input")),
            ("age", ColumnConfig::new("td.age").with_sort_button("th.age .sort")),
        ]);
        table.set_rows_total_label(Component::generic("total", Locator::new(".total")));
        table.set_page_size_field(Field::new("size", Locator::new("#size"), [FieldEntry::Select]));
        for (control, selector) in [
            (PaginationControl::FirstPage, ".first"),
            (PaginationControl::NextPage, ".next"),
            (PaginationControl::PreviousPage, ".prev"),
            (PaginationControl::LastPage, ".last"),
            (PaginationControl::IndexPage, ".pages li"),
        ] {
            table.set_pagination_button(
                control,
                Button::new(control.key(), Locator::new(selector), ButtonEntry::Button),
            );
        }
        table
    }

    fn mount(driver: &MockDriver) {
        driver.add_element(".total", ElementHandle::new("span").with_text("25 users"));
        driver.add_element("#size", ElementHandle::new("select").with_value("10"));
        for selector in [".first", ".next", ".prev", ".last"] {
            driver.add_element(selector, ElementHandle::new("button"));
        }
        driver.add_element(".pages li", ElementHandle::new("li").with_text("4"));
    }

    mod structure_tests {
        use super::*;

        #[test]
        fn test_total_pages_for() {
            assert_eq!(total_pages_for(25, 10), 3);
            assert_eq!(total_pages_for(30, 10), 3);
            assert_eq!(total_pages_for(0, 10), 0);
            assert_eq!(total_pages_for(25, 0), 0);
        }

        #[test]
        fn test_columns_indexed_in_order() {
            let table = users();
            assert_eq!(table.column_keys(), vec!["age", "name"]);
            assert_eq!(table.column("name").unwrap().index(), 0);
            assert_eq!(table.column("age").unwrap().index(), 1);
            assert!(table.column("_total").is_none());
        }

        #[test]
        fn test_control_keys() {
            assert_eq!(PaginationControl::PreviousPage.key(), "_previewspage");
            assert_eq!(PaginationControl::IndexPage.key(), "_indexpage");
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_reads_and_total_pages() {
            let (session, driver) = fast();
            mount(&driver);
            let table = users();
            assert_eq!(table.rows_total(&session).await.unwrap(), 25);
            assert_eq!(table.page_size(&session).await.unwrap(), 10);
            assert_eq!(table.total_pages(&session).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_counter_moves_with_clicks() {
            let (session, driver) = fast();
            mount(&driver);
            let mut table = users();
            assert_eq!(table.next_page(&session).await.unwrap(), 2);
            assert_eq!(table.next_page(&session).await.unwrap(), 3);
            assert_eq!(table.previous_page(&session).await.unwrap(), 2);
            assert_eq!(table.first_page(&session).await.unwrap(), 1);
            assert_eq!(table.previous_page(&session).await.unwrap(), 1);
            assert_eq!(table.last_page(&session).await.unwrap(), 3);
            assert_eq!(table.paginate(&session, 4).await.unwrap(), 4);
            assert!(driver.was_called("click:.pages li >> has-text=\"4\" >> nth=0:force"));
        }

        #[tokio::test]
        async fn test_paginate_targets_first_matching_index() {
            let (session, driver) = fast();
            driver.add_element(".pages li", ElementHandle::new("li").with_text("1"));
            driver.add_element(".pages li", ElementHandle::new("li").with_text("10").disabled());
            let mut table = users();
            assert_eq!(table.paginate(&session, 1).await.unwrap(), 1);
            assert_eq!(
                driver.calls_matching("click:.pages li"),
                vec!["click:.pages li >> has-text=\"1\" >> nth=0:force".to_string()]
            );
        }

        #[tokio::test]
        async fn test_disabled_control_fails() {
            let (session, driver) = fast();
            driver.add_element(".next", ElementHandle::new("button").disabled());
            let mut table = users();
            let err = table.next_page(&session).await.unwrap_err();
            assert!(err.is_assertion());
            assert_eq!(table.current_page(), 1);
        }

        #[tokio::test]
        async fn test_counter_without_controls() {
            let (session, _driver) = fast();
            let mut table = Datatable::new("plain", Locator::new("table"));
            assert_eq!(table.next_page(&session).await.unwrap(), 2);
            table.set_current_page(0);
            assert_eq!(table.current_page(), 1);
        }

        #[tokio::test]
        async fn test_find_page_is_bounded() {
            let (session, driver) = fast();
            mount(&driver);
            driver.add_element("table", ElementHandle::new("table").with_text("Ada Bob"));
            let mut table = users();
            assert_eq!(table.find_page_containing(&session, "Bob").await.unwrap(), Some(1));
            assert_eq!(table.find_page_containing(&session, "Zoe").await.unwrap(), None);
            assert!(driver.calls_matching("click:.next").len() <= 3);
        }
    }

    mod column_tests {
        use super::*;

        #[tokio::test]
        async fn test_sorting_and_filtering_by_key() {
            let (session, driver) = fast();
            driver.add_element("th.age .sort", ElementHandle::new("button"));
            driver.add_element("th.name input", ElementHandle::new("input"));
            let mut table = users();

            table.sorting(&session, "age", SortState::Increment).await.unwrap();
            assert_eq!(driver.calls_matching("click:th.age .sort").len(), 2);
            assert_eq!(table.column("age").unwrap().sort(), SortState::Increment);

            assert!(table.filtering(&session, "name", "Ada").await.unwrap());
            let err = table.filtering(&session, "email", "x").await.unwrap_err();
            assert_eq!(err.to_string(), "COLUMN 'email' not found");
        }

        #[tokio::test]
        async fn test_assert_table_contains() {
            let (session, driver) = fast();
            driver.add_element("td.name", ElementHandle::new("td").with_text("Ada"));
            let table = users();
            assert!(table.assert_table_contains(&session, "name", "Ada").await.is_ok());
            assert!(table.assert_table_contains(&session, "name", "Bob").await.is_err());
        }
    }

    mod row_tests {
        use super::*;

        #[tokio::test]
        async fn test_assert_has_rows() {
            let (session, driver) = fast();
            let table = users();
            let err = table.assert_has_rows(&session, None).await.unwrap_err();
            assert_eq!(err.to_string(), "Assertion failed: Datatable should have rows");

            driver.add_element("table >> tbody > tr", ElementHandle::new("tr"));
            driver.add_element("table >> tbody > tr", ElementHandle::new("tr"));
            let rows = table
                .assert_has_rows(&session, Some(Duration::from_millis(1)))
                .await
                .unwrap();
            assert_eq!(rows, 2);
        }

        #[tokio::test]
        async fn test_interact_with_row() {
            let (session, driver) = fast();
            driver.add_element("table >> tbody > tr", ElementHandle::new("tr").with_text("Ada"));
            driver.add_element("table >> tbody > tr", ElementHandle::new("tr").with_text("Bob"));
            let table = users();
            let text = table
                .interact_with_row(&session, 1, |row| {
                    let driver = driver.clone();
                    async move {
                        let elements = driver.query_all(&row).await?;
                        PomResult::Ok(elements[0].text().to_string())
                    }
                })
                .await
                .unwrap();
            assert_eq!(text, "Bob");
        }
    }
}
