//! Datatable columns: sort toggles and per-column filters.

use super::{Actionable, Button, ButtonEntry, Component, ComponentKind, Field, FieldEntry};
use crate::config::ColumnConfig;
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Sort direction of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortState {
    /// Ascending
    Increment,
    /// Descending
    Decrement,
    /// Unsorted
    #[default]
    None,
}

impl SortState {
    /// Sort-toggle clicks that reach this state from unsorted
    #[must_use]
    pub const fn toggle_clicks(self) -> usize {
        match self {
            Self::Decrement => 1,
            Self::Increment => 2,
            Self::None => 0,
        }
    }
}

/// Datatable column with optional filter input and sort toggle
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    base: Component,
    sort: SortState,
    filter: Option<Field>,
    sort_button: Option<Button>,
    index: usize,
}

super::specialization!(Column, default_actions);

impl Column {
    /// Column at `locator`, `index`-th in its table
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<Locator>, index: usize) -> Self {
        Self {
            base: Component::new(ComponentKind::Column, name).with_locator(locator),
            sort: SortState::None,
            filter: None,
            sort_button: None,
            index,
        }
    }

    /// Column from a declaration: the filter becomes an `INPUT` field named
    /// `<name>_filter`, the sort toggle a button named `<name>_sort`
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &ColumnConfig, index: usize) -> Self {
        let name = name.into();
        let mut column = Self::new(name.clone(), config.selector.as_str(), index);
        column.filter = config.filter.as_deref().map(|selector| {
            Field::new(format!("{name}_filter"), selector, [FieldEntry::Input])
        });
        column.sort_button = config.sort_button.as_deref().map(|selector| {
            Button::new(format!("{name}_sort"), selector, ButtonEntry::Button)
        });
        column
    }

    /// Position in the table
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Last requested sort
    #[must_use]
    pub const fn sort(&self) -> SortState {
        self.sort
    }

    /// Record a sort without clicking
    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Filter input
    #[must_use]
    pub const fn filter_input(&self) -> Option<&Field> {
        self.filter.as_ref()
    }

    /// Replace the filter input
    pub fn set_filter_input(&mut self, filter: Field) {
        self.filter = Some(filter);
    }

    /// Sort toggle
    #[must_use]
    pub const fn sort_button(&self) -> Option<&Button> {
        self.sort_button.as_ref()
    }

    /// Replace the sort toggle
    pub fn set_sort_button(&mut self, button: Button) {
        self.sort_button = Some(button);
    }

    /// Click the sort toggle until the column is in `state`
    pub async fn sorting(&mut self, session: &Session, state: SortState) -> PomResult<()> {
        self.sort = state;
        let clicks = state.toggle_clicks();
        if clicks == 0 {
            return Ok(());
        }
        let button = self
            .sort_button
            .as_ref()
            .ok_or_else(|| PomError::ComponentNotFound {
                kind: ComponentKind::Button.to_string(),
                key: format!("{}_sort", self.name()),
            })?;
        for _ in 0..clicks {
            button.click(session).await?;
        }
        tracing::debug!(column = %self.name(), ?state, "column sorted");
        Ok(())
    }

    /// Type into the filter input and await refreshed data; `false` when the
    /// column has no text filter
    pub async fn filtering(&self, session: &Session, text: &str) -> PomResult<bool> {
        match &self.filter {
            Some(filter) if filter.has_entry(FieldEntry::Input) => {
                filter.type_text(session, text).await?;
                self.wait_for_elements_data(session).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Current value of the filter input
    pub async fn filter_value(&self, session: &Session) -> PomResult<Option<String>> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };
        let elements = session.driver().query_all(filter.element_locator()?).await?;
        Ok(elements.into_iter().next().and_then(|e| e.value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::{ElementHandle, MockDriver};
    use std::sync::Arc;

    fn fast() -> (Session, Arc<MockDriver>) {
        Session::mock(
            SessionConfig::default()
                .with_assertion_timeout(30)
                .with_poll_interval(5),
        )
    }

    fn name_column() -> Column {
        Column::from_config(
            "name",
            &ColumnConfig::new("td.name")
                .with_filter("th.name input")
                .with_sort_button("th.name .sort"),
            0,
        )
    }

    #[test]
    fn test_from_config_names_parts() {
        let column = name_column();
        assert_eq!(column.filter_input().unwrap().name(), "name_filter");
        assert_eq!(column.sort_button().unwrap().name(), "name_sort");
        assert_eq!(column.kind(), ComponentKind::Column);
        assert_eq!(column.sort(), SortState::None);
    }

    #[tokio::test]
    async fn test_sorting_click_counts() {
        let (session, driver) = fast();
        driver.add_element("th.name .sort", ElementHandle::new("button"));
        let mut column = name_column();

        column.sorting(&session, SortState::Decrement).await.unwrap();
        assert_eq!(driver.calls_matching("click:").len(), 1);
        column.sorting(&session, SortState::Increment).await.unwrap();
        assert_eq!(driver.calls_matching("click:").len(), 3);
        column.sorting(&session, SortState::None).await.unwrap();
        assert_eq!(driver.calls_matching("click:").len(), 3);
        assert_eq!(column.sort(), SortState::None);
    }

    #[tokio::test]
    async fn test_sorting_without_button() {
        let (session, _driver) = fast();
        let mut column = Column::new("age", Locator::new("td.age"), 1);
        let err = column.sorting(&session, SortState::Increment).await.unwrap_err();
        assert_eq!(err.to_string(), "BUTTON 'age_sort' not found");
        assert!(column.sorting(&session, SortState::None).await.is_ok());
    }

    #[tokio::test]
    async fn test_filtering_types_into_filter() {
        let (session, driver) = fast();
        driver.add_element("th.name input", ElementHandle::new("input"));
        let column = name_column();
        assert!(column.filtering(&session, "Ada").await.unwrap());
        assert_eq!(column.filter_value(&session).await.unwrap().as_deref(), Some("Ada"));

        let plain = Column::new("age", Locator::new("td.age"), 1);
        assert!(!plain.filtering(&session, "3").await.unwrap());
        assert_eq!(plain.filter_value(&session).await.unwrap(), None);
    }
}
