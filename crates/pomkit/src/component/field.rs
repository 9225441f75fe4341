//! Input-like fields and the fill workflow.
//!
//! A field may own an autocomplete [`Menu`] under `<name>_menu`. When it is an
//! `INPUT` with such a menu, clicks and typing go to the nested `<input>`
//! rather than the wrapper the locator points at.

use super::{Actionable, Component, ComponentKind, Menu};
use crate::assertion::{self, AssertionOutcome, Matcher};
use crate::config::FieldConfig;
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of input a field renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldEntry {
    /// Text input
    Input,
    /// Single select
    Select,
    /// Multi select
    Multiselect,
    /// Option of a select
    Option,
    /// Radio button
    Radio,
    /// Multi-line text
    Textarea,
    /// Read-only label
    Label,
}

impl FieldEntry {
    /// Whether a placeholder applies
    #[must_use]
    pub const fn takes_placeholder(self) -> bool {
        matches!(
            self,
            Self::Input | Self::Textarea | Self::Select | Self::Multiselect
        )
    }

    /// Whether options can be loaded from a URL
    #[must_use]
    pub const fn takes_load_url(self) -> bool {
        matches!(self, Self::Input | Self::Select | Self::Multiselect)
    }
}

/// Form field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    base: Component,
    entries: Vec<FieldEntry>,
    placeholder: Option<String>,
    optional: bool,
}

super::specialization!(Field);

impl Field {
    /// Field at `locator`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        locator: impl Into<Locator>,
        entries: impl Into<Vec<FieldEntry>>,
    ) -> Self {
        Self {
            base: Component::new(ComponentKind::Field, name).with_locator(locator),
            entries: entries.into(),
            placeholder: None,
            optional: false,
        }
    }

    /// Field from a declaration; a menu selector creates the `<name>_menu`
    /// child with the field's requests
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &FieldConfig) -> Self {
        let name = name.into();
        let mut field = Self::new(name.clone(), config.selector.as_str(), config.entries.clone());
        field.base.apply_requests(&config.request);
        field.optional = config.optional;
        if let Some(placeholder) = &config.placeholder {
            field.set_placeholder(placeholder.clone());
        }
        if let Some(selector) = &config.menu {
            let key = format!("{name}_menu");
            let mut menu = Menu::new(key.clone(), selector.as_str());
            menu.apply_requests(&config.request);
            field.base.set_menu(key, menu);
        }
        field
    }

    /// Entry kinds
    #[must_use]
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Whether the field renders `entry`
    #[must_use]
    pub fn has_entry(&self, entry: FieldEntry) -> bool {
        self.entries.contains(&entry)
    }

    /// Add an entry kind once
    pub fn add_entry(&mut self, entry: FieldEntry) {
        if !self.has_entry(entry) {
            self.entries.push(entry);
        }
    }

    /// Remove an entry kind
    pub fn remove_entry(&mut self, entry: FieldEntry) {
        self.entries.retain(|e| *e != entry);
    }

    /// Placeholder, for inputs, textareas and selects
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        if self.entries.iter().any(|e| e.takes_placeholder()) {
            self.placeholder.as_deref()
        } else {
            None
        }
    }

    /// Set the placeholder; ignored by other entry kinds
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> bool {
        if self.entries.iter().any(|e| e.takes_placeholder()) {
            self.placeholder = Some(placeholder.into());
            true
        } else {
            false
        }
    }

    /// Whether the field may stay empty
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Mark as optional or required
    pub fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    /// Point the on-load request at `url`; only inputs and selects load options
    pub fn set_on_load_url(&mut self, url: impl Into<String>) -> bool {
        if self.entries.iter().any(|e| e.takes_load_url()) {
            self.base.replace_load_url(url.into());
            true
        } else {
            false
        }
    }

    fn is_autocomplete(&self) -> bool {
        self.has_entry(FieldEntry::Input) && self.component_menu().is_some()
    }

    /// Element clicks and keystrokes go to
    pub fn action_target(&self) -> PomResult<Locator> {
        let locator = self.element_locator()?;
        Ok(if self.is_autocomplete() {
            locator.find("input")
        } else {
            locator.clone()
        })
    }

    async fn wait_for_menu_data(&self, session: &Session) -> PomResult<()> {
        if let Some(menu) = self.component_menu() {
            menu.wait_for_pending_load(session).await?;
        }
        Ok(())
    }

    /// Fill the field and return what was entered.
    ///
    /// With `values`: inputs are clicked, typed into and, with an autocomplete
    /// menu, settled on its first item; multiselects pick the values from the
    /// menu (or the native select); selects choose each value. Without values,
    /// an input-multiselect with a menu picks random items, skipping
    /// `to_ignore`, and returns their labels.
    pub async fn fill(
        &self,
        session: &Session,
        values: &[String],
        to_ignore: &[String],
        is_multiple: bool,
    ) -> PomResult<Vec<String>> {
        if values.is_empty() {
            return self.fill_random(session, to_ignore, is_multiple).await;
        }

        self.exist(session).await?;
        self.wait_for_pending_load(session).await?;

        if self.has_entry(FieldEntry::Input) {
            for value in values {
                self.click(session).await?;
                self.type_text(session, value).await?;
                if let Some(menu) = self.component_menu() {
                    menu.wait_for_pending_load(session).await?;
                    menu.select_first_item(session).await?;
                }
            }
        } else if self.has_entry(FieldEntry::Multiselect) {
            if let Some(menu) = self.component_menu() {
                self.click(session).await?;
                menu.wait_for_pending_load(session).await?;
                menu.select_items(session, values).await?;
            } else {
                self.select(session, values).await?;
            }
        } else if self.has_entry(FieldEntry::Select) {
            self.select(session, values).await?;
        } else {
            tracing::debug!(field = %self.name(), entries = ?self.entries, "no fill strategy");
        }
        Ok(values.to_vec())
    }

    async fn fill_random(
        &self,
        session: &Session,
        to_ignore: &[String],
        is_multiple: bool,
    ) -> PomResult<Vec<String>> {
        let searchable =
            self.has_entry(FieldEntry::Input) && self.has_entry(FieldEntry::Multiselect);
        match self.component_menu() {
            Some(menu) if searchable => {
                self.click(session).await?;
                self.wait_for_menu_data(session).await?;
                menu.select_random_items(session, is_multiple, to_ignore).await
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Assert the field shows what [`fill`](Self::fill) entered
    pub async fn validate_filled_fields(
        &self,
        session: &Session,
        values: &[String],
    ) -> PomResult<()> {
        if self.has_entry(FieldEntry::Input) {
            if self.component_menu().is_some() {
                self.exist(session).await?;
                self.contains(session, values).await?;
            } else if let [value] = values {
                self.exist(session).await?;
                self.is_value(session, value).await?;
            }
        } else if self.has_entry(FieldEntry::Select) {
            self.exist(session).await?;
            self.contains(session, values).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Actionable for Field {
    fn component(&self) -> &Component {
        &self.base
    }

    async fn click(&self, session: &Session) -> PomResult<()> {
        let target = self.action_target()?;
        session.driver().scroll_into_view(&target).await?;
        session.driver().click(&target, session.action_options()).await
    }

    async fn type_text(&self, session: &Session, text: &str) -> PomResult<()> {
        let target = self.action_target()?;
        let driver = session.driver();
        driver.scroll_into_view(&target).await?;
        driver.clear(&target, session.action_options()).await?;
        driver.type_text(&target, text, session.action_options()).await
    }

    async fn is_value(&self, session: &Session, value: &str) -> PomResult<AssertionOutcome> {
        let matcher = Matcher::HaveValue(value.to_string());
        assertion::assert_should(session, self.element_locator()?, &matcher).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::component::{LoadRequest, CHECKBOX_SELECTOR};
    use crate::config::{RequestConfig, SessionConfig};
    use crate::driver::{ElementHandle, MockDriver};
    use std::sync::Arc;

    fn fast() -> (Session, Arc<MockDriver>) {
        Session::mock(
            SessionConfig::default()
                .with_assertion_timeout(30)
                .with_poll_interval(5)
                .with_seed(21),
        )
    }

    fn city() -> Field {
        Field::from_config(
            "city",
            &FieldConfig::new("#city", [FieldEntry::Input]).with_menu(".dropdown"),
        )
    }

    fn mount_city(driver: &MockDriver) {
        driver.add_element("#city", ElementHandle::new("div"));
        driver.add_element("#city >> input", ElementHandle::new("input"));
        let options = Locator::new(".dropdown").find(CHECKBOX_SELECTOR);
        for label in ["Lyon", "Paris"] {
            driver.add_element(
                options.clone(),
                ElementHandle::new("input").with_attr("type", "checkbox").with_text(label),
            );
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_from_config_builds_menu() {
            let config = FieldConfig::new("#city", [FieldEntry::Input, FieldEntry::Multiselect])
                .with_menu(".dropdown")
                .with_placeholder("Search a city")
                .optional()
                .with_request(RequestConfig::on_load("/api/cities"));
            let field = Field::from_config("city", &config);
            let menu = field.component_menu().unwrap();
            assert_eq!(menu.on_load_request().unwrap().url, "/api/cities");
            assert_eq!(field.placeholder(), Some("Search a city"));
            assert!(field.is_optional());
        }

        #[test]
        fn test_placeholder_only_for_text_entries() {
            let mut radio = Field::new("gender", Locator::new("#gender"), [FieldEntry::Radio]);
            assert!(!radio.set_placeholder("Pick one"));
            assert_eq!(radio.placeholder(), None);
            radio.add_entry(FieldEntry::Select);
            radio.add_entry(FieldEntry::Select);
            assert_eq!(radio.entries().len(), 2);
            assert!(radio.set_placeholder("Pick one"));
            radio.remove_entry(FieldEntry::Select);
            assert_eq!(radio.placeholder(), None);
        }

        #[test]
        fn test_set_on_load_url_by_entry() {
            let mut label = Field::new("total", Locator::new("#total"), [FieldEntry::Label]);
            assert!(!label.set_on_load_url("/api/total"));
            let mut select = Field::new("country", Locator::new("#country"), [FieldEntry::Select]);
            assert!(select.set_on_load_url("/api/countries"));
            assert_eq!(
                select.on_load_request(),
                Some(&LoadRequest::new("/api/countries"))
            );
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_autocomplete_targets_nested_input() {
            let (session, driver) = fast();
            mount_city(&driver);
            let field = city();
            field.type_text(&session, "Ly").await.unwrap();
            assert_eq!(
                driver.history(),
                vec![
                    "scroll:#city >> input".to_string(),
                    "clear:#city >> input".to_string(),
                    "type:#city >> input:Ly".to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_plain_input_targets_itself() {
            let (session, driver) = fast();
            driver.add_element("#name", ElementHandle::new("input").with_value("old"));
            let field = Field::new("name", Locator::new("#name"), [FieldEntry::Input]);
            field.type_text(&session, "Ada").await.unwrap();
            assert_eq!(driver.element("#name").unwrap().value.as_deref(), Some("Ada"));
            assert!(field.is_value(&session, "Ada").await.is_ok());
        }
    }

    mod fill_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_autocomplete_selects_first_item() {
            let (session, driver) = fast();
            mount_city(&driver);
            let field = city();
            let filled = field
                .fill(&session, &["Ly".to_string()], &[], false)
                .await
                .unwrap();
            assert_eq!(filled, vec!["Ly".to_string()]);
            assert!(driver.was_called("click:#city >> input:force"));
            assert!(driver.was_called("type:#city >> input:Ly"));
            let first = Locator::new(".dropdown").find(CHECKBOX_SELECTOR).first().parent();
            assert!(driver.was_called(&format!("click:{first}:force")));
        }

        #[tokio::test]
        async fn test_fill_select_and_multiselect() {
            let (session, driver) = fast();
            driver.add_element("#country", ElementHandle::new("select"));
            driver.add_element("#tags", ElementHandle::new("select"));
            let country = Field::new("country", Locator::new("#country"), [FieldEntry::Select]);
            let tags = Field::new("tags", Locator::new("#tags"), [FieldEntry::Multiselect]);

            country.fill(&session, &["FR".to_string()], &[], false).await.unwrap();
            tags.fill(&session, &["a".to_string(), "b".to_string()], &[], true)
                .await
                .unwrap();
            assert_eq!(
                driver.calls_matching("select:"),
                vec![
                    "select:#country:FR".to_string(),
                    "select:#tags:a".to_string(),
                    "select:#tags:b".to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_fill_without_values_picks_random() {
            let (session, driver) = fast();
            mount_city(&driver);
            let field = Field::from_config(
                "city",
                &FieldConfig::new("#city", [FieldEntry::Input, FieldEntry::Multiselect])
                    .with_menu(".dropdown"),
            );
            let picked = field
                .fill(&session, &[], &["Lyon".to_string()], false)
                .await
                .unwrap();
            assert_eq!(picked, vec!["Paris".to_string()]);
        }

        #[tokio::test]
        async fn test_fill_without_values_plain_input_is_noop() {
            let (session, driver) = fast();
            let field = Field::new("name", Locator::new("#name"), [FieldEntry::Input]);
            assert!(field.fill(&session, &[], &[], false).await.unwrap().is_empty());
            assert!(driver.history().is_empty());
        }

        #[tokio::test]
        async fn test_fill_waits_for_pending_load() {
            let (session, driver) = fast();
            driver.add_element("#country", ElementHandle::new("select"));
            let mut page = Component::new(ComponentKind::Page, "signup");
            page.set_field(
                "country",
                Field::from_config(
                    "country",
                    &FieldConfig::new("#country", [FieldEntry::Select])
                        .with_request(RequestConfig::on_load("/api/countries")),
                ),
            );
            page.init(&session).await.unwrap();
            let field = page.field("country").unwrap();
            field.fill(&session, &["FR".to_string()], &[], false).await.unwrap();
            assert!(driver.was_called("wait:@country"));
        }

        #[tokio::test]
        async fn test_fill_missing_field_fails() {
            let (session, _driver) = fast();
            let field = Field::new("ghost", Locator::new("#ghost"), [FieldEntry::Input]);
            let err = field
                .fill(&session, &["x".to_string()], &[], false)
                .await
                .unwrap_err();
            assert!(err.is_assertion());
        }
    }

    mod validate_tests {
        use super::*;

        #[tokio::test]
        async fn test_validate_plain_input_compares_value() {
            let (session, driver) = fast();
            driver.add_element("#name", ElementHandle::new("input").with_value("Ada"));
            let field = Field::new("name", Locator::new("#name"), [FieldEntry::Input]);
            assert!(field
                .validate_filled_fields(&session, &["Ada".to_string()])
                .await
                .is_ok());
            assert!(field
                .validate_filled_fields(&session, &["Bob".to_string()])
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_validate_autocomplete_checks_text() {
            let (session, driver) = fast();
            driver.add_element("#city", ElementHandle::new("div").with_text("Lyon"));
            let field = city();
            assert!(field
                .validate_filled_fields(&session, &["Lyon".to_string()])
                .await
                .is_ok());
        }
    }
}
