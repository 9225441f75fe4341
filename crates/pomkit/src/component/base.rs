//! The base component: identity, locator, children and element assertions.

use super::{
    Button, Child, Column, ComponentKind, Datatable, EventRequest, Field, Form, Graph,
    Language, LoadRequest, Menu,
};
use crate::assertion::{self, AssertionOutcome, AssertionResult, Matcher};
use crate::config::{ButtonConfig, ElementConfig, MenuConfig, RequestConfig};
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Leading decimal number, as a browser's `parseFloat` reads it
const LEADING_NUMBER: &str = r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?";

/// A node of the page-object tree
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    kind: ComponentKind,
    locator: Option<Locator>,
    children: BTreeMap<String, Child>,
    on_load: Option<LoadRequest>,
    on_event: Option<EventRequest>,
    lang: Language,
}

impl Component {
    /// Component without a locator
    #[must_use]
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            locator: None,
            children: BTreeMap::new(),
            on_load: None,
            on_event: None,
            lang: Language::default(),
        }
    }

    /// Generic component at `locator`
    #[must_use]
    pub fn generic(name: impl Into<String>, locator: impl Into<Locator>) -> Self {
        Self::new(ComponentKind::Generic, name).with_locator(locator)
    }

    /// Generic component from a declaration
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &ElementConfig) -> Self {
        let mut component = Self::generic(name, config.selector.as_str());
        component.apply_requests(&config.request);
        component
    }

    /// Set locator
    #[must_use]
    pub fn with_locator(mut self, locator: impl Into<Locator>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Set on-load request
    #[must_use]
    pub fn with_load_request(mut self, request: LoadRequest) -> Self {
        self.on_load = Some(request);
        self
    }

    /// Set on-event request
    #[must_use]
    pub fn with_event_request(mut self, request: EventRequest) -> Self {
        self.on_event = Some(request);
        self
    }

    pub(crate) fn apply_requests(&mut self, request: &RequestConfig) {
        if let Some(load) = request.load_request() {
            self.on_load = Some(load);
        }
        if let Some(event) = request.event_request() {
            self.on_event = Some(event);
        }
    }

    /// Name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Locator, if one was declared
    #[must_use]
    pub const fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// Content language
    #[must_use]
    pub const fn lang(&self) -> Language {
        self.lang
    }

    /// Set the content language
    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    /// Replace the locator
    pub fn set_locator(&mut self, locator: impl Into<Locator>) {
        self.locator = Some(locator.into());
    }

    /// Locator, or [`PomError::MissingLocator`]
    pub fn element_locator(&self) -> PomResult<&Locator> {
        self.locator.as_ref().ok_or_else(|| PomError::MissingLocator {
            component: self.name.clone(),
        })
    }

    /// Declared on-load request
    #[must_use]
    pub const fn on_load_request(&self) -> Option<&LoadRequest> {
        self.on_load.as_ref()
    }

    /// Declared on-event request
    #[must_use]
    pub const fn on_event_request(&self) -> Option<&EventRequest> {
        self.on_event.as_ref()
    }

    /// Declare the on-load request
    pub fn set_load_request(&mut self, request: LoadRequest) {
        self.on_load = Some(request);
    }

    /// Declare the on-event request
    pub fn set_event_request(&mut self, request: EventRequest) {
        self.on_event = Some(request);
    }

    /// Point the on-load request at `url`. Only menus and datatables source
    /// their content this way; other kinds ignore the call.
    pub fn set_on_load_url(&mut self, url: impl Into<String>) -> bool {
        if matches!(self.kind, ComponentKind::Menu | ComponentKind::Datatable) {
            self.replace_load_url(url.into());
            true
        } else {
            tracing::debug!(component = %self.name, kind = %self.kind, "on-load URL ignored");
            false
        }
    }

    pub(crate) fn replace_load_url(&mut self, url: String) {
        match &mut self.on_load {
            Some(load) => load.url = url,
            None => self.on_load = Some(LoadRequest::new(url)),
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Child map
    #[must_use]
    pub const fn children(&self) -> &BTreeMap<String, Child> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<String, Child> {
        &mut self.children
    }

    /// Child stored under `key`
    #[must_use]
    pub fn element(&self, key: &str) -> Option<&Child> {
        self.children.get(key)
    }

    /// Child stored under `key`, mutably
    pub fn element_mut(&mut self, key: &str) -> Option<&mut Child> {
        self.children.get_mut(key)
    }

    /// Store a child under `key`, returning the one it replaced
    pub fn set_element(&mut self, key: impl Into<String>, child: impl Into<Child>) -> Option<Child> {
        self.children.insert(key.into(), child.into())
    }

    /// Generic children, named after their keys
    pub fn set_elements<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, ElementConfig)>,
        K: Into<String>,
    {
        for (key, config) in configs {
            let key = key.into();
            let component = Self::from_config(key.clone(), &config);
            self.set_element(key, component);
        }
    }

    /// Button children, named after their keys
    pub fn set_buttons<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, ButtonConfig)>,
        K: Into<String>,
    {
        for (key, config) in configs {
            let key = key.into();
            let button = Button::from_config(key.clone(), &config);
            self.set_element(key, button);
        }
    }

    /// Menu children, named after their keys
    pub fn set_menus<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, MenuConfig)>,
        K: Into<String>,
    {
        for (key, config) in configs {
            let key = key.into();
            let menu = Menu::from_config(key.clone(), &config);
            self.set_menu(key, menu);
        }
    }

    /// Store a field
    pub fn set_field(&mut self, key: impl Into<String>, field: Field) {
        self.set_element(key, field);
    }

    /// Store a form
    pub fn set_form(&mut self, key: impl Into<String>, form: Form) {
        self.set_element(key, form);
    }

    /// Store a datatable
    pub fn set_table(&mut self, key: impl Into<String>, table: Datatable) {
        self.set_element(key, table);
    }

    /// Store a graph
    pub fn set_graph(&mut self, key: impl Into<String>, graph: Graph) {
        self.set_element(key, graph);
    }

    /// Store a button
    pub fn set_button(&mut self, key: impl Into<String>, button: Button) {
        self.set_element(key, button);
    }

    /// Store a menu unless `key` is taken
    pub fn set_menu(&mut self, key: impl Into<String>, menu: Menu) -> bool {
        let key = key.into();
        if self.children.contains_key(&key) {
            tracing::warn!(component = %self.name, key = %key, "Menu '{key}' already exists.");
            return false;
        }
        self.children.insert(key, menu.into());
        true
    }

    /// Autocomplete menu, the child keyed `<name>_menu`
    #[must_use]
    pub fn component_menu(&self) -> Option<&Menu> {
        self.children
            .get(&format!("{}_menu", self.name))
            .and_then(Child::as_menu)
    }

    /// Autocomplete menu, mutably
    pub fn component_menu_mut(&mut self) -> Option<&mut Menu> {
        let key = format!("{}_menu", self.name);
        self.children.get_mut(&key).and_then(Child::as_menu_mut)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// For each value, assert the element contains it and click the match
    pub async fn click_on<V>(&self, session: &Session, values: &[V]) -> PomResult<()>
    where
        V: AsRef<str> + Sync,
    {
        let locator = self.element_locator()?;
        for value in values.iter().map(AsRef::as_ref) {
            let message = format!("Failed to find {value} in {}.", self.name);
            session
                .with_failure_message(message, async {
                    assertion::assert_contains(session, locator, &[value]).await?;
                    session
                        .driver()
                        .click(&locator.containing(value), session.action_options())
                        .await
                })
                .await?;
        }
        Ok(())
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// At least one match
    pub async fn exist(&self, session: &Session) -> PomResult<AssertionOutcome> {
        assertion::assert_exist(session, self.element_locator()?, None).await
    }

    /// Exactly `count` matches
    pub async fn has_count(&self, session: &Session, count: usize) -> PomResult<AssertionOutcome> {
        assertion::assert_exist(session, self.element_locator()?, Some(count)).await
    }

    /// Some match is visible
    pub async fn visible(&self, session: &Session) -> PomResult<AssertionOutcome> {
        assertion::assert_visible(session, self.element_locator()?).await
    }

    /// Matches exist and none is visible
    pub async fn not_visible(&self, session: &Session) -> PomResult<AssertionOutcome> {
        assertion::assert_not_visible(session, self.element_locator()?).await
    }

    /// All matches are enabled
    pub async fn enabled(&self, session: &Session) -> PomResult<AssertionOutcome> {
        assertion::assert_enabled(session, self.element_locator()?).await
    }

    /// All matches are disabled
    pub async fn disabled(&self, session: &Session) -> PomResult<AssertionOutcome> {
        assertion::assert_disabled(session, self.element_locator()?).await
    }

    /// Text contains every value
    pub async fn contains<V>(&self, session: &Session, values: &[V]) -> PomResult<AssertionOutcome>
    where
        V: AsRef<str> + Sync,
    {
        assertion::assert_contains(session, self.element_locator()?, values).await
    }

    /// No match contains `text`
    pub async fn not_contains(&self, session: &Session, text: &str) -> PomResult<AssertionOutcome> {
        assertion::assert_not_contains(session, self.element_locator()?, text).await
    }

    /// Some match carries `class`
    pub async fn have_class(&self, session: &Session, class: &str) -> PomResult<AssertionOutcome> {
        let matcher = Matcher::HaveClass(class.to_string());
        assertion::assert_should(session, self.element_locator()?, &matcher).await
    }

    /// First match has `property: value`
    pub async fn have_css(
        &self,
        session: &Session,
        property: &str,
        value: &str,
    ) -> PomResult<AssertionOutcome> {
        let matcher = Matcher::HaveCss {
            property: property.to_string(),
            value: value.to_string(),
        };
        assertion::assert_should(session, self.element_locator()?, &matcher).await
    }

    /// Parent of the first match has `property: value`
    pub async fn parent_have_css(
        &self,
        session: &Session,
        property: &str,
        value: &str,
    ) -> PomResult<AssertionOutcome> {
        let matcher = Matcher::HaveCss {
            property: property.to_string(),
            value: value.to_string(),
        };
        let parent = self.element_locator()?.parent();
        assertion::assert_should(session, &parent, &matcher).await
    }

    /// Some descendant has `property: value`
    pub async fn at_least_one_with_css(
        &self,
        session: &Session,
        property: &str,
        value: &str,
    ) -> PomResult<AssertionOutcome> {
        let descendants = self.element_locator()?.find("*");
        assertion::assert_at_least_one_with_css(session, &descendants, property, value).await
    }

    // =========================================================================
    // Numeric content
    // =========================================================================

    /// Wait for pending data, then read the leading number of the visible
    /// text (`NaN` when the text does not start with one)
    pub async fn wait_for_value(&self, session: &Session) -> PomResult<f64> {
        self.wait_for_pending_load(session).await?;
        self.visible(session).await?;
        let elements = session.driver().query_all(self.element_locator()?).await?;
        let text = elements.first().map(|e| e.text().to_string()).unwrap_or_default();
        Ok(leading_number(&text).unwrap_or(f64::NAN))
    }

    /// Numeric content, if any
    pub async fn as_number(&self, session: &Session) -> PomResult<Option<f64>> {
        let value = self.wait_for_value(session).await?;
        Ok((!value.is_nan()).then_some(value))
    }

    /// Assert the content reads as a number
    pub async fn as_valid_number(&self, session: &Session) -> PomResult<AssertionOutcome> {
        let value = self.wait_for_value(session).await?;
        let result = if value.is_nan() {
            AssertionResult::fail(format!("expected '{}' to hold a number", self.name))
        } else {
            AssertionResult::pass()
        };
        result.conclude(Some(session), &format!("Assert \"{}\" Is A Valid Number", self.name))
    }
}

static LEADING_NUMBER_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn leading_number_pattern() -> Option<&'static Regex> {
    LEADING_NUMBER_RE
        .get_or_init(|| Regex::new(LEADING_NUMBER).ok())
        .as_ref()
}

fn leading_number(text: &str) -> Option<f64> {
    leading_number_pattern()?
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

macro_rules! typed_accessor {
    ($get:ident, $get_mut:ident, $as_ref:ident, $as_mut:ident, $ty:ident, $label:literal) => {
        impl Component {
            #[doc = concat!("[`", stringify!($ty), "`] child under `key`; logs a warning on a miss")]
            #[must_use]
            pub fn $get(&self, key: &str) -> Option<&$ty> {
                let found = self.children.get(key).and_then(Child::$as_ref);
                if found.is_none() {
                    tracing::warn!(component = %self.name, key, concat!($label, " '{}' not found."), key);
                }
                found
            }

            #[doc = concat!("[`", stringify!($ty), "`] child under `key`, mutably")]
            pub fn $get_mut(&mut self, key: &str) -> Option<&mut $ty> {
                let name = &self.name;
                let found = self.children.get_mut(key).and_then(Child::$as_mut);
                if found.is_none() {
                    tracing::warn!(component = %name, key, concat!($label, " '{}' not found."), key);
                }
                found
            }
        }
    };
}

typed_accessor!(button, button_mut, as_button, as_button_mut, Button, "Button");
typed_accessor!(field, field_mut, as_field, as_field_mut, Field, "Field");
typed_accessor!(form, form_mut, as_form, as_form_mut, Form, "Form");
typed_accessor!(table, table_mut, as_datatable, as_datatable_mut, Datatable, "Datatable");
typed_accessor!(menu, menu_mut, as_menu, as_menu_mut, Menu, "Menu");
typed_accessor!(graph, graph_mut, as_graph, as_graph_mut, Graph, "Graph");
typed_accessor!(column, column_mut, as_column, as_column_mut, Column, "Column");
