//! PageDriver - Abstract Browser Automation Trait
//!
//! Components never talk to a browser directly. Every query, action, storage
//! call and network-alias wait goes through [`PageDriver`], so the component
//! tree can run on top of any engine (CDP, WebDriver, a Playwright bridge) or on
//! the in-memory [`MockDriver`] used by the test suite.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Page / Form / Field / Datatable / Menu ...                 │
//! │        │  (compose, wait, assert)                            │
//! │        ▼                                                     │
//! │  Session ── PageDriver (trait) ──┬── MockDriver (tests)      │
//! │                                  └── engine adapters         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::{Locator, LocatorStep};
use crate::network::{HttpMethod, InterceptRegistry, InterceptedExchange};
use crate::result::{PomError, PomResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// Snapshot of one DOM element at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Unique identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Element text content
    pub text_content: Option<String>,
    /// Form value (`input`, `select`, `textarea`)
    pub value: Option<String>,
    /// Whether the element is rendered and visible
    pub visible: bool,
    /// Whether the element accepts interaction
    pub enabled: bool,
    /// Class list
    pub classes: Vec<String>,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Computed CSS properties
    pub css: BTreeMap<String, String>,
}

impl ElementHandle {
    /// Create a new visible, enabled element handle
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag_name: tag_name.into(),
            text_content: None,
            value: None,
            visible: true,
            enabled: true,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            css: BTreeMap::new(),
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Set form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS property
    #[must_use]
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Mark as not visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Text content, empty when absent
    #[must_use]
    pub fn text(&self) -> &str {
        self.text_content.as_deref().unwrap_or("")
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Options for element actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Skip actionability checks (covered, animating, disabled)
    pub force: bool,
}

impl ActionOptions {
    /// Forced action
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

/// Abstract driver trait for browser automation
///
/// Every method resolves its locator afresh.
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL
    async fn visit(&self, url: &str) -> PomResult<()>;

    /// Get current URL
    async fn current_url(&self) -> PomResult<String>;

    /// Get page title
    async fn title(&self) -> PomResult<String>;

    /// Clear persisted local storage
    async fn clear_local_storage(&self) -> PomResult<()>;

    /// Snapshot every element the locator currently matches
    async fn query_all(&self, locator: &Locator) -> PomResult<Vec<ElementHandle>>;

    /// Click element
    async fn click(&self, locator: &Locator, options: ActionOptions) -> PomResult<()>;

    /// Clear the value of an input
    async fn clear(&self, locator: &Locator, options: ActionOptions) -> PomResult<()>;

    /// Type text into element
    async fn type_text(&self, locator: &Locator, text: &str, options: ActionOptions)
        -> PomResult<()>;

    /// Choose an option of a select element
    async fn select_option(
        &self,
        locator: &Locator,
        option: &str,
        options: ActionOptions,
    ) -> PomResult<()>;

    /// Scroll element into view
    async fn scroll_into_view(&self, locator: &Locator) -> PomResult<()>;

    /// Register a network-intercept alias
    async fn intercept(&self, method: HttpMethod, url: &str, alias: &str) -> PomResult<()>;

    /// Await one completion of an alias
    async fn wait_for_alias(&self, alias: &str, timeout: Duration)
        -> PomResult<InterceptedExchange>;
}

#[derive(Debug)]
struct ClickRequest {
    method: HttpMethod,
    url: String,
    status: u16,
}

#[derive(Debug)]
struct MockState {
    current_url: String,
    title: String,
    elements: HashMap<String, Vec<ElementHandle>>,
    click_requests: HashMap<String, Vec<ClickRequest>>,
    local_storage: BTreeMap<String, String>,
    network: InterceptRegistry,
    call_history: Vec<String>,
    auto_respond: bool,
}

/// In-memory driver for unit testing
///
/// Elements are stored under the rendered string of the locator that finds
/// them. Refinements (`nth`, `parent`, `containing`) that have no entry of their
/// own are resolved from their prefix; `parent()` resolves to the matched
/// element itself, so clicking a checkbox wrapper hits the checkbox.
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                current_url: String::new(),
                title: String::new(),
                elements: HashMap::new(),
                click_requests: HashMap::new(),
                local_storage: BTreeMap::new(),
                network: InterceptRegistry::new(),
                call_history: Vec::new(),
                auto_respond: true,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a mock element under a locator
    pub fn add_element(&self, locator: impl Into<Locator>, element: ElementHandle) {
        let key = locator.into().to_string();
        self.state().elements.entry(key).or_default().push(element);
    }

    /// Replace every element under a locator
    pub fn set_elements(&self, locator: impl Into<Locator>, elements: Vec<ElementHandle>) {
        let key = locator.into().to_string();
        self.state().elements.insert(key, elements);
    }

    /// Remove every element under a locator
    pub fn remove_elements(&self, locator: impl Into<Locator>) {
        let key = locator.into().to_string();
        self.state().elements.remove(&key);
    }

    /// First element currently stored under a locator
    #[must_use]
    pub fn element(&self, locator: impl Into<Locator>) -> Option<ElementHandle> {
        let locator = locator.into();
        let state = self.state();
        Self::resolve_refs(&state, &locator)
            .first()
            .and_then(|(key, i)| state.elements.get(key).and_then(|v| v.get(*i)).cloned())
    }

    /// Clicking `locator` completes a request (simulated application traffic)
    pub fn on_click_request(
        &self,
        locator: impl Into<Locator>,
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
    ) {
        let key = locator.into().to_string();
        self.state()
            .click_requests
            .entry(key)
            .or_default()
            .push(ClickRequest {
                method,
                url: url.into(),
                status,
            });
    }

    /// Simulate a completed request from the application
    pub fn fire(&self, method: HttpMethod, url: &str, status: u16) -> Vec<String> {
        self.state().network.record(url, method, status)
    }

    /// Let waits on registered aliases resolve without simulated traffic
    pub fn set_auto_respond(&self, enabled: bool) {
        self.state().auto_respond = enabled;
    }

    /// Set the current URL without recording a visit
    pub fn set_url(&self, url: impl Into<String>) {
        self.state().current_url = url.into();
    }

    /// Set the page title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Seed a local storage entry
    pub fn set_local_storage(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state().local_storage.insert(key.into(), value.into());
    }

    /// Number of local storage entries
    #[must_use]
    pub fn local_storage_len(&self) -> usize {
        self.state().local_storage.len()
    }

    /// Registered aliases in registration order
    #[must_use]
    pub fn registered_aliases(&self) -> Vec<String> {
        self.state()
            .network
            .aliases()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Calls starting with `prefix`, in order
    #[must_use]
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.state()
            .call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.state().call_history.clear();
    }

    fn resolve_refs(state: &MockState, locator: &Locator) -> Vec<(String, usize)> {
        let key = locator.to_string();
        if let Some(elements) = state.elements.get(&key) {
            return (0..elements.len()).map(|i| (key.clone(), i)).collect();
        }
        let Some((prefix, step)) = locator.split_last() else {
            return Vec::new();
        };
        let refs = Self::resolve_refs(state, &prefix);
        match step {
            LocatorStep::Nth(index) => refs.into_iter().nth(*index).into_iter().collect(),
            LocatorStep::Parent => refs,
            LocatorStep::Containing(text) => refs
                .into_iter()
                .filter(|(k, i)| {
                    state
                        .elements
                        .get(k)
                        .and_then(|v| v.get(*i))
                        .is_some_and(|e| e.text().contains(text.as_str()))
                })
                .collect(),
            LocatorStep::Find(_) => Vec::new(),
        }
    }

    fn resolve(state: &MockState, locator: &Locator) -> Vec<ElementHandle> {
        Self::resolve_refs(state, locator)
            .into_iter()
            .filter_map(|(k, i)| state.elements.get(&k).and_then(|v| v.get(i)).cloned())
            .collect()
    }

    /// Unforced actions refuse a disabled first match
    fn check_actionable(
        state: &MockState,
        locator: &Locator,
        options: ActionOptions,
    ) -> PomResult<()> {
        if options.force {
            return Ok(());
        }
        match Self::resolve(state, locator).first() {
            Some(element) if !element.enabled => Err(PomError::Driver {
                message: format!("element '{locator}' is disabled"),
            }),
            _ => Ok(()),
        }
    }

    fn with_first_mut<F>(state: &mut MockState, locator: &Locator, f: F) -> PomResult<()>
    where
        F: FnOnce(&mut ElementHandle),
    {
        let (key, index) = Self::resolve_refs(state, locator)
            .into_iter()
            .next()
            .ok_or_else(|| PomError::Driver {
                message: format!("no element matches '{locator}'"),
            })?;
        if let Some(element) = state.elements.get_mut(&key).and_then(|v| v.get_mut(index)) {
            f(element);
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn visit(&self, url: &str) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("visit:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> PomResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn title(&self) -> PomResult<String> {
        Ok(self.state().title.clone())
    }

    async fn clear_local_storage(&self) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push("clear_local_storage".to_string());
        state.local_storage.clear();
        Ok(())
    }

    async fn query_all(&self, locator: &Locator) -> PomResult<Vec<ElementHandle>> {
        Ok(Self::resolve(&self.state(), locator))
    }

    async fn click(&self, locator: &Locator, options: ActionOptions) -> PomResult<()> {
        let mut state = self.state();
        let suffix = if options.force { ":force" } else { "" };
        state.call_history.push(format!("click:{locator}{suffix}"));
        Self::check_actionable(&state, locator, options)?;
        Self::with_first_mut(&mut state, locator, |element| {
            if element.attr("type") == Some("checkbox") {
                let checked = element.attr("checked") == Some("true");
                element
                    .attributes
                    .insert("checked".into(), (!checked).to_string());
            }
        })?;

        let key = locator.to_string();
        let fired: Vec<(HttpMethod, String, u16)> = state
            .click_requests
            .get(&key)
            .map(|requests| {
                requests
                    .iter()
                    .map(|r| (r.method, r.url.clone(), r.status))
                    .collect()
            })
            .unwrap_or_default();
        for (method, url, status) in fired {
            state.network.record(&url, method, status);
        }
        Ok(())
    }

    async fn clear(&self, locator: &Locator, options: ActionOptions) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("clear:{locator}"));
        Self::check_actionable(&state, locator, options)?;
        Self::with_first_mut(&mut state, locator, |element| {
            element.value = Some(String::new());
        })
    }

    async fn type_text(
        &self,
        locator: &Locator,
        text: &str,
        options: ActionOptions,
    ) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("type:{locator}:{text}"));
        Self::check_actionable(&state, locator, options)?;
        Self::with_first_mut(&mut state, locator, |element| {
            element.value.get_or_insert_with(String::new).push_str(text);
        })
    }

    async fn select_option(
        &self,
        locator: &Locator,
        option: &str,
        options: ActionOptions,
    ) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("select:{locator}:{option}"));
        Self::check_actionable(&state, locator, options)?;
        Self::with_first_mut(&mut state, locator, |element| {
            element.value = Some(option.to_string());
        })
    }

    async fn scroll_into_view(&self, locator: &Locator) -> PomResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("scroll:{locator}"));
        Self::with_first_mut(&mut state, locator, |_| {})
    }

    async fn intercept(&self, method: HttpMethod, url: &str, alias: &str) -> PomResult<()> {
        let mut state = self.state();
        state
            .call_history
            .push(format!("intercept:{method} {url} as {alias}"));
        state.network.register(method, url, alias)?;
        Ok(())
    }

    async fn wait_for_alias(
        &self,
        alias: &str,
        timeout: Duration,
    ) -> PomResult<InterceptedExchange> {
        let mut state = self.state();
        state.call_history.push(format!("wait:@{alias}"));
        if let Some(exchange) = state.network.take(alias)? {
            return Ok(exchange);
        }
        if state.auto_respond {
            if let Some(route) = state.network.route(alias) {
                let url = route.url().to_string();
                let method = route.method;
                state.network.record(&url, method, 200);
                if let Some(exchange) = state.network.take(alias)? {
                    return Ok(exchange);
                }
            }
        }
        Err(PomError::Timeout {
            what: format!("@{alias}"),
            ms: timeout.as_millis() as u64,
        })
    }
}
