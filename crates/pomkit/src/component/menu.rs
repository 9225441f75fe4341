//! Dropdowns, option lists and autocomplete panels.
//!
//! Items are located through checkbox-like descendants: a real
//! `input[type="checkbox"]` when the widget renders one (clicked through its
//! wrapping label), otherwise the first of [`CHECKBOX_FALLBACK_CLASSES`] that
//! matches anything.

use super::{Button, ButtonEntry, Child, Component, ComponentKind};
use crate::config::{ButtonConfig, MenuConfig};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::Session;
use crate::wait::poll_until;
use std::future::Future;

/// Native checkbox inputs
pub const CHECKBOX_SELECTOR: &str = r#"input[type="checkbox"]"#;

/// Checkbox look-alikes tried in order when no native checkbox exists
pub const CHECKBOX_FALLBACK_CLASSES: [&str; 3] = [".form-check-input", ".checkbox", ".p-checkbox"];

/// Options a select widget renders as unavailable
pub const DISABLED_OPTION_SELECTOR: &str = ".ng-option-disabled";

/// Options currently selected
pub const SELECTED_OPTION_SELECTOR: &str = r#".ng-option[aria-selected="true"]"#;

/// Dropdown whose children are selectable items
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    base: Component,
}

super::specialization!(Menu, default_actions);

impl Menu {
    /// Menu at `locator`
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<Locator>) -> Self {
        Self {
            base: Component::new(ComponentKind::Menu, name).with_locator(locator),
        }
    }

    /// Menu from a declaration; a submenu becomes the `<name>_menu` child
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &MenuConfig) -> Self {
        let name = name.into();
        let mut menu = Self::new(name.clone(), config.selector.as_str());
        menu.base.apply_requests(&config.request);
        if let Some(selector) = &config.submenu {
            let key = format!("{name}_menu");
            let mut submenu = Self::new(key.clone(), selector.as_str());
            submenu.base.apply_requests(&config.request);
            menu.base.set_menu(key, submenu);
        }
        menu
    }

    /// Item under `key`
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&Child> {
        self.element(key)
    }

    /// Button items named after their keys, each with an optional
    /// `<key>_menu` submenu sharing its requests
    pub fn set_items<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, MenuConfig)>,
        K: Into<String>,
    {
        for (key, config) in configs {
            let key = key.into();
            let button_config = ButtonConfig {
                selector: config.selector.clone(),
                entry: ButtonEntry::Button,
                text: None,
                request: config.request.clone(),
            };
            let mut item = Button::from_config(key.clone(), &button_config);
            if let Some(selector) = &config.submenu {
                let submenu_key = format!("{key}_menu");
                let mut submenu = Self::new(submenu_key.clone(), selector.as_str());
                submenu.base.apply_requests(&config.request);
                item.set_menu(submenu_key, submenu);
            }
            self.base.set_element(key, item);
        }
    }

    /// Run `action` against the menu's locator
    pub async fn interact_with_menu<F, Fut, T>(&self, action: F) -> PomResult<T>
    where
        F: FnOnce(Locator) -> Fut,
        Fut: Future<Output = PomResult<T>>,
    {
        let locator = self.element_locator()?.clone();
        action(locator).await
    }

    /// Click the item containing each value
    pub async fn select_items<V>(&self, session: &Session, values: &[V]) -> PomResult<()>
    where
        V: AsRef<str> + Sync,
    {
        self.base.click_on(session, values).await
    }

    /// Click the first checkbox-like item; `false` when there is none
    pub async fn select_first_item(&self, session: &Session) -> PomResult<bool> {
        let driver = session.driver();
        let locator = self.element_locator()?;

        let checkboxes = locator.find(CHECKBOX_SELECTOR);
        if !driver.query_all(&checkboxes).await?.is_empty() {
            driver
                .click(&checkboxes.first().parent(), session.action_options())
                .await?;
            return Ok(true);
        }
        for class in CHECKBOX_FALLBACK_CLASSES {
            let candidates = locator.find(class);
            if !driver.query_all(&candidates).await?.is_empty() {
                driver
                    .click(&candidates.first(), session.action_options())
                    .await?;
                return Ok(true);
            }
        }
        tracing::warn!(menu = %self.name(), "Neither first input checkbox nor any specific element found.");
        Ok(false)
    }

    /// Click one random eligible item, or two when `is_multiple`, and return
    /// their labels. Items whose label is empty or listed in `to_ignore` are
    /// never picked; the result is empty when nothing is eligible or the menu
    /// shows disabled options.
    pub async fn select_random_items<V>(
        &self,
        session: &Session,
        is_multiple: bool,
        to_ignore: &[V],
    ) -> PomResult<Vec<String>>
    where
        V: AsRef<str> + Sync,
    {
        let driver = session.driver();
        let locator = self.element_locator()?;

        let disabled = driver.query_all(&locator.find(DISABLED_OPTION_SELECTOR)).await?;
        if !disabled.is_empty() {
            tracing::warn!(menu = %self.name(), "No checkboxes found.");
            return Ok(Vec::new());
        }

        let checkboxes = locator.find(CHECKBOX_SELECTOR);
        let (items, through_label) = if driver.query_all(&checkboxes).await?.is_empty() {
            match self.fallback_items(session).await? {
                Some(items) => (items, false),
                None => {
                    tracing::warn!(menu = %self.name(), "Neither checkboxes nor any specific elements found.");
                    return Ok(Vec::new());
                }
            }
        } else {
            (checkboxes, true)
        };

        // label text lives on the wrapper of a native checkbox
        let label_source = if through_label { items.parent() } else { items.clone() };
        let labels: Vec<String> = driver
            .query_all(&label_source)
            .await?
            .iter()
            .map(|e| e.text().trim().to_string())
            .collect();
        let mut eligible: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| {
                !label.is_empty() && !to_ignore.iter().any(|i| i.as_ref() == label.as_str())
            })
            .map(|(index, _)| index)
            .collect();

        let wanted = if is_multiple { 2 } else { 1 };
        let mut selected = Vec::with_capacity(wanted);
        while selected.len() < wanted && !eligible.is_empty() {
            let index = eligible.swap_remove(session.random_index(eligible.len()));
            let target = if through_label {
                items.nth(index).parent()
            } else {
                items.nth(index)
            };
            driver.click(&target, session.action_options()).await?;
            selected.push(labels[index].clone());
        }

        if !is_multiple && !selected.is_empty() {
            self.wait_for_event_response(session).await?;
        }
        tracing::debug!(menu = %self.name(), ?selected, "random items selected");
        Ok(selected)
    }

    async fn fallback_items(&self, session: &Session) -> PomResult<Option<Locator>> {
        let locator = self.element_locator()?;
        for class in CHECKBOX_FALLBACK_CLASSES {
            let candidates = locator.find(class);
            if !session.driver().query_all(&candidates).await?.is_empty() {
                return Ok(Some(candidates));
            }
        }
        Ok(None)
    }

    /// Labels of the selected options
    pub async fn selected_items(&self, session: &Session) -> PomResult<Vec<String>> {
        let selected = self.element_locator()?.find(SELECTED_OPTION_SELECTOR);
        Ok(session
            .driver()
            .query_all(&selected)
            .await?
            .iter()
            .map(|e| e.text().trim().to_string())
            .collect())
    }

    /// Click `target` if it shows up within the assertion timeout. Never
    /// fails: misses and driver errors are logged.
    pub async fn click_if_exist(&self, session: &Session, target: &Locator) -> bool {
        let driver = session.driver();
        let found = poll_until(&session.assertion_wait(), || async move {
            driver.query_all(target).await.map(|els| !els.is_empty())
        })
        .await;
        match found {
            Ok(wait) if wait.success => match driver.click(target, session.action_options()).await {
                Ok(()) => {
                    tracing::info!(menu = %self.name(), element = %target, "Element found, proceeding with test");
                    true
                }
                Err(err) => {
                    tracing::warn!(menu = %self.name(), element = %target, error = %err, "click failed");
                    false
                }
            },
            Ok(_) => {
                tracing::info!(menu = %self.name(), element = %target, "Element not found, skipping test");
                false
            }
            Err(err) => {
                tracing::warn!(menu = %self.name(), element = %target, error = %err, "existence check failed");
                false
            }
        }
    }

    /// Whether `target` currently matches anything. Never fails.
    pub async fn is_element_exist(&self, session: &Session, target: &Locator) -> bool {
        match session.driver().query_all(target).await {
            Ok(elements) if !elements.is_empty() => true,
            Ok(_) => {
                tracing::info!(menu = %self.name(), element = %target, "Element not found.");
                false
            }
            Err(err) => {
                tracing::warn!(menu = %self.name(), element = %target, error = %err, "existence check failed");
                false
            }
        }
    }
}
