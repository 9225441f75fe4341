//! Buttons and links.

use super::{Component, ComponentKind};
use crate::config::ButtonConfig;
use crate::locator::Locator;
use serde::{Deserialize, Serialize};

/// Role of a button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ButtonEntry {
    /// Plain action button
    #[default]
    Button,
    /// Submits the enclosing form
    Submit,
    /// Link
    Href,
}

/// Clickable button or link
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    base: Component,
    entry: ButtonEntry,
    text: Option<String>,
}

super::specialization!(Button, default_actions);

impl Button {
    /// Button at `locator`
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<Locator>, entry: ButtonEntry) -> Self {
        Self {
            base: Component::new(ComponentKind::Button, name).with_locator(locator),
            entry,
            text: None,
        }
    }

    /// Button from a declaration
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &ButtonConfig) -> Self {
        let mut button = Self::new(name, config.selector.as_str(), config.entry);
        button.base.apply_requests(&config.request);
        button.text.clone_from(&config.text);
        button
    }

    /// Set display text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Role
    #[must_use]
    pub const fn entry(&self) -> ButtonEntry {
        self.entry
    }

    /// Change the role
    pub fn set_entry(&mut self, entry: ButtonEntry) {
        self.entry = entry;
    }

    /// Display text
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Change the display text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Whether this button submits its form
    #[must_use]
    pub fn is_submit(&self) -> bool {
        self.entry == ButtonEntry::Submit
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::RequestConfig;

    #[test]
    fn test_from_config() {
        let config = ButtonConfig::submit("#save")
            .with_text("Save")
            .with_request(RequestConfig::on_event("/api/save").with_event_method("put"));
        let button = Button::from_config("save", &config);
        assert!(button.is_submit());
        assert_eq!(button.text(), Some("Save"));
        assert_eq!(button.kind(), ComponentKind::Button);
        assert_eq!(button.on_event_request().unwrap().method, "PUT");
    }

    #[test]
    fn test_entry_serde() {
        let entry: ButtonEntry = serde_json::from_str("\"HREF\"").unwrap();
        assert_eq!(entry, ButtonEntry::Href);
        assert_eq!(ButtonEntry::default(), ButtonEntry::Button);
    }
}
