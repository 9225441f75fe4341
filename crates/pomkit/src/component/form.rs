//! Forms: named fields filled from JSON data, plus submit buttons.
//!
//! Only truthy values are entered, so `""`, `0`, `false` and `null` leave a
//! field untouched.

use super::{Actionable, Button, Child, Component, ComponentKind, Field};
use crate::config::{ElementConfig, FieldConfig};
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// JavaScript truthiness of a JSON value
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Values of one form entry, and whether it names several options
fn field_values(value: &Value) -> (Vec<String>, bool) {
    match value {
        Value::Array(items) => (items.iter().filter_map(scalar).collect(), true),
        other => (scalar(other).into_iter().collect(), false),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn as_object(data: &Value) -> PomResult<&Map<String, Value>> {
    data.as_object().ok_or_else(|| PomError::InvalidConfig {
        message: format!("form data must be a JSON object, got {data}"),
    })
}

/// Group of fields with submit buttons
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    base: Component,
}

super::specialization!(Form, default_actions);

impl Form {
    /// Form at `locator`
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<Locator>) -> Self {
        Self {
            base: Component::new(ComponentKind::Form, name).with_locator(locator),
        }
    }

    /// Form from a declaration
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &ElementConfig) -> Self {
        let mut form = Self::new(name, config.selector.as_str());
        form.base.apply_requests(&config.request);
        form
    }

    /// Keys of the field children
    #[must_use]
    pub fn field_keys(&self) -> Vec<&str> {
        self.children()
            .iter()
            .filter(|(_, child)| child.kind() == ComponentKind::Field)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Fields named after their keys; autocomplete fields get a `<key>_menu`
    pub fn set_fields<I, K>(&mut self, configs: I)
    where
        I: IntoIterator<Item = (K, FieldConfig)>,
        K: Into<String>,
    {
        for (key, config) in configs {
            let key = key.into();
            let field = Field::from_config(key.clone(), &config);
            self.base.set_field(key, field);
        }
    }

    /// Fill every field named in `data` whose value is truthy, skipping
    /// `ignore`. Arrays fill multi-valued fields. Returns what each field
    /// received, random picks included.
    pub async fn fill(
        &self,
        session: &Session,
        data: &Value,
        ignore: &[&str],
    ) -> PomResult<BTreeMap<String, Vec<String>>> {
        let data = as_object(data)?;
        let mut filled = BTreeMap::new();
        for (key, value) in data {
            if !is_truthy(value) || ignore.contains(&key.as_str()) {
                continue;
            }
            let Some(field) = self.field(key) else {
                continue;
            };
            let (values, is_multiple) = field_values(value);
            let entered = field.fill(session, &values, &[], is_multiple).await?;
            filled.insert(key.clone(), entered);
        }
        tracing::debug!(form = %self.name(), fields = filled.len(), "form filled");
        Ok(filled)
    }

    /// Assert every field named in `data`, except `ignore`, shows its value
    pub async fn valid_fields_values(
        &self,
        session: &Session,
        data: &Value,
        ignore: &[&str],
    ) -> PomResult<()> {
        for (key, value) in as_object(data)? {
            if ignore.contains(&key.as_str()) {
                continue;
            }
            if let Some(field) = self.field(key) {
                let (values, _) = field_values(value);
                field.validate_filled_fields(session, &values).await?;
            }
        }
        Ok(())
    }

    /// Buttons with the SUBMIT role, in key order
    #[must_use]
    pub fn submit_buttons(&self) -> Vec<&Button> {
        self.children()
            .values()
            .filter_map(Child::as_button)
            .filter(|button| button.is_submit())
            .collect()
    }

    /// Click the first submit button; `false` when the form has none
    pub async fn submit_form(&self, session: &Session) -> PomResult<bool> {
        let Some(button) = self.submit_buttons().into_iter().next() else {
            tracing::warn!(form = %self.name(), "No submit fields found.");
            return Ok(false);
        };
        button.click(session).await?;
        Ok(true)
    }
}
