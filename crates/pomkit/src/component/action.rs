//! Action and assertion interpreters, and the overridable action surface.
//!
//! [`ActionCall`] and [`AssertionCall`] are the serializable `{method, params}`
//! records test data carries around. A whole list is parsed before the first
//! step runs, so a malformed entry anywhere fails the call with nothing done.

use super::{Child, Component};
use crate::assertion::AssertionOutcome;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ACTIONS
// =============================================================================

/// One serialized action: `{"method": "type", "params": ["Ada"]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCall {
    /// `click`, `type` or `select`
    pub method: String,
    /// Positional parameters
    #[serde(default)]
    pub params: Vec<Value>,
}

impl ActionCall {
    /// Call with no parameters
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// `click`
    #[must_use]
    pub fn click() -> Self {
        Self::new("click")
    }

    /// `type` with `text`
    #[must_use]
    pub fn type_text(text: impl Into<String>) -> Self {
        Self::new("type").with_param(Value::String(text.into()))
    }

    /// `select` with one parameter per option
    #[must_use]
    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        options
            .into_iter()
            .fold(Self::new("select"), |call, option| {
                call.with_param(Value::String(option.into()))
            })
    }

    /// Validate into an [`Action`]
    pub fn parse(&self) -> PomResult<Action> {
        match self.method.as_str() {
            "click" => Ok(Action::Click),
            "type" => self
                .params
                .first()
                .and_then(scalar_text)
                .map(Action::Type)
                .ok_or_else(|| missing(&self.method)),
            "select" => {
                let options = string_list(&self.params);
                if options.is_empty() {
                    Err(missing(&self.method))
                } else {
                    Ok(Action::Select(options))
                }
            }
            other => Err(PomError::UnsupportedAction {
                method: other.to_string(),
            }),
        }
    }
}

/// A validated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Forced click
    Click,
    /// Type text
    Type(String),
    /// Choose each option in turn
    Select(Vec<String>),
}

// =============================================================================
// ASSERTIONS
// =============================================================================

/// One serialized assertion: `{"method": "haveCSS", "params": ["color", "red"]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionCall {
    /// `exist`, `visible`, `enabled`, `disabled`, `isValue`, `isEmpty`,
    /// `isContains`, `haveClass` or `haveCSS`
    pub method: String,
    /// Positional parameters
    #[serde(default)]
    pub params: Vec<Value>,
}

impl AssertionCall {
    /// Call with no parameters
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Validate into a [`Check`]
    pub fn parse(&self) -> PomResult<Check> {
        let text = |i: usize| {
            self.params
                .get(i)
                .and_then(scalar_text)
                .ok_or_else(|| missing(&self.method))
        };
        match self.method.as_str() {
            "exist" => Ok(Check::Exist),
            "visible" => Ok(Check::Visible),
            "enabled" => Ok(Check::Enabled),
            "disabled" => Ok(Check::Disabled),
            "isValue" => text(0).map(Check::IsValue),
            "isEmpty" => Ok(Check::IsEmpty),
            "isContains" => {
                let values = string_list(&self.params);
                if values.is_empty() {
                    Err(missing(&self.method))
                } else {
                    Ok(Check::IsContains(values))
                }
            }
            "haveClass" => text(0).map(Check::HaveClass),
            "haveCSS" => Ok(Check::HaveCss {
                property: text(0)?,
                value: text(1)?,
            }),
            other => Err(PomError::UnsupportedAssertion {
                method: other.to_string(),
            }),
        }
    }
}

/// A validated assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// At least one match
    Exist,
    /// Some match visible
    Visible,
    /// All matches enabled
    Enabled,
    /// All matches disabled
    Disabled,
    /// Component-specific value check
    IsValue(String),
    /// Value check against the empty string
    IsEmpty,
    /// Text contains every value
    IsContains(Vec<String>),
    /// Class present
    HaveClass(String),
    /// CSS property equals
    HaveCss {
        /// CSS property
        property: String,
        /// Expected value
        value: String,
    },
}

fn missing(method: &str) -> PomError {
    PomError::MissingActionParameter {
        action: method.to_string(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strings and scalars, with arrays flattened one level
fn string_list(params: &[Value]) -> Vec<String> {
    params
        .iter()
        .flat_map(|param| match param {
            Value::Array(items) => items.iter().filter_map(scalar_text).collect::<Vec<_>>(),
            other => scalar_text(other).into_iter().collect::<Vec<_>>(),
        })
        .collect()
}

// =============================================================================
// ACTIONABLE
// =============================================================================

/// User actions and value checks a component can specialize.
///
/// Everything else a component does is inherent on [`Component`]; the methods
/// here are the ones a [`Field`](super::Field) answers differently, so they
/// dispatch through this trait wherever a component is held as a [`Child`].
#[async_trait]
pub trait Actionable: Send + Sync {
    /// The base component
    fn component(&self) -> &Component;

    /// Forced click, then the on-event response when one is declared
    async fn click(&self, session: &Session) -> PomResult<()> {
        let component = self.component();
        session
            .driver()
            .click(component.element_locator()?, session.action_options())
            .await?;
        component.wait_for_event_response(session).await?;
        Ok(())
    }

    /// Type into the element
    async fn type_text(&self, session: &Session, text: &str) -> PomResult<()> {
        let locator = self.component().element_locator()?;
        session
            .driver()
            .type_text(locator, text, session.action_options())
            .await
    }

    /// Choose each option in turn
    async fn select(&self, session: &Session, options: &[String]) -> PomResult<()> {
        let locator = self.component().element_locator()?;
        for option in options {
            session
                .driver()
                .select_option(locator, option, session.action_options())
                .await?;
        }
        Ok(())
    }

    /// Value check; the base compares text content
    async fn is_value(&self, session: &Session, value: &str) -> PomResult<AssertionOutcome> {
        self.component().contains(session, &[value]).await
    }

    /// Value check against the empty string
    async fn empty(&self, session: &Session) -> PomResult<AssertionOutcome> {
        self.is_value(session, "").await
    }

    /// Run `calls` in order after validating all of them
    async fn perform_multiple_actions(
        &self,
        session: &Session,
        calls: &[ActionCall],
    ) -> PomResult<()> {
        let actions = calls
            .iter()
            .map(ActionCall::parse)
            .collect::<PomResult<Vec<_>>>()?;
        for action in actions {
            match action {
                Action::Click => self.click(session).await?,
                Action::Type(text) => self.type_text(session, &text).await?,
                Action::Select(options) => self.select(session, &options).await?,
            }
        }
        Ok(())
    }

    /// Run `calls` in order after validating all of them
    async fn assert_multiple(
        &self,
        session: &Session,
        calls: &[AssertionCall],
    ) -> PomResult<Vec<AssertionOutcome>> {
        let checks = calls
            .iter()
            .map(AssertionCall::parse)
            .collect::<PomResult<Vec<_>>>()?;
        let component = self.component();
        let mut outcomes = Vec::with_capacity(checks.len());
        for check in checks {
            let outcome = match check {
                Check::Exist => component.exist(session).await?,
                Check::Visible => component.visible(session).await?,
                Check::Enabled => component.enabled(session).await?,
                Check::Disabled => component.disabled(session).await?,
                Check::IsValue(value) => self.is_value(session, &value).await?,
                Check::IsEmpty => self.empty(session).await?,
                Check::IsContains(values) => component.contains(session, &values).await?,
                Check::HaveClass(class) => component.have_class(session, &class).await?,
                Check::HaveCss { property, value } => {
                    component.have_css(session, &property, &value).await?
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Type `count` random words and return them
    async fn type_random_words(&self, session: &Session, count: usize) -> PomResult<String> {
        let words = session.random_words(count);
        self.type_text(session, &words).await?;
        Ok(words)
    }
}

impl Actionable for Component {
    fn component(&self) -> &Component {
        self
    }
}

#[async_trait]
impl Actionable for Child {
    fn component(&self) -> &Component {
        self.base()
    }

    async fn click(&self, session: &Session) -> PomResult<()> {
        self.as_actionable().click(session).await
    }

    async fn type_text(&self, session: &Session, text: &str) -> PomResult<()> {
        self.as_actionable().type_text(session, text).await
    }

    async fn select(&self, session: &Session, options: &[String]) -> PomResult<()> {
        self.as_actionable().select(session, options).await
    }

    async fn is_value(&self, session: &Session, value: &str) -> PomResult<AssertionOutcome> {
        self.as_actionable().is_value(session, value).await
    }
}
