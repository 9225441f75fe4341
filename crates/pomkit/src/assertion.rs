//! Assertions for page-object validation.
//!
//! Element assertions re-query the driver every poll interval until they pass
//! or the session's assertion timeout elapses. Every helper logs
//! `"<message>: Passed|Failed"` and, on failure, returns
//! [`PomError::AssertionFailed`] carrying the active override installed by
//! [`Session::with_failure_message`] or the helper's default message.

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::logging;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use crate::wait::{poll_until, WaitResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// RESULTS
// =============================================================================

/// Result of a single synchronous check
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Log under `label` and convert to an outcome or an assertion error
    pub fn conclude(self, session: Option<&Session>, label: &str) -> PomResult<AssertionOutcome> {
        logging::log_assertion(label, self.passed);
        if self.passed {
            Ok(AssertionOutcome {
                message: label.to_string(),
                elapsed: Duration::ZERO,
                attempts: 1,
            })
        } else {
            let message = match session {
                Some(session) => session.failure(self.message),
                None => self.message,
            };
            Err(PomError::AssertionFailed { message })
        }
    }
}

/// A passed assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionOutcome {
    /// Logged assertion message
    pub message: String,
    /// Time until the assertion held
    pub elapsed: Duration,
    /// Number of evaluations
    pub attempts: u32,
}

/// Element state matchers for [`assert_should`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Form value of the first match equals
    HaveValue(String),
    /// Some match carries the class
    HaveClass(String),
    /// Computed CSS property of the first match equals
    HaveCss {
        /// CSS property
        property: String,
        /// Expected value
        value: String,
    },
    /// Attribute of the first match equals
    HaveAttr {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Some match's text contains
    Contain(String),
}

impl Matcher {
    /// Chainer name, e.g. `have.css`
    #[must_use]
    pub const fn chainer(&self) -> &'static str {
        match self {
            Self::HaveValue(_) => "have.value",
            Self::HaveClass(_) => "have.class",
            Self::HaveCss { .. } => "have.css",
            Self::HaveAttr { .. } => "have.attr",
            Self::Contain(_) => "contain",
        }
    }

    fn property(&self) -> &str {
        match self {
            Self::HaveCss { property, .. } => property,
            Self::HaveAttr { name, .. } => name,
            _ => "",
        }
    }

    fn expected(&self) -> &str {
        match self {
            Self::HaveValue(v) | Self::HaveClass(v) | Self::Contain(v) => v,
            Self::HaveCss { value, .. } | Self::HaveAttr { value, .. } => value,
        }
    }

    /// Whether the matched elements satisfy this matcher
    #[must_use]
    pub fn matches(&self, elements: &[ElementHandle]) -> bool {
        let first = elements.first();
        match self {
            Self::HaveValue(v) => first.is_some_and(|e| e.value.as_deref().unwrap_or("") == v),
            Self::HaveClass(c) => elements.iter().any(|e| e.has_class(c)),
            Self::HaveCss { property, value } => {
                first.is_some_and(|e| e.css.get(property).is_some_and(|v| v == value))
            }
            Self::HaveAttr { name, value } => first.is_some_and(|e| e.attr(name) == Some(value)),
            Self::Contain(text) => elements.iter().any(|e| e.text().contains(text.as_str())),
        }
    }
}

// =============================================================================
// POLLING CORE
// =============================================================================

async fn poll_elements<F>(session: &Session, locator: &Locator, check: F) -> PomResult<WaitResult>
where
    F: Fn(&[ElementHandle]) -> bool,
{
    let driver = session.driver();
    let check = &check;
    poll_until(&session.assertion_wait(), || async move {
        driver
            .query_all(locator)
            .await
            .map(|elements| check(&elements))
    })
    .await
}

fn conclude(
    session: &Session,
    label: String,
    wait: &WaitResult,
    default_failure: impl FnOnce() -> String,
) -> PomResult<AssertionOutcome> {
    logging::log_assertion(&label, wait.success);
    if wait.success {
        Ok(AssertionOutcome {
            message: label,
            elapsed: wait.elapsed,
            attempts: wait.attempts,
        })
    } else {
        Err(PomError::AssertionFailed {
            message: session.failure(default_failure()),
        })
    }
}

// =============================================================================
// URL AND STATUS
// =============================================================================

/// Current URL includes `partial`
pub async fn assert_url_includes(session: &Session, partial: &str) -> PomResult<AssertionOutcome> {
    let driver = session.driver();
    let wait = poll_until(&session.assertion_wait(), || async move {
        driver.current_url().await.map(|url| url.contains(partial))
    })
    .await?;
    let current = driver.current_url().await?;
    conclude(session, format!("Assert URL Includes \"{partial}\""), &wait, || {
        format!("expected URL '{current}' to include '{partial}'")
    })
}

/// Current URL does not include `partial`
pub async fn assert_url_not_includes(
    session: &Session,
    partial: &str,
) -> PomResult<AssertionOutcome> {
    let driver = session.driver();
    let wait = poll_until(&session.assertion_wait(), || async move {
        driver.current_url().await.map(|url| !url.contains(partial))
    })
    .await?;
    let current = driver.current_url().await?;
    conclude(
        session,
        format!("Assert URL Not Includes \"{partial}\""),
        &wait,
        || format!("expected URL '{current}' not to include '{partial}'"),
    )
}

/// `min <= status <= max`
pub fn assert_status_in_range(status: u16, min: u16, max: u16) -> PomResult<AssertionOutcome> {
    let result = if (min..=max).contains(&status) {
        AssertionResult::pass()
    } else {
        AssertionResult::fail(format!(
            "Expected status code to be in range {min}-{max}, but received {status}"
        ))
    };
    result.conclude(None, &format!("Assert Status In Range {min}-{max}"))
}

/// `status < min || status > max`
pub fn assert_status_not_in_range(status: u16, min: u16, max: u16) -> PomResult<AssertionOutcome> {
    let result = if (min..=max).contains(&status) {
        AssertionResult::fail(format!(
            "Expected status code to not be in range {min}-{max}, but received {status}"
        ))
    } else {
        AssertionResult::pass()
    };
    result.conclude(None, &format!("Assert Status Not In Range {min}-{max}"))
}

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// At least one match, or exactly `expected_len` matches
pub async fn assert_exist(
    session: &Session,
    locator: &Locator,
    expected_len: Option<usize>,
) -> PomResult<AssertionOutcome> {
    match expected_len {
        Some(n) => {
            let wait = poll_elements(session, locator, |els| els.len() == n).await?;
            conclude(session, format!("Assert Elements Length to be {n}"), &wait, || {
                format!("expected {n} elements matching '{locator}'")
            })
        }
        None => {
            let wait = poll_elements(session, locator, |els| !els.is_empty()).await?;
            conclude(session, "Assert Element Existence".into(), &wait, || {
                format!("expected '{locator}' to exist")
            })
        }
    }
}

/// Some match is visible
pub async fn assert_visible(session: &Session, locator: &Locator) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| els.iter().any(|e| e.visible)).await?;
    conclude(session, "Assert Element Visible".into(), &wait, || {
        format!("expected '{locator}' to be visible")
    })
}

/// Matches exist and none is visible
pub async fn assert_not_visible(
    session: &Session,
    locator: &Locator,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        !els.is_empty() && els.iter().all(|e| !e.visible)
    })
    .await?;
    conclude(session, "Assert Element Not Visible".into(), &wait, || {
        format!("expected '{locator}' not to be visible")
    })
}

/// Matches satisfy `matcher`
pub async fn assert_should(
    session: &Session,
    locator: &Locator,
    matcher: &Matcher,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| matcher.matches(els)).await?;
    let label = format!(
        "Assert Element \"{}\" \"{}\" \"{}\"",
        matcher.chainer(),
        matcher.property(),
        matcher.expected()
    );
    conclude(session, label, &wait, || {
        format!(
            "expected '{locator}' to {} '{}'",
            matcher.chainer().replace('.', " "),
            matcher.expected()
        )
    })
}

/// Matches exist and contain each of `values`
pub async fn assert_contains<V>(
    session: &Session,
    locator: &Locator,
    values: &[V],
) -> PomResult<AssertionOutcome>
where
    V: AsRef<str> + Sync,
{
    let mut last = AssertionOutcome {
        message: "Assert Element Contains".into(),
        elapsed: Duration::ZERO,
        attempts: 0,
    };
    for text in values.iter().map(AsRef::as_ref) {
        let wait = poll_elements(session, locator, |els| {
            els.iter().any(|e| e.text().contains(text))
        })
        .await?;
        last = conclude(
            session,
            format!("Assert Element Contains \"{text}\""),
            &wait,
            || format!("Failed to find {text}."),
        )?;
    }
    Ok(last)
}

/// No match contains `text`
pub async fn assert_not_contains(
    session: &Session,
    locator: &Locator,
    text: &str,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        !els.iter().any(|e| e.text().contains(text))
    })
    .await?;
    conclude(
        session,
        format!("Assert Element Not Contains \"{text}\""),
        &wait,
        || format!("expected '{locator}' not to contain '{text}'"),
    )
}

/// Matches exist and all are enabled
pub async fn assert_enabled(session: &Session, locator: &Locator) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        !els.is_empty() && els.iter().all(|e| e.enabled)
    })
    .await?;
    conclude(session, "Assert Element Enabled".into(), &wait, || {
        format!("expected '{locator}' to be enabled")
    })
}

/// Matches exist and all are disabled
pub async fn assert_disabled(session: &Session, locator: &Locator) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        !els.is_empty() && els.iter().all(|e| !e.enabled)
    })
    .await?;
    conclude(session, "Assert Element Disabled".into(), &wait, || {
        format!("expected '{locator}' to be disabled")
    })
}

/// Exists, is visible and enabled
pub async fn assert_button_enabled(
    session: &Session,
    locator: &Locator,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        !els.is_empty() && els.iter().any(|e| e.visible) && els.iter().all(|e| e.enabled)
    })
    .await?;
    conclude(session, "Assert Button Enabled".into(), &wait, || {
        format!("expected button '{locator}' to be visible and enabled")
    })
}

/// Exists and is visible when `condition`, absent otherwise
pub async fn exist_with_condition(
    session: &Session,
    locator: &Locator,
    condition: bool,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        if condition {
            els.iter().any(|e| e.visible)
        } else {
            els.is_empty()
        }
    })
    .await?;
    conclude(session, "Assert Element With Condition".into(), &wait, || {
        if condition {
            format!("expected '{locator}' to exist and be visible")
        } else {
            format!("expected '{locator}' not to exist")
        }
    })
}

/// Resolves to a visible, enabled `<select>` (not a text input)
pub async fn wait_until_select(session: &Session, locator: &Locator) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        els.first().is_some_and(|e| {
            e.attr("type") != Some("text")
                && e.tag_name.eq_ignore_ascii_case("select")
                && e.visible
                && e.enabled
        })
    })
    .await?;
    conclude(session, "Wait Until Select".into(), &wait, || {
        format!("expected '{locator}' to become an enabled select")
    })
}

/// Some match has `property` equal to `value`
pub async fn assert_at_least_one_with_css(
    session: &Session,
    locator: &Locator,
    property: &str,
    value: &str,
) -> PomResult<AssertionOutcome> {
    let wait = poll_elements(session, locator, |els| {
        els.iter()
            .any(|e| e.css.get(property).is_some_and(|v| v == value))
    })
    .await?;
    conclude(
        session,
        format!("Assert At Least One Element With \"{property}\" \"{value}\""),
        &wait,
        || format!("At least one element with the expected {property} \"{value}\" was found"),
    )
}

// =============================================================================
// SUBMIT EXPECTATIONS
// =============================================================================

/// Post-submit expectation on the URL and response status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitExpectation {
    path: String,
    status: u16,
    included: bool,
}

/// Expect a submission that left (or kept) `path` in the URL with `status`
#[must_use]
pub fn expect_submit(path: impl Into<String>, status: u16, included: bool) -> SubmitExpectation {
    SubmitExpectation {
        path: path.into(),
        status,
        included,
    }
}

impl SubmitExpectation {
    /// URL matches the inclusion expectation and status is 2xx
    pub async fn to_be_successful(&self, session: &Session) -> PomResult<AssertionOutcome> {
        if self.included {
            assert_url_includes(session, &self.path).await?;
        } else {
            assert_url_not_includes(session, &self.path).await?;
        }
        assert_status_in_range(self.status, 200, 299)
    }

    /// URL contradicts the inclusion expectation and status is not 2xx
    pub async fn to_be_unsuccessful(&self, session: &Session) -> PomResult<AssertionOutcome> {
        if self.included {
            assert_url_not_includes(session, &self.path).await?;
        } else {
            assert_url_includes(session, &self.path).await?;
        }
        assert_status_not_in_range(self.status, 200, 299)
    }
}
