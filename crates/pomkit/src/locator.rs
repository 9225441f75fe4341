//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a deferred reference to zero-or-more UI elements. It is a
//! plain value describing *how* to find elements; every driver call resolves it
//! again, so element handles are never cached between actions (visibility and
//! existence change as the page reacts).
//!
//! Locators render to a canonical chain string, e.g.
//! `form#login >> input >> nth=0`, which drivers use as the query key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t:?}"),
            Self::TestId(id) => write!(f, "[data-testid={id:?}]"),
        }
    }
}

/// One refinement applied on top of a root selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStep {
    /// Descendants matching a selector
    Find(Selector),
    /// The n-th match (0-based)
    Nth(usize),
    /// Parent of each match
    Parent,
    /// Matches whose text contains the given string
    Containing(String),
}

impl fmt::Display for LocatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find(selector) => write!(f, "{selector}"),
            Self::Nth(index) => write!(f, "nth={index}"),
            Self::Parent => write!(f, ".."),
            Self::Containing(text) => write!(f, "has-text={text:?}"),
        }
    }
}

/// A deferred reference to zero-or-more elements.
///
/// Never holds element handles: resolution happens inside the driver on every
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    root: Selector,
    #[serde(default)]
    steps: Vec<LocatorStep>,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            root: selector,
            steps: Vec::new(),
        }
    }

    /// Locator for a `data-testid` attribute
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::test_id(id))
    }

    /// Descendants matching a CSS selector
    #[must_use]
    pub fn find(&self, css: impl Into<String>) -> Self {
        self.with_step(LocatorStep::Find(Selector::Css(css.into())))
    }

    /// Descendants matching any selector
    #[must_use]
    pub fn find_selector(&self, selector: Selector) -> Self {
        self.with_step(LocatorStep::Find(selector))
    }

    /// First match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// The n-th match (0-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_step(LocatorStep::Nth(index))
    }

    /// Parent of each match
    #[must_use]
    pub fn parent(&self) -> Self {
        self.with_step(LocatorStep::Parent)
    }

    /// Matches whose text content contains `text`
    #[must_use]
    pub fn containing(&self, text: impl Into<String>) -> Self {
        self.with_step(LocatorStep::Containing(text.into()))
    }

    /// Root selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.root
    }

    /// Refinement steps in application order
    #[must_use]
    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// Split off the last refinement, returning the locator it refines
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &LocatorStep)> {
        let (last, rest) = self.steps.split_last()?;
        Some((
            Self {
                root: self.root.clone(),
                steps: rest.to_vec(),
            },
            last,
        ))
    }

    fn with_step(&self, step: LocatorStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self {
            root: self.root.clone(),
            steps,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for step in &self.steps {
            write!(f, " >> {step}")?;
        }
        Ok(())
    }
}

impl From<&str> for Locator {
    fn from(css: &str) -> Self {
        Self::new(css)
    }
}

impl From<String> for Locator {
    fn from(css: String) -> Self {
        Self::new(css)
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_selector_display() {
            assert_eq!(Selector::css("button.primary").to_string(), "button.primary");
            assert_eq!(Selector::test_id("save").to_string(), "[data-testid=\"save\"]");
            assert_eq!(Selector::text("Save").to_string(), "text=\"Save\"");
            assert_eq!(Selector::xpath("//div").to_string(), "xpath=//div");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_chain_rendering() {
            let locator = Locator::new("form#login").find("input").first();
            assert_eq!(locator.to_string(), "form#login >> input >> nth=0");
        }

        #[test]
        fn test_parent_and_containing() {
            let locator = Locator::new(".menu")
                .find("input[type=\"checkbox\"]")
                .nth(2)
                .parent()
                .containing("Paris");
            assert_eq!(
                locator.to_string(),
                ".menu >> input[type=\"checkbox\"] >> nth=2 >> .. >> has-text=\"Paris\""
            );
        }

        #[test]
        fn test_split_last() {
            let locator = Locator::new("table").find("tbody > tr").nth(3);
            let (prefix, last) = locator.split_last().unwrap();
            assert_eq!(prefix.to_string(), "table >> tbody > tr");
            assert_eq!(last, &LocatorStep::Nth(3));
            assert!(Locator::new("table").split_last().is_none());
        }

        #[test]
        fn test_refinement_does_not_mutate_original() {
            let base = Locator::new("ul");
            let _ = base.find("li");
            assert!(base.steps().is_empty());
        }

        #[test]
        fn test_from_conversions() {
            let a: Locator = "div".into();
            let b: Locator = Selector::css("div").into();
            assert_eq!(a, b);
        }
    }
}
