//! Page roots: URL handling, navigation and load checks.

use super::{Component, ComponentKind};
use crate::assertion::{self, AssertionOutcome};
use crate::locator::Locator;
use crate::result::PomResult;
use crate::session::Session;

/// Root of a screen's component tree
///
/// An empty `base_url` falls back to the session's configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    base: Component,
    base_url: String,
}

super::specialization!(Page);

impl Page {
    /// Page without its own base URL
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: Component::new(ComponentKind::Page, name),
            base_url: String::new(),
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Own base URL, possibly empty
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the base URL
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into();
    }

    fn resolved_url<'a>(&'a self, session: &'a Session) -> &'a str {
        if self.base_url.is_empty() {
            &session.config().base_url
        } else {
            &self.base_url
        }
    }

    /// Clear local storage, then register every descendant's intercepts
    pub async fn init(&mut self, session: &Session) -> PomResult<()> {
        session.driver().clear_local_storage().await?;
        self.base.init(session).await
    }

    /// Visit the base URL, extended by `path`
    pub async fn navigate(&self, session: &Session, path: Option<&str>) -> PomResult<String> {
        let url = format!("{}{}", self.resolved_url(session), path.unwrap_or_default());
        tracing::info!(page = %self.name(), %url, "navigate");
        session.driver().visit(&url).await?;
        Ok(url)
    }

    /// Current URL includes the base URL, extended by `path`
    pub async fn is_page_opened(
        &self,
        session: &Session,
        path: Option<&str>,
    ) -> PomResult<AssertionOutcome> {
        let expected = format!("{}{}", self.resolved_url(session), path.unwrap_or_default());
        assertion::assert_url_includes(session, &expected).await
    }

    /// Await default-loaded data, then assert each selector is visible
    pub async fn loaded(&self, session: &Session, selectors: &[&str]) -> PomResult<()> {
        self.wait_for_elements_data(session).await?;
        for selector in selectors {
            assertion::assert_visible(session, &Locator::new(*selector)).await?;
        }
        Ok(())
    }

    /// Document title
    pub async fn title(&self, session: &Session) -> PomResult<String> {
        session.driver().title().await
    }
}
