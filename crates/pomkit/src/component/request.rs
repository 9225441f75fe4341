//! Declared network requests and alias bookkeeping.
//!
//! `init` walks every descendant once, validates all declared methods, and
//! only then registers aliases: a load request under the child's name, an
//! event request under `<name>_OnEvent`. The root's own requests are
//! registered by whichever component owns the root.

use super::{Child, Component, ComponentKind};
use crate::network::{HttpMethod, InterceptedExchange};
use crate::result::{PomError, PomResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Alias of a component's on-load request
#[must_use]
pub fn load_alias(name: &str) -> String {
    name.to_string()
}

/// Alias of a component's on-event request
#[must_use]
pub fn event_alias(name: &str) -> String {
    format!("{name}_OnEvent")
}

/// Request whose response populates a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// URL or glob
    pub url: String,
    /// Upper-case HTTP method, validated at interception time
    pub method: String,
    /// Whether the request fires by itself when the page opens
    pub default_loaded: bool,
}

impl LoadRequest {
    /// GET request, not loaded by default
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get.as_str().to_string(),
            default_loaded: false,
        }
    }

    /// Set method
    #[must_use]
    pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
        self.method = method.as_ref().trim().to_ascii_uppercase();
        self
    }

    /// Set whether the request fires on page open
    #[must_use]
    pub const fn with_default_loaded(mut self, default_loaded: bool) -> Self {
        self.default_loaded = default_loaded;
        self
    }

    /// Method, if it is GET or POST
    pub fn http_method(&self, component: &str) -> PomResult<HttpMethod> {
        HttpMethod::parse(&self.method)
            .filter(|m| m.allowed_for_load())
            .ok_or_else(|| PomError::UnsupportedHttpMethod {
                method: self.method.clone(),
                component: component.to_string(),
            })
    }
}

/// Request fired by a user action on a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    /// URL or glob
    pub url: String,
    /// Upper-case HTTP method, validated at interception time
    pub method: String,
}

impl EventRequest {
    /// POST request
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post.as_str().to_string(),
        }
    }

    /// Set method
    #[must_use]
    pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
        self.method = method.as_ref().trim().to_ascii_uppercase();
        self
    }

    /// Method, if it is GET, POST, PUT or DELETE
    pub fn http_method(&self, component: &str) -> PomResult<HttpMethod> {
        HttpMethod::parse(&self.method)
            .filter(|m| m.allowed_for_event())
            .ok_or_else(|| PomError::UnsupportedHttpMethod {
                method: self.method.clone(),
                component: component.to_string(),
            })
    }
}

/// One alias registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercept {
    /// Method
    pub method: HttpMethod,
    /// URL or glob
    pub url: String,
    /// Alias name
    pub alias: String,
}

impl Component {
    /// Reset per-run state of every descendant, then register intercepts
    pub async fn init(&mut self, session: &Session) -> PomResult<()> {
        self.reset_state();
        let registered = self.intercept_component_requests(session).await?;
        tracing::debug!(component = %self.name(), registered, "component initialized");
        Ok(())
    }

    pub(crate) fn reset_state(&mut self) {
        for child in self.children_mut().values_mut() {
            if let Child::Datatable(table) = child {
                table.set_current_page(1);
            }
            child.base_mut().reset_state();
        }
    }

    /// Every alias the descendants declare, validating all methods first
    pub fn declared_intercepts(&self) -> PomResult<Vec<Intercept>> {
        let mut intercepts = Vec::new();
        self.collect_intercepts(&mut intercepts)?;
        Ok(intercepts)
    }

    fn collect_intercepts(&self, out: &mut Vec<Intercept>) -> PomResult<()> {
        for child in self.children().values() {
            let component = child.base();
            if let Some(load) = component.on_load_request() {
                out.push(Intercept {
                    method: load.http_method(component.name())?,
                    url: load.url.clone(),
                    alias: load_alias(component.name()),
                });
            }
            if let Some(event) = component.on_event_request() {
                out.push(Intercept {
                    method: event.http_method(component.name())?,
                    url: event.url.clone(),
                    alias: event_alias(component.name()),
                });
            }
            component.collect_intercepts(out)?;
        }
        Ok(())
    }

    /// Register every descendant alias; nothing is registered if any declared
    /// method is unsupported
    pub async fn intercept_component_requests(&self, session: &Session) -> PomResult<usize> {
        let intercepts = self.declared_intercepts()?;
        for intercept in &intercepts {
            session
                .intercept(intercept.method, &intercept.url, &intercept.alias)
                .await?;
        }
        Ok(intercepts.len())
    }

    /// Await this component's load alias, if a load request is declared
    pub async fn wait_for_load_response(
        &self,
        session: &Session,
        timeout: Option<Duration>,
    ) -> PomResult<Option<InterceptedExchange>> {
        if self.on_load_request().is_none() {
            return Ok(None);
        }
        session
            .wait_for_alias(&load_alias(self.name()), timeout)
            .await
            .map(Some)
    }

    /// Await this component's event alias, if an event request is declared
    pub async fn wait_for_event_response(
        &self,
        session: &Session,
    ) -> PomResult<Option<InterceptedExchange>> {
        if self.on_event_request().is_none() {
            return Ok(None);
        }
        session
            .wait_for_alias(&event_alias(self.name()), None)
            .await
            .map(Some)
    }

    /// Await the load alias unless the data arrives with the page
    pub(crate) async fn wait_for_pending_load(&self, session: &Session) -> PomResult<()> {
        if self.on_load_request().is_some_and(|r| !r.default_loaded) {
            self.wait_for_load_response(session, None).await?;
        }
        Ok(())
    }

    /// Aliases of default-loaded Field and Datatable descendants
    #[must_use]
    pub fn default_loaded_aliases(&self) -> Vec<String> {
        let mut aliases = Vec::new();
        self.collect_default_loaded(&mut aliases);
        aliases
    }

    fn collect_default_loaded(&self, out: &mut Vec<String>) {
        for child in self.children().values() {
            let component = child.base();
            let data_kind = matches!(
                component.kind(),
                ComponentKind::Field | ComponentKind::Datatable
            );
            if data_kind && component.on_load_request().is_some_and(|r| r.default_loaded) {
                out.push(load_alias(component.name()));
            } else {
                component.collect_default_loaded(out);
            }
        }
    }

    /// Await the data every default-loaded Field and Datatable descendant
    /// receives on page open
    pub async fn wait_for_elements_data(&self, session: &Session) -> PomResult<()> {
        for alias in self.default_loaded_aliases() {
            session.wait_for_alias(&alias, None).await?;
        }
        Ok(())
    }
}
