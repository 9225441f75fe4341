//! Session and component configuration.
//!
//! [`SessionConfig`] carries run-wide timeouts and the RNG seed; it loads from
//! YAML and honours `POMKIT_*` environment overrides. The component builder
//! configs ([`ElementConfig`], [`FieldConfig`], ...) are plain serde structs so
//! a page layout can be declared in YAML or JSON as well as in code.
//!
//! ```yaml
//! base_url: http://localhost:4200
//! request_timeout_ms: 15000
//! seed: 42
//! ```

use crate::component::{ButtonEntry, EventRequest, FieldEntry, LoadRequest};
use crate::result::{PomError, PomResult};
use crate::wait::{
    WaitOptions, DEFAULT_ASSERTION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`SessionConfig::base_url`]
pub const ENV_BASE_URL: &str = "POMKIT_BASE_URL";
/// Environment variable overriding [`SessionConfig::request_timeout_ms`]
pub const ENV_REQUEST_TIMEOUT_MS: &str = "POMKIT_REQUEST_TIMEOUT_MS";
/// Environment variable overriding [`SessionConfig::seed`]
pub const ENV_SEED: &str = "POMKIT_SEED";

// =============================================================================
// SESSION CONFIG
// =============================================================================

/// Run-wide settings shared by every component operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Application base URL
    pub base_url: String,
    /// Timeout for network alias waits
    pub request_timeout_ms: u64,
    /// Timeout for retried assertions
    pub assertion_timeout_ms: u64,
    /// Assertion polling interval
    pub poll_interval_ms: u64,
    /// Skip actionability checks on clicks and typing
    pub force_actions: bool,
    /// RNG seed for randomized fills; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            assertion_timeout_ms: DEFAULT_ASSERTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            force_actions: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML document
    pub fn from_yaml(yaml: &str) -> PomResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PomResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Apply `POMKIT_*` overrides from the process environment
    pub fn with_env_overrides(self) -> PomResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> PomResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = parse_u64(ENV_REQUEST_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            self.seed = Some(parse_u64(ENV_SEED, &raw)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject zero timeouts and poll intervals
    pub fn validate(&self) -> PomResult<()> {
        let checks = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("assertion_timeout_ms", self.assertion_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(PomError::InvalidConfig {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout in milliseconds
    #[must_use]
    pub const fn with_request_timeout(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Set assertion timeout in milliseconds
    #[must_use]
    pub const fn with_assertion_timeout(mut self, ms: u64) -> Self {
        self.assertion_timeout_ms = ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set whether element actions skip actionability checks
    #[must_use]
    pub const fn with_force_actions(mut self, force: bool) -> Self {
        self.force_actions = force;
        self
    }

    /// Set RNG seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Request timeout as Duration
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Polling options for assertions
    #[must_use]
    pub const fn assertion_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.assertion_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

fn parse_u64(name: &str, raw: &str) -> PomResult<u64> {
    raw.trim().parse().map_err(|_| PomError::InvalidConfig {
        message: format!("{name} must be an unsigned integer, got '{raw}'"),
    })
}

// =============================================================================
// COMPONENT CONFIGS
// =============================================================================

/// Declared network requests of one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// URL whose response populates the component
    pub on_load_url: Option<String>,
    /// Method of the on-load request (GET when absent)
    pub on_load_method: Option<String>,
    /// Whether the on-load request fires by itself when the page opens
    pub default_loaded: Option<bool>,
    /// URL called when the user acts on the component
    pub on_event_url: Option<String>,
    /// Method of the on-event request (POST when absent)
    pub on_event_method: Option<String>,
}

impl RequestConfig {
    /// On-load request only
    #[must_use]
    pub fn on_load(url: impl Into<String>) -> Self {
        Self {
            on_load_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// On-event request only
    #[must_use]
    pub fn on_event(url: impl Into<String>) -> Self {
        Self {
            on_event_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the on-load method
    #[must_use]
    pub fn with_load_method(mut self, method: impl Into<String>) -> Self {
        self.on_load_method = Some(method.into());
        self
    }

    /// Mark the on-load request as fired on page open
    #[must_use]
    pub const fn loaded_by_default(mut self) -> Self {
        self.default_loaded = Some(true);
        self
    }

    /// Set the on-event URL
    #[must_use]
    pub fn with_event(mut self, url: impl Into<String>) -> Self {
        self.on_event_url = Some(url.into());
        self
    }

    /// Set the on-event method
    #[must_use]
    pub fn with_event_method(mut self, method: impl Into<String>) -> Self {
        self.on_event_method = Some(method.into());
        self
    }

    /// Build the on-load descriptor, if a non-empty URL is declared
    #[must_use]
    pub fn load_request(&self) -> Option<LoadRequest> {
        let url = self.on_load_url.as_deref().filter(|u| !u.is_empty())?;
        let mut request = LoadRequest::new(url);
        if let Some(method) = &self.on_load_method {
            request = request.with_method(method);
        }
        if let Some(default_loaded) = self.default_loaded {
            request = request.with_default_loaded(default_loaded);
        }
        Some(request)
    }

    /// Build the on-event descriptor, if a non-empty URL is declared
    #[must_use]
    pub fn event_request(&self) -> Option<EventRequest> {
        let url = self.on_event_url.as_deref().filter(|u| !u.is_empty())?;
        let mut request = EventRequest::new(url);
        if let Some(method) = &self.on_event_method {
            request = request.with_method(method);
        }
        Some(request)
    }
}

/// Generic element declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// CSS selector
    pub selector: String,
    /// Declared requests
    #[serde(default, flatten)]
    pub request: RequestConfig,
}

impl ElementConfig {
    /// Element with no declared requests
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            request: RequestConfig::default(),
        }
    }

    /// Attach request declarations
    #[must_use]
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

/// Field declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// CSS selector
    pub selector: String,
    /// Entry kinds of the field
    pub entries: Vec<FieldEntry>,
    /// Placeholder text
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Whether the field may be left empty
    #[serde(default)]
    pub optional: bool,
    /// Selector of the autocomplete dropdown, creating a `<name>_menu` child
    #[serde(default)]
    pub menu: Option<String>,
    /// Declared requests, shared with the autocomplete menu
    #[serde(default, flatten)]
    pub request: RequestConfig,
}

impl FieldConfig {
    /// Field with the given entry kinds
    #[must_use]
    pub fn new(selector: impl Into<String>, entries: impl Into<Vec<FieldEntry>>) -> Self {
        Self {
            selector: selector.into(),
            entries: entries.into(),
            ..Self::default()
        }
    }

    /// Attach an autocomplete menu
    #[must_use]
    pub fn with_menu(mut self, selector: impl Into<String>) -> Self {
        self.menu = Some(selector.into());
        self
    }

    /// Set placeholder
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Mark as optional
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach request declarations
    #[must_use]
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

/// Button declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// CSS selector
    pub selector: String,
    /// Button role
    #[serde(default)]
    pub entry: ButtonEntry,
    /// Display text
    #[serde(default)]
    pub text: Option<String>,
    /// Declared requests
    #[serde(default, flatten)]
    pub request: RequestConfig,
}

impl ButtonConfig {
    /// Plain button
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Submit button
    #[must_use]
    pub fn submit(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            entry: ButtonEntry::Submit,
            ..Self::default()
        }
    }

    /// Set display text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach request declarations
    #[must_use]
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

/// Menu, or menu item, declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    /// CSS selector
    pub selector: String,
    /// Selector of a nested menu, creating a `<name>_menu` child
    #[serde(default)]
    pub submenu: Option<String>,
    /// Declared requests
    #[serde(default, flatten)]
    pub request: RequestConfig,
}

impl MenuConfig {
    /// Menu with no declared requests
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Attach a nested menu
    #[must_use]
    pub fn with_submenu(mut self, selector: impl Into<String>) -> Self {
        self.submenu = Some(selector.into());
        self
    }

    /// Attach request declarations
    #[must_use]
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

/// Datatable column declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// CSS selector of the column cells
    pub selector: String,
    /// Selector of the filter input
    #[serde(default)]
    pub filter: Option<String>,
    /// Selector of the sort toggle
    #[serde(default)]
    pub sort_button: Option<String>,
}

impl ColumnConfig {
    /// Column with neither filter nor sort toggle
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Attach a filter input
    #[must_use]
    pub fn with_filter(mut self, selector: impl Into<String>) -> Self {
        self.filter = Some(selector.into());
        self
    }

    /// Attach a sort toggle
    #[must_use]
    pub fn with_sort_button(mut self, selector: impl Into<String>) -> Self {
        self.sort_button = Some(selector.into());
        self
    }
}
