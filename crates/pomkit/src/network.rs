//! Network request interception bookkeeping.
//!
//! Components declare the requests that feed them (on-load) and the requests
//! their actions trigger (on-event). Each declaration becomes an *alias* in an
//! [`InterceptRegistry`]; captured traffic is queued per alias and consumed by
//! waits, one completion per wait.

use crate::result::{PomError, PomResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

/// HTTP methods a component request may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Methods an on-load (data source) request may use
    pub const LOAD_METHODS: [Self; 2] = [Self::Get, Self::Post];

    /// Methods an on-event request may use
    pub const EVENT_METHODS: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Parse from string, case-insensitive. Anything outside the event set is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Convert to string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether an on-load request may use this method
    #[must_use]
    pub fn allowed_for_load(self) -> bool {
        Self::LOAD_METHODS.contains(&self)
    }

    /// Whether an on-event request may use this method
    #[must_use]
    pub fn allowed_for_event(self) -> bool {
        Self::EVENT_METHODS.contains(&self)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = PomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PomError::InvalidConfig {
            message: format!("unknown HTTP method '{s}'"),
        })
    }
}

/// Scheme and host in front of a path-relative glob
const ORIGIN: &str = r"(?:[A-Za-z][A-Za-z0-9+.\-]*://[^/]*)?";

/// Optional query string after the matched path
const QUERY: &str = r"(?:\?.*)?";

/// How a declared component URL matches request URLs
///
/// A URL without `*` matches any request URL containing it. A URL with `*`
/// is a glob over the whole request URL: `**` spans any characters, `*`
/// stays within one path segment. Globs starting with `/` match on any
/// origin, and a trailing query string is always allowed.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Substring match
    Contains(String),
    /// Glob, compiled once
    Glob {
        /// Declared glob
        glob: String,
        /// Anchored translation of the glob
        regex: Regex,
    },
}

impl UrlPattern {
    /// Pattern for a declared component URL
    pub fn for_intercept(url: &str) -> PomResult<Self> {
        if !url.contains('*') {
            return Ok(Self::Contains(url.to_string()));
        }
        let regex = Regex::new(&glob_to_regex(url)).map_err(|e| PomError::InvalidConfig {
            message: format!("invalid URL glob '{url}': {e}"),
        })?;
        Ok(Self::Glob {
            glob: url.to_string(),
            regex,
        })
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Glob { regex, .. } => regex.is_match(url),
        }
    }

    /// The declared URL
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Contains(url) | Self::Glob { glob: url, .. } => url,
        }
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Contains(_), Self::Contains(_)) | (Self::Glob { .. }, Self::Glob { .. })
        ) && self.as_str() == other.as_str()
    }
}

impl Eq for UrlPattern {}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(s) => write!(f, "~{s}"),
            Self::Glob { glob, .. } => f.write_str(glob),
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::from("^");
    if glob.starts_with('/') {
        pattern.push_str(ORIGIN);
    }
    let mut rest = glob;
    while let Some(star) = rest.find('*') {
        pattern.push_str(&regex::escape(&rest[..star]));
        rest = &rest[star..];
        if let Some(tail) = rest.strip_prefix("**") {
            pattern.push_str(".*");
            rest = tail;
        } else {
            pattern.push_str("[^/]*");
            rest = &rest[1..];
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push_str(QUERY);
    pattern.push('$');
    pattern
}

/// A completed request seen by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Response status
    pub status: u16,
    /// Milliseconds since the registry was created
    pub timestamp_ms: u64,
}

/// One completed request delivered to a wait on an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedExchange {
    /// Unique exchange id
    pub id: Uuid,
    /// Alias the wait was issued on
    pub alias: String,
    /// Captured request
    pub request: CapturedRequest,
}

impl InterceptedExchange {
    /// Response status of the exchange
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.request.status
    }
}

/// An alias registration
#[derive(Debug, Clone)]
pub struct AliasRoute {
    /// Alias name (without `@`)
    pub alias: String,
    /// Method to match
    pub method: HttpMethod,
    /// Pattern derived from the declared URL
    pub pattern: UrlPattern,
    pending: VecDeque<CapturedRequest>,
}

impl AliasRoute {
    /// Create a new alias route
    pub fn new(method: HttpMethod, url: &str, alias: &str) -> PomResult<Self> {
        Ok(Self {
            alias: alias.to_string(),
            method,
            pattern: UrlPattern::for_intercept(url)?,
            pending: VecDeque::new(),
        })
    }

    /// Declared URL
    #[must_use]
    pub fn url(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check if this route matches a request
    #[must_use]
    pub fn matches(&self, url: &str, method: HttpMethod) -> bool {
        self.method == method && self.pattern.matches(url)
    }
}

/// Alias registry: intercepts and per-alias completion queues
#[derive(Debug)]
pub struct InterceptRegistry {
    routes: Vec<AliasRoute>,
    start_time: Instant,
}

impl Default for InterceptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Register an alias. Re-registering an alias replaces the previous route.
    ///
    /// Returns `true` when an existing alias was replaced.
    pub fn register(&mut self, method: HttpMethod, url: &str, alias: &str) -> PomResult<bool> {
        let route = AliasRoute::new(method, url, alias)?;
        if let Some(existing) = self.routes.iter_mut().find(|r| r.alias == alias) {
            *existing = route;
            Ok(true)
        } else {
            self.routes.push(route);
            Ok(false)
        }
    }

    /// Record a completed request; returns the aliases it matched
    pub fn record(&mut self, url: &str, method: HttpMethod, status: u16) -> Vec<String> {
        let request = CapturedRequest {
            url: url.to_string(),
            method,
            status,
            timestamp_ms: u64::try_from(self.start_time.elapsed().as_millis())
                .unwrap_or(u64::MAX),
        };

        let mut matched = Vec::new();
        for route in &mut self.routes {
            if route.matches(url, method) {
                route.pending.push_back(request.clone());
                matched.push(route.alias.clone());
            }
        }
        matched
    }

    /// Consume one pending completion for `alias`
    pub fn take(&mut self, alias: &str) -> PomResult<Option<InterceptedExchange>> {
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.alias == alias)
            .ok_or_else(|| PomError::UnknownAlias {
                alias: alias.to_string(),
            })?;
        Ok(route.pending.pop_front().map(|request| InterceptedExchange {
            id: Uuid::new_v4(),
            alias: alias.to_string(),
            request,
        }))
    }

    /// Look up a route by alias
    #[must_use]
    pub fn route(&self, alias: &str) -> Option<&AliasRoute> {
        self.routes.iter().find(|r| r.alias == alias)
    }

    /// Registered aliases in registration order
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.alias.as_str()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod http_method_tests {
        use super::*;

        #[test]
        fn test_parse_case_insensitive() {
            assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
            assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
            assert_eq!(HttpMethod::parse("FETCH"), None);
            assert_eq!(HttpMethod::parse("PATCH"), None);
            assert!("FETCH".parse::<HttpMethod>().is_err());
        }

        #[test]
        fn test_allowed_sets() {
            assert!(HttpMethod::Get.allowed_for_load());
            assert!(HttpMethod::Post.allowed_for_load());
            assert!(!HttpMethod::Put.allowed_for_load());
            assert!(!HttpMethod::Delete.allowed_for_load());
            assert!(HttpMethod::Delete.allowed_for_event());
        }

        #[test]
        fn test_serde_uppercase() {
            let json = serde_json::to_string(&HttpMethod::Post).unwrap();
            assert_eq!(json, "\"POST\"");
            let back: HttpMethod = serde_json::from_str("\"PUT\"").unwrap();
            assert_eq!(back, HttpMethod::Put);
        }
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_for_intercept() {
            let plain = UrlPattern::for_intercept("/api/users").unwrap();
            assert_eq!(plain, UrlPattern::Contains("/api/users".into()));
            assert!(plain.matches("http://app/api/users?page=2"));

            let glob = UrlPattern::for_intercept("**/api/users/*").unwrap();
            assert!(matches!(glob, UrlPattern::Glob { .. }));
            assert_eq!(glob.to_string(), "**/api/users/*");
        }

        #[test]
        fn test_glob_segments() {
            let pattern = UrlPattern::for_intercept("**/api/users/*").unwrap();
            assert!(pattern.matches("http://localhost/api/users/42"));
            assert!(pattern.matches("http://localhost/api/users/42?full=1"));
            assert!(!pattern.matches("http://localhost/api/posts/42"));
            assert!(!pattern.matches("http://localhost/api/users/42/roles"));
        }

        #[test]
        fn test_glob_literal_repeated_in_url() {
            let pattern = UrlPattern::for_intercept("**/users").unwrap();
            assert!(pattern.matches("http://app/teams/3/users"));
            assert!(pattern.matches("http://app/users/3/users"));
            assert!(!pattern.matches("http://app/users/3"));
        }

        #[test]
        fn test_path_glob_matches_any_origin() {
            let pattern = UrlPattern::for_intercept("/api/users/*").unwrap();
            assert!(pattern.matches("/api/users/7"));
            assert!(pattern.matches("https://app.test:8080/api/users/7"));
            assert!(!pattern.matches("https://app.test/v2/api/users/7"));
        }

        #[test]
        fn test_glob_escapes_regex_characters() {
            let pattern = UrlPattern::for_intercept("**/search.json*").unwrap();
            assert!(pattern.matches("http://app/search.json"));
            assert!(!pattern.matches("http://app/searchxjson"));
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_register_and_take() {
            let mut registry = InterceptRegistry::new();
            assert!(!registry.register(HttpMethod::Get, "/api/countries", "country").unwrap());
            let matched = registry.record("http://app/api/countries?page=1", HttpMethod::Get, 200);
            assert_eq!(matched, vec!["country".to_string()]);

            let exchange = registry.take("country").unwrap().unwrap();
            assert_eq!(exchange.status(), 200);
            assert_eq!(exchange.request.url, "http://app/api/countries?page=1");
            assert!(registry.take("country").unwrap().is_none());
        }

        #[test]
        fn test_method_must_match() {
            let mut registry = InterceptRegistry::new();
            registry.register(HttpMethod::Post, "/api/save", "save_OnEvent").unwrap();
            assert!(registry.record("/api/save", HttpMethod::Get, 200).is_empty());
            assert!(registry.take("save_OnEvent").unwrap().is_none());
        }

        #[test]
        fn test_unknown_alias() {
            let mut registry = InterceptRegistry::new();
            let err = registry.take("missing").unwrap_err();
            assert!(matches!(err, PomError::UnknownAlias { .. }));
        }

        #[test]
        fn test_reregister_replaces() {
            let mut registry = InterceptRegistry::new();
            registry.register(HttpMethod::Get, "/a", "x").unwrap();
            assert!(registry.register(HttpMethod::Get, "/b", "x").unwrap());
            assert_eq!(registry.aliases(), vec!["x"]);
            assert_eq!(registry.route("x").unwrap().url(), "/b");
        }
    }
}
