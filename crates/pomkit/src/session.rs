//! Per-run session: the driver, configuration, RNG and the scoped
//! failure-message override.

use crate::config::SessionConfig;
use crate::driver::{ActionOptions, MockDriver, PageDriver};
use crate::fuzzer::{random_words, Seed, Xorshift64};
use crate::logging;
use crate::network::{HttpMethod, InterceptedExchange};
use crate::result::PomResult;
use crate::wait::WaitOptions;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Everything a component operation needs at run time.
///
/// One session per test; operations are awaited in order, so the step that
/// awaits a response observes it before the next step starts.
#[derive(Debug)]
pub struct Session {
    driver: Arc<dyn PageDriver>,
    config: SessionConfig,
    failure_message: Mutex<Option<String>>,
    rng: Mutex<Xorshift64>,
}

impl Session {
    /// Create a session over a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: SessionConfig) -> Self {
        let seed = config.seed.map_or_else(Seed::from_entropy, Seed::from_u64);
        tracing::debug!(seed = seed.value(), "session created");
        Self {
            driver,
            config,
            failure_message: Mutex::new(None),
            rng: Mutex::new(Xorshift64::new(seed)),
        }
    }

    /// Session over a fresh [`MockDriver`], returning both
    #[must_use]
    pub fn mock(config: SessionConfig) -> (Self, Arc<MockDriver>) {
        let driver = Arc::new(MockDriver::new());
        (Self::new(driver.clone(), config), driver)
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Options applied to element actions
    #[must_use]
    pub const fn action_options(&self) -> ActionOptions {
        ActionOptions {
            force: self.config.force_actions,
        }
    }

    /// Polling options for assertions
    #[must_use]
    pub const fn assertion_wait(&self) -> WaitOptions {
        self.config.assertion_wait()
    }

    // =========================================================================
    // Failure message override
    // =========================================================================

    /// Run `fut` with `message` replacing the default failure message of any
    /// assertion that fails inside it.
    ///
    /// The previous override is restored when `fut` completes, fails, or is
    /// dropped.
    pub async fn with_failure_message<F>(&self, message: impl Into<String>, fut: F) -> F::Output
    where
        F: Future,
    {
        let _scope = FailureMessageScope::install(&self.failure_message, message.into());
        fut.await
    }

    /// Active override, or `default`
    #[must_use]
    pub fn failure(&self, default: impl Into<String>) -> String {
        lock(&self.failure_message)
            .clone()
            .unwrap_or_else(|| default.into())
    }

    /// Whether an override is installed
    #[must_use]
    pub fn has_failure_override(&self) -> bool {
        lock(&self.failure_message).is_some()
    }

    // =========================================================================
    // Randomness
    // =========================================================================

    /// Random index in `0..len`
    pub fn random_index(&self, len: usize) -> usize {
        lock(&self.rng).next_index(len)
    }

    /// `count` random filler words
    pub fn random_words(&self, count: usize) -> String {
        random_words(&mut lock(&self.rng), count)
    }

    // =========================================================================
    // Network aliases
    // =========================================================================

    /// Register an intercept alias and log it
    pub async fn intercept(&self, method: HttpMethod, url: &str, alias: &str) -> PomResult<()> {
        self.driver.intercept(method, url, alias).await?;
        logging::log_intercept_request(method.as_str(), url, alias);
        Ok(())
    }

    /// Await one completion of `alias`, defaulting to the request timeout
    pub async fn wait_for_alias(
        &self,
        alias: &str,
        timeout: Option<Duration>,
    ) -> PomResult<InterceptedExchange> {
        let timeout = timeout.unwrap_or_else(|| self.config.request_timeout());
        tracing::debug!(alias, timeout_ms = timeout.as_millis() as u64, "waiting for alias");
        self.driver.wait_for_alias(alias, timeout).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guard restoring the previous failure-message override on drop
#[derive(Debug)]
pub struct FailureMessageScope<'a> {
    slot: &'a Mutex<Option<String>>,
    previous: Option<String>,
}

impl<'a> FailureMessageScope<'a> {
    fn install(slot: &'a Mutex<Option<String>>, message: String) -> Self {
        let previous = lock(slot).replace(message);
        Self { slot, previous }
    }
}

impl Drop for FailureMessageScope<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = self.previous.take();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::PomError;

    fn session() -> Session {
        Session::mock(SessionConfig::default().with_seed(1)).0
    }

    mod failure_message_tests {
        use super::*;

        #[tokio::test]
        async fn test_override_active_inside_scope() {
            let session = session();
            let inner = session
                .with_failure_message("custom", async { session.failure("default") })
                .await;
            assert_eq!(inner, "custom");
            assert_eq!(session.failure("default"), "default");
        }

        #[tokio::test]
        async fn test_override_released_on_error() {
            let session = session();
            let result: PomResult<()> = session
                .with_failure_message("custom", async {
                    Err(PomError::AssertionFailed {
                        message: session.failure("default"),
                    })
                })
                .await;
            assert_eq!(result.unwrap_err().to_string(), "Assertion failed: custom");
            assert!(!session.has_failure_override());
        }

        #[tokio::test]
        async fn test_nested_scopes_restore_outer() {
            let session = session();
            session
                .with_failure_message("outer", async {
                    session
                        .with_failure_message("inner", async {
                            assert_eq!(session.failure("d"), "inner");
                        })
                        .await;
                    assert_eq!(session.failure("d"), "outer");
                })
                .await;
            assert_eq!(session.failure("d"), "d");
        }
    }

    mod rng_tests {
        use super::*;

        #[test]
        fn test_seeded_sessions_agree() {
            let a = session();
            let b = session();
            assert_eq!(a.random_words(4), b.random_words(4));
            assert_eq!(a.random_index(10), b.random_index(10));
        }
    }

    mod alias_tests {
        use super::*;

        #[tokio::test]
        async fn test_intercept_then_wait() {
            let (session, driver) = Session::mock(SessionConfig::default());
            session
                .intercept(HttpMethod::Get, "/api/users", "users")
                .await
                .unwrap();
            let exchange = session.wait_for_alias("users", None).await.unwrap();
            assert_eq!(exchange.alias, "users");
            assert!(driver.was_called("intercept:GET /api/users as users"));
            assert!(driver.was_called("wait:@users"));
        }
    }
}
