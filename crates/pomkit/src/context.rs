//! Per-run test context.
//!
//! A [`TestContext`] owns the [`Session`] and one instance of each page type
//! the test touches. The first constructed instance of a page type is the one
//! every later lookup returns, until [`TestContext::reset`].
//!
//! ```ignore
//! struct UsersPage {
//!     page: Page,
//! }
//!
//! impl PageObject for UsersPage {
//!     fn page(&self) -> &Page {
//!         &self.page
//!     }
//!
//!     fn page_mut(&mut self) -> &mut Page {
//!         &mut self.page
//!     }
//! }
//!
//! let users = ctx.open(UsersPage::new, Some("/users")).await?;
//! ```

use crate::component::Page;
use crate::config::SessionConfig;
use crate::driver::MockDriver;
use crate::result::{PomError, PomResult};
use crate::session::Session;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// A user-defined page type built around a [`Page`]
pub trait PageObject: Send + Sync + 'static {
    /// The page's component tree
    fn page(&self) -> &Page;

    /// The page's component tree, mutably
    fn page_mut(&mut self) -> &mut Page;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased page instance
trait PageEntry: Send + Sync {
    fn erased_page(&self) -> &Page;
    fn erased_page_mut(&mut self) -> &mut Page;
    fn erased_name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<P: PageObject> PageEntry for P {
    fn erased_page(&self) -> &Page {
        self.page()
    }

    fn erased_page_mut(&mut self) -> &mut Page {
        self.page_mut()
    }

    fn erased_name(&self) -> &str {
        PageObject::page_name(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One instance per page type, in construction order
#[derive(Default)]
pub struct PageRegistry {
    pages: Vec<(TypeId, Box<dyn PageEntry>)>,
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.pages.iter().map(|(_, p)| p.erased_name()))
            .finish()
    }
}

fn unregistered<P>() -> PomError {
    PomError::ComponentNotFound {
        kind: "PAGE".to_string(),
        key: std::any::type_name::<P>().to_string(),
    }
}

impl PageRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position<P: PageObject>(&self) -> Option<usize> {
        let id = TypeId::of::<P>();
        self.pages.iter().position(|(t, _)| *t == id)
    }

    /// The `P` instance, built with `make` on first use
    pub fn instance<P, F>(&mut self, make: F) -> PomResult<&mut P>
    where
        P: PageObject,
        F: FnOnce() -> P,
    {
        let index = match self.position::<P>() {
            Some(index) => index,
            None => {
                self.pages.push((TypeId::of::<P>(), Box::new(make())));
                self.pages.len() - 1
            }
        };
        self.pages[index]
            .1
            .as_any_mut()
            .downcast_mut::<P>()
            .ok_or_else(unregistered::<P>)
    }

    /// The `P` instance, if one was built
    #[must_use]
    pub fn get<P: PageObject>(&self) -> Option<&P> {
        self.position::<P>()
            .and_then(|i| self.pages[i].1.as_any().downcast_ref::<P>())
    }

    /// The `P` instance, mutably
    pub fn get_mut<P: PageObject>(&mut self) -> Option<&mut P> {
        let index = self.position::<P>()?;
        self.pages[index].1.as_any_mut().downcast_mut::<P>()
    }

    /// Whether a `P` instance was built
    #[must_use]
    pub fn contains<P: PageObject>(&self) -> bool {
        self.position::<P>().is_some()
    }

    /// Every page, in construction order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().map(|(_, p)| p.erased_page())
    }

    /// Every page, mutably
    pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut Page> {
        self.pages.iter_mut().map(|(_, p)| p.erased_page_mut())
    }

    /// Number of instances
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }

    /// Drop every instance
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

/// Session plus page instances for one test run
#[derive(Debug)]
pub struct TestContext {
    /// Driver, config and RNG
    pub session: Session,
    /// Page instances
    pub pages: PageRegistry,
}

impl TestContext {
    /// Context over a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pages: PageRegistry::new(),
        }
    }

    /// Context over a fresh [`MockDriver`]
    #[must_use]
    pub fn mock(config: SessionConfig) -> (Self, Arc<MockDriver>) {
        let (session, driver) = Session::mock(config);
        (Self::new(session), driver)
    }

    /// The `P` instance, built with `make` on first use
    pub fn page<P, F>(&mut self, make: F) -> PomResult<&mut P>
    where
        P: PageObject,
        F: FnOnce() -> P,
    {
        self.pages.instance(make)
    }

    /// Get the `P` instance, initialize it and navigate to `path`
    pub async fn open<P, F>(&mut self, make: F, path: Option<&str>) -> PomResult<&mut P>
    where
        P: PageObject,
        F: FnOnce() -> P,
    {
        let page = self.pages.instance(make)?;
        page.page_mut().init(&self.session).await?;
        page.page().navigate(&self.session, path).await?;
        Ok(page)
    }

    /// Initialize every page built so far
    pub async fn init_all(&mut self) -> PomResult<()> {
        for page in self.pages.pages_mut() {
            page.init(&self.session).await?;
        }
        Ok(())
    }

    /// Drop every page instance
    pub fn reset(&mut self) {
        tracing::debug!(pages = self.pages.count(), "test context reset");
        self.pages.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::component::Datatable;
    use crate::config::RequestConfig;
    use crate::locator::Locator;

    struct UsersPage {
        page: Page,
        built: u32,
    }

    impl UsersPage {
        fn new(built: u32) -> Self {
            let mut page = Page::new("users");
            let mut table = Datatable::new("users", Locator::new("table"));
            table.apply_requests(&RequestConfig::on_load("/api/users"));
            page.set_table("users", table);
            Self { page, built }
        }
    }

    impl PageObject for UsersPage {
        fn page(&self) -> &Page {
            &self.page
        }

        fn page_mut(&mut self) -> &mut Page {
            &mut self.page
        }
    }

    struct LoginPage {
        page: Page,
    }

    impl PageObject for LoginPage {
        fn page(&self) -> &Page {
            &self.page
        }

        fn page_mut(&mut self) -> &mut Page {
            &mut self.page
        }

        fn page_name(&self) -> &str {
            "login"
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_first_constructed_wins() {
            let mut registry = PageRegistry::new();
            assert_eq!(registry.instance(|| UsersPage::new(1)).unwrap().built, 1);
            assert_eq!(registry.instance(|| UsersPage::new(2)).unwrap().built, 1);
            assert_eq!(registry.count(), 1);
        }

        #[test]
        fn test_instances_keyed_by_type() {
            let mut registry = PageRegistry::new();
            registry.instance(|| UsersPage::new(1)).unwrap();
            registry
                .instance(|| LoginPage { page: Page::new("login") })
                .unwrap();
            assert!(registry.contains::<LoginPage>());
            assert_eq!(registry.get::<UsersPage>().unwrap().built, 1);
            let names: Vec<&str> = registry.pages().map(|p| p.name()).collect();
            assert_eq!(names, vec!["users", "login"]);
            assert!(format!("{registry:?}").contains("login"));
        }

        #[test]
        fn test_get_mut_and_clear() {
            let mut registry = PageRegistry::new();
            assert!(registry.get_mut::<UsersPage>().is_none());
            registry.instance(|| UsersPage::new(1)).unwrap();
            registry.get_mut::<UsersPage>().unwrap().built = 5;
            assert_eq!(registry.get::<UsersPage>().unwrap().built, 5);
            registry.clear();
            assert!(!registry.contains::<UsersPage>());
        }
    }

    mod context_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_inits_and_navigates() {
            let (mut ctx, driver) =
                TestContext::mock(SessionConfig::default().with_base_url("http://app.test"));
            let page = ctx.open(|| UsersPage::new(1), Some("/users")).await.unwrap();
            assert_eq!(page.built, 1);
            assert_eq!(driver.registered_aliases(), vec!["users".to_string()]);
            assert!(driver.was_called("visit:http://app.test/users"));
        }

        #[tokio::test]
        async fn test_reset_rebuilds_pages() {
            let (mut ctx, _driver) = TestContext::mock(SessionConfig::default());
            ctx.page(|| UsersPage::new(1)).unwrap();
            ctx.init_all().await.unwrap();
            ctx.reset();
            assert_eq!(ctx.pages.count(), 0);
            assert_eq!(ctx.page(|| UsersPage::new(2)).unwrap().built, 2);
        }
    }
}
