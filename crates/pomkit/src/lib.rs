//! Pomkit: page-object components for browser end-to-end tests
//!
//! Screens are described as a tree of components (pages, forms, fields,
//! buttons, menus, datatables, columns, graphs). Each component knows its
//! locator, the network requests that feed it, how to act on itself and how
//! to assert on its own state. Browser work goes through the [`PageDriver`]
//! trait; [`MockDriver`] records every call for unit tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     POMKIT Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page tree  │    │ Session    │    │ PageDriver │            │
//! │   │ (Form,     │───►│ (config,   │───►│ (browser   │            │
//! │   │  Field...) │    │  aliases)  │    │  or mock)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pomkit::prelude::*;
//!
//! # async fn demo() -> PomResult<()> {
//! let (session, driver) = Session::mock(SessionConfig::default());
//! driver.add_element("#email", ElementHandle::new("input"));
//!
//! let email = Field::new("email", Locator::new("#email"), [FieldEntry::Input]);
//! email.type_text(&session, "ada@example.com").await?;
//! email.is_value(&session, "ada@example.com").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod assertion;
pub mod component;
pub mod config;
pub mod context;
pub mod driver;
pub mod fuzzer;
pub mod locator;
pub mod logging;
pub mod network;
mod result;
pub mod session;
pub mod wait;

pub use component::{
    Actionable, Button, Child, Column, Component, ComponentKind, Datatable, Field, Form, Graph,
    Menu, Page,
};
pub use context::{PageObject, PageRegistry, TestContext};
pub use driver::{MockDriver, PageDriver};
pub use result::{PomError, PomResult};
pub use session::Session;

/// Everything a test file usually needs
pub mod prelude {
    pub use super::assertion::{
        assert_at_least_one_with_css, assert_button_enabled, assert_contains, assert_disabled,
        assert_enabled, assert_exist, assert_not_contains, assert_not_visible,
        assert_should, assert_status_in_range, assert_status_not_in_range,
        assert_url_includes, assert_url_not_includes, assert_visible, exist_with_condition,
        expect_submit, wait_until_select, AssertionOutcome, AssertionResult, Matcher,
        SubmitExpectation,
    };
    pub use super::component::*;
    pub use super::config::{
        ButtonConfig, ColumnConfig, ElementConfig, FieldConfig, MenuConfig, RequestConfig,
        SessionConfig,
    };
    pub use super::context::{PageObject, PageRegistry, TestContext};
    pub use super::driver::{ActionOptions, ElementHandle, MockDriver, PageDriver};
    pub use super::fuzzer::{random_words, Seed, Xorshift64};
    pub use super::locator::{Locator, Selector};
    pub use super::network::{HttpMethod, InterceptedExchange, UrlPattern};
    pub use super::result::{PomError, PomResult};
    pub use super::session::Session;
    pub use super::wait::{poll_until, wait_timeout, WaitOptions, WaitResult};
}
