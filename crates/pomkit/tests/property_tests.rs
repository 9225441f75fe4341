//! Property-based tests for pomkit.
//!
//! Uses proptest to check the component-tree invariants hold for arbitrary
//! names, seeds and action lists.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pomkit::prelude::*;
use proptest::prelude::*;
use std::future::Future;
use std::sync::Arc;

fn block_on<F: Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(fut)
}

fn fast(seed: u64) -> (Session, Arc<MockDriver>) {
    Session::mock(
        SessionConfig::default()
            .with_assertion_timeout(20)
            .with_poll_interval(5)
            .with_seed(seed),
    )
}

// === Component Tree Properties ===

proptest! {
    /// A stored child comes back unchanged.
    #[test]
    fn prop_set_then_get_element(key in "[a-z_]{1,12}", name in "[a-z]{1,12}", selector in "[.#][a-z]{1,8}") {
        let mut root = Component::new(ComponentKind::Page, "root");
        let child = Component::generic(name, Locator::new(selector));
        root.set_element(key.clone(), child.clone());
        prop_assert_eq!(root.element(&key), Some(&Child::Generic(child)));
    }

    /// One alias per declared load URL and one per declared event URL.
    #[test]
    fn prop_one_alias_per_declared_url(
        children in prop::collection::btree_map("[a-z]{1,8}", (any::<bool>(), any::<bool>()), 0..8)
    ) {
        let mut root = Component::new(ComponentKind::Page, "root");
        let mut expected = 0;
        for (name, (load, event)) in &children {
            let mut child = Component::generic(name.clone(), Locator::new(format!("#{name}")));
            if *load {
                child.set_load_request(LoadRequest::new(format!("/api/{name}")));
                expected += 1;
            }
            if *event {
                child.set_event_request(EventRequest::new(format!("/api/{name}/save")));
                expected += 1;
            }
            root.set_element(name.clone(), child);
        }

        let (session, driver) = fast(1);
        let registered = block_on(root.intercept_component_requests(&session)).unwrap();
        prop_assert_eq!(registered, expected);
        prop_assert_eq!(driver.registered_aliases().len(), expected);
    }

    /// An unsupported method anywhere in the tree registers nothing.
    #[test]
    fn prop_unsupported_method_registers_nothing(
        names in prop::collection::btree_set("[a-z]{1,8}", 1..6),
        method in prop::sample::select(vec!["TRACE", "FETCH", "CONNECT"]),
    ) {
        let mut root = Component::new(ComponentKind::Page, "root");
        for name in &names {
            let child = Component::generic(name.clone(), Locator::new("div"))
                .with_load_request(LoadRequest::new(format!("/api/{name}")));
            root.set_element(name.clone(), child);
        }
        let bad = Component::generic("zzz_bad", Locator::new("div"))
            .with_event_request(EventRequest::new("/api/bad").with_method(method));
        root.set_element("zzz_bad", bad);

        let (session, driver) = fast(1);
        let err = block_on(root.intercept_component_requests(&session)).unwrap_err();
        prop_assert!(err.is_configuration());
        prop_assert!(driver.registered_aliases().is_empty());
    }
}

// === Datatable Properties ===

proptest! {
    /// Total pages is the smallest page count that holds every row.
    #[test]
    fn prop_total_pages_is_ceiling(total in 0u64..100_000, size in 1u64..500) {
        let pages = total_pages_for(total, size);
        prop_assert!(pages * size >= total);
        if pages > 0 {
            prop_assert!((pages - 1) * size < total);
        }
    }

    /// The page counter never drops below 1.
    #[test]
    fn prop_page_counter_at_least_one(moves in prop::collection::vec(0u8..3, 0..30)) {
        let (session, _driver) = fast(1);
        let mut table = Datatable::new("users", Locator::new("table"));
        block_on(async {
            for step in &moves {
                match step {
                    0 => table.next_page(&session).await.unwrap(),
                    1 => table.previous_page(&session).await.unwrap(),
                    _ => table.first_page(&session).await.unwrap(),
                };
            }
        });
        prop_assert!(table.current_page() >= 1);
    }
}

// === Menu Properties ===

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Ignored items are never picked, for any seed.
    #[test]
    fn prop_random_pick_skips_ignored(seed in any::<u64>()) {
        let (session, driver) = fast(seed);
        let options = Locator::new(".options").find(CHECKBOX_SELECTOR);
        for label in ["skip", "Lyon", "Paris"] {
            driver.add_element(
                options.clone(),
                ElementHandle::new("input").with_attr("type", "checkbox").with_text(label),
            );
        }
        let menu = Menu::new("options", Locator::new(".options"));
        let picked = block_on(menu.select_random_items(&session, false, &["skip"])).unwrap();
        prop_assert_eq!(picked.len(), 1);
        prop_assert_ne!(picked[0].as_str(), "skip");
    }
}

// === Action List Properties ===

proptest! {
    /// A list with a parameterless `type` fails before any action runs.
    #[test]
    fn prop_invalid_action_list_runs_nothing(clicks_before in 0usize..5, clicks_after in 0usize..5) {
        let (session, driver) = fast(1);
        driver.add_element("#name", ElementHandle::new("input"));
        let field = Field::new("name", Locator::new("#name"), [FieldEntry::Input]);

        let mut calls = vec![ActionCall::click(); clicks_before];
        calls.push(ActionCall::new("type"));
        calls.extend(vec![ActionCall::click(); clicks_after]);

        let err = block_on(field.perform_multiple_actions(&session, &calls)).unwrap_err();
        prop_assert!(err.is_configuration());
        prop_assert!(driver.history().is_empty());
    }

    /// A failure-message override stays inside its scope.
    #[test]
    fn prop_failure_override_is_scoped(message in "[A-Za-z ]{1,30}") {
        let (session, _driver) = fast(1);
        let missing = Locator::new("#missing");
        let (scoped, next) = block_on(async {
            let scoped = session
                .with_failure_message(message.clone(), assert_exist(&session, &missing, None))
                .await
                .unwrap_err();
            let next = assert_exist(&session, &missing, None).await.unwrap_err();
            (scoped, next)
        });
        prop_assert_eq!(scoped.to_string(), format!("Assertion failed: {message}"));
        prop_assert_eq!(next.to_string(), "Assertion failed: expected '#missing' to exist");
        prop_assert!(!session.has_failure_override());
    }
}
