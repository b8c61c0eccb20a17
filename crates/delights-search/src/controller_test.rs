use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use delights_api::{RawRestaurant, SessionStore};
use serde_json::json;
use tokio::time::sleep;

use super::*;

/// A search backend that replays scripted outcomes, each after its own delay,
/// and records every call it receives.
#[derive(Clone, Default)]
struct ScriptedSearch {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    calls: Vec<(SearchRequest, Option<String>)>,
    outcomes: VecDeque<(Duration, Result<SearchPage, ServiceError>)>,
}

impl ScriptedSearch {
    fn respond(&self, delay_ms: u64, result: Result<SearchPage, ServiceError>) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .outcomes
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    fn calls(&self) -> Vec<(SearchRequest, Option<String>)> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl RestaurantSearch for ScriptedSearch {
    async fn search(
        &self,
        request: &SearchRequest,
        credential: Option<&str>,
    ) -> Result<SearchPage, ServiceError> {
        let outcome = {
            let mut script = self.inner.lock().unwrap();
            script
                .calls
                .push((request.clone(), credential.map(str::to_owned)));
            script.outcomes.pop_front()
        };
        match outcome {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                result
            }
            None => Ok(SearchPage {
                records: Vec::new(),
                total_pages: 1,
            }),
        }
    }
}

fn page_of(ids: &[&str], total_pages: u32) -> SearchPage {
    SearchPage {
        records: ids
            .iter()
            .map(|id| RawRestaurant::from_value(json!({"_id": id, "name": id})))
            .collect(),
        total_pages,
    }
}

fn signed_in() -> SessionStore {
    let session = SessionStore::in_memory();
    session.set("tok").unwrap();
    session
}

fn controller(
    search: &ScriptedSearch,
    session: SessionStore,
) -> (
    QueryController<ScriptedSearch>,
    mpsc::UnboundedReceiver<ControllerEvent>,
) {
    QueryController::new(search.clone(), session, ControllerSettings::default())
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn ids(page: &ResultPage) -> Vec<&str> {
    page.restaurants.iter().map(|r| r.id.as_str()).collect()
}

// -----------------------------------------------------------------------
// Debounce
// -----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn rapid_submits_coalesce_into_one_call_with_last_arguments() {
    let search = ScriptedSearch::default();
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("b", SearchFilters::default());
    sleep(Duration::from_millis(40)).await;
    ctl.submit_query("bir", SearchFilters::default());
    sleep(Duration::from_millis(40)).await;
    ctl.submit_query("biryani", SearchFilters::default().with_cuisine("Desi"));
    sleep(Duration::from_millis(600)).await;

    let calls = search.calls();
    assert_eq!(calls.len(), 1, "expected exactly one fetch, got {calls:?}");
    let (request, credential) = &calls[0];
    assert_eq!(request.query, "biryani");
    assert_eq!(request.filters.cuisine.as_deref(), Some("Desi"));
    assert_eq!(request.page, 1);
    assert_eq!(request.page_size, 10);
    assert_eq!(credential.as_deref(), Some("tok"));
}

#[tokio::test(start_paused = true)]
async fn fetch_waits_for_the_quiet_period() {
    let search = ScriptedSearch::default();
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("karahi", SearchFilters::default());
    sleep(Duration::from_millis(450)).await;
    assert!(search.calls().is_empty());
    assert_eq!(ctl.status(), FetchStatus::Idle);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(search.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn status_moves_through_pending_to_settled() {
    let search = ScriptedSearch::default();
    search.respond(200, Ok(page_of(&["a"], 1)));
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(550)).await;
    assert_eq!(ctl.status(), FetchStatus::Pending);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(ctl.status(), FetchStatus::Settled);
}

// -----------------------------------------------------------------------
// Ordering
// -----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stale_completion_is_discarded() {
    let search = ScriptedSearch::default();
    search
        .respond(1000, Ok(page_of(&["slow-a"], 5)))
        .respond(10, Ok(page_of(&["fast-b"], 2)));
    let (ctl, mut rx) = controller(&search, signed_in());

    // A starts at 500 and would land at 1500.
    ctl.submit_query("a", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    // B starts at 1100 and lands at 1110.
    ctl.submit_query("b", SearchFilters::default());
    sleep(Duration::from_millis(1400)).await;

    assert_eq!(search.calls().len(), 2);
    let current = ctl.current_result_page().expect("a page should be current");
    assert_eq!(ids(&current), vec!["fast-b"]);
    assert_eq!(ctl.total_pages(), 2);

    let results: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            ControllerEvent::Results(page) => Some(page),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 1);
    assert_eq!(ids(&results[0]), vec!["fast-b"]);
}

#[tokio::test(start_paused = true)]
async fn success_normalizes_records() {
    let search = ScriptedSearch::default();
    search.respond(
        0,
        Ok(SearchPage {
            records: vec![RawRestaurant::from_value(json!({
                "_id": "k1",
                "location": "chken street",
                "images": ["uploads/a.jpg", "uploads/b.png", "uploads/c.png"]
            }))],
            total_pages: 3,
        }),
    );
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    let page = ctl.current_result_page().unwrap();
    let r = &page.restaurants[0];
    assert_eq!(r.name, "Unknown");
    assert_eq!(r.location, "chicken street");
    assert_eq!(r.images.len(), 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 3);
}

// -----------------------------------------------------------------------
// Paging
// -----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn out_of_range_pages_are_ignored() {
    let search = ScriptedSearch::default();
    let (ctl, _rx) = controller(&search, signed_in());

    assert!(!ctl.go_to_page(0));
    assert!(!ctl.go_to_page(2));
    assert_eq!(ctl.page(), 1);

    sleep(Duration::from_millis(600)).await;
    assert!(search.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn go_to_page_fetches_immediately_within_known_range() {
    let search = ScriptedSearch::default();
    search
        .respond(0, Ok(page_of(&["p1"], 3)))
        .respond(0, Ok(page_of(&["p3"], 3)));
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("kebab", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    assert_eq!(ctl.total_pages(), 3);

    assert!(!ctl.go_to_page(4));
    assert_eq!(ctl.page(), 1);

    assert!(ctl.go_to_page(3));
    sleep(Duration::from_millis(1)).await;

    let calls = search.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0.page, 3);
    assert_eq!(calls[1].0.query, "kebab");
    let current = ctl.current_result_page().unwrap();
    assert_eq!(current.page, 3);
    assert_eq!(ids(&current), vec!["p3"]);
}

#[tokio::test(start_paused = true)]
async fn submit_resets_page_but_keeps_known_total() {
    let search = ScriptedSearch::default();
    search
        .respond(0, Ok(page_of(&["a"], 4)))
        .respond(0, Ok(page_of(&["b"], 4)));
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    assert!(ctl.go_to_page(2));
    sleep(Duration::from_millis(1)).await;

    ctl.submit_query("new", SearchFilters::default());
    let state = ctl.query_state();
    assert_eq!(state.page, 1);
    assert_eq!(state.total_pages, 4);
    assert_eq!(state.free_text_query, "new");
}

#[tokio::test(start_paused = true)]
async fn go_to_page_during_debounce_uses_previous_total() {
    let search = ScriptedSearch::default();
    search
        .respond(0, Ok(page_of(&["a"], 4)))
        .respond(0, Ok(page_of(&["t3"], 2)));
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    ctl.submit_query("tikka", SearchFilters::default());
    assert!(!ctl.go_to_page(5));
    assert!(ctl.go_to_page(3));
    sleep(Duration::from_millis(1)).await;

    let calls = search.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0.query, "tikka");
    assert_eq!(calls[1].0.page, 3);
    let state = ctl.query_state();
    assert_eq!(state.page, 3);
    assert_eq!(state.total_pages, 2);
    assert!(!ctl.go_to_page(3));
}

#[tokio::test(start_paused = true)]
async fn go_to_page_cancels_waiting_debounce() {
    let search = ScriptedSearch::default();
    search.respond(0, Ok(page_of(&["a"], 2)));
    let (ctl, _rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    ctl.submit_query("tikka", SearchFilters::default());
    sleep(Duration::from_millis(100)).await;
    assert!(ctl.go_to_page(2));
    sleep(Duration::from_millis(1000)).await;

    let calls = search.calls();
    assert_eq!(calls.len(), 2, "debounced fetch should not also run: {calls:?}");
    assert_eq!(calls[1].0.query, "tikka");
    assert_eq!(calls[1].0.page, 2);
}

// -----------------------------------------------------------------------
// Failures
// -----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn forbidden_clears_session_and_redirects() {
    let search = ScriptedSearch::default();
    search.respond(0, Ok(page_of(&["a", "b"], 2))).respond(
        0,
        Err(ServiceError::Unauthorized {
            status: 403,
            message: "Invalid or expired session".to_owned(),
        }),
    );
    let session = signed_in();
    let (ctl, mut rx) = controller(&search, session.clone());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    drain(&mut rx);

    ctl.submit_query("again", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    assert!(!session.is_authenticated());
    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            ControllerEvent::Notice("Invalid or expired session".to_owned()),
            ControllerEvent::RedirectToLogin,
            ControllerEvent::Results(ResultPage::empty(1, 2)),
        ]
    );
    assert!(ctl.current_result_page().unwrap().restaurants.is_empty());
    assert_eq!(ctl.status(), FetchStatus::Settled);
}

#[tokio::test(start_paused = true)]
async fn missing_session_redirects_without_a_call() {
    let search = ScriptedSearch::default();
    let (ctl, mut rx) = controller(&search, SessionStore::in_memory());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    assert!(search.calls().is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![
            ControllerEvent::Notice(LOGIN_REQUIRED.to_owned()),
            ControllerEvent::RedirectToLogin,
            ControllerEvent::Results(ResultPage::empty(1, 1)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cleared_credential_is_not_reused() {
    let search = ScriptedSearch::default();
    search.respond(
        0,
        Err(ServiceError::Unauthorized {
            status: 401,
            message: "Invalid or expired session".to_owned(),
        }),
    );
    let settings = ControllerSettings {
        require_session: false,
        ..ControllerSettings::default()
    };
    let (ctl, _rx) = QueryController::new(search.clone(), signed_in(), settings);

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    let calls = search.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.as_deref(), Some("tok"));
    assert!(calls[1].1.is_none());
}

#[tokio::test(start_paused = true)]
async fn other_failures_keep_previous_page() {
    let search = ScriptedSearch::default();
    search.respond(0, Ok(page_of(&["keep"], 1))).respond(
        0,
        Err(ServiceError::ServiceUnavailable {
            url: "http://localhost/restaurants/search".to_owned(),
            message: "Search service unavailable".to_owned(),
        }),
    );
    let session = signed_in();
    let (ctl, mut rx) = controller(&search, session.clone());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;
    drain(&mut rx);

    ctl.submit_query("x", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    assert_eq!(
        drain(&mut rx),
        vec![ControllerEvent::Notice(
            "Error: Search service unavailable".to_owned()
        )]
    );
    assert_eq!(ids(&ctl.current_result_page().unwrap()), vec!["keep"]);
    assert!(session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn first_failure_settles_with_empty_page() {
    let search = ScriptedSearch::default();
    search.respond(
        0,
        Err(ServiceError::InvalidFormat {
            context: "restaurant search".to_owned(),
            reason: "expected an array".to_owned(),
        }),
    );
    let (ctl, mut rx) = controller(&search, signed_in());

    ctl.submit_query("", SearchFilters::default());
    sleep(Duration::from_millis(600)).await;

    assert_eq!(
        drain(&mut rx),
        vec![
            ControllerEvent::Notice("Error: Invalid response data format".to_owned()),
            ControllerEvent::Results(ResultPage::empty(1, 1)),
        ]
    );
}

#[test]
fn settings_follow_config() {
    let config = AppConfig {
        env: delights_core::Environment::Test,
        api_url: "http://localhost:8081".to_owned(),
        asset_origin: "http://localhost:8081".to_owned(),
        log_level: "info".to_owned(),
        session_path: std::path::PathBuf::from("session.json"),
        request_timeout_secs: 30,
        user_agent: "delights-test/0.1".to_owned(),
        search_page_size: 25,
        search_debounce_ms: 300,
    };
    let settings = ControllerSettings::from_config(&config);
    assert_eq!(settings.page_size, 25);
    assert_eq!(settings.quiet_period, Duration::from_millis(300));
    assert!(settings.require_session);
}
