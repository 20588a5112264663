//! Filter session tests against a scripted lookup service.
//!
//! Time is paused, so scripted delays decide the completion order
//! deterministically.
//!
//! Run with: cargo test --test session_test

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use productivity_filters::error::LookupError;
use productivity_filters::filters::{DateFilter, PageQuery, Selection};
use productivity_filters::lookup::{LookupQuery, LookupResult, LookupService};
use productivity_filters::sync::synchronizer::{FAILED_MODELS, FAILED_STATIONS};
use productivity_filters::sync::{Applied, DependentField, FieldState, FilterSession};

const TIMEOUT: Duration = Duration::from_secs(10);

type Key = (String, Option<String>);

#[derive(Default)]
struct ScriptedLookup {
    responses: HashMap<Key, (Duration, Result<LookupResult, LookupError>)>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    fn respond(
        mut self,
        customer: &str,
        model: Option<&str>,
        delay_ms: u64,
        models: &[&str],
        stations: &[&str],
    ) -> Self {
        let result = LookupResult::new(
            models.iter().map(ToString::to_string).collect(),
            stations.iter().map(ToString::to_string).collect(),
        );
        self.responses.insert(
            (customer.to_string(), model.map(ToString::to_string)),
            (Duration::from_millis(delay_ms), Ok(result)),
        );
        self
    }

    fn fail(mut self, customer: &str, model: Option<&str>, delay_ms: u64) -> Self {
        self.responses.insert(
            (customer.to_string(), model.map(ToString::to_string)),
            (
                Duration::from_millis(delay_ms),
                Err(LookupError::Http {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            ),
        );
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LookupService for ScriptedLookup {
    fn lookup<'a>(
        &'a self,
        query: &'a LookupQuery,
    ) -> BoxFuture<'a, Result<LookupResult, LookupError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = (query.customer.clone(), query.model.clone());
            let (delay, outcome) = self.responses.get(&key).cloned().unwrap_or((
                Duration::ZERO,
                Err(LookupError::Http {
                    status: 404,
                    body: String::new(),
                }),
            ));
            tokio::time::sleep(delay).await;
            outcome
        })
    }
}

fn session(lookup: ScriptedLookup) -> (Arc<ScriptedLookup>, FilterSession<ScriptedLookup>) {
    let lookup = Arc::new(lookup);
    let session = FilterSession::new(Arc::clone(&lookup), DateFilter::default(), TIMEOUT);
    (lookup, session)
}

#[tokio::test(start_paused = true)]
async fn slow_response_for_previous_customer_loses() {
    let (_, mut session) = session(
        ScriptedLookup::default()
            .respond("A", None, 500, &["A1"], &[])
            .respond("B", None, 10, &["B1", "B2"], &[]),
    );

    session.select_customer("A");
    session.select_customer("B");
    assert_eq!(session.in_flight(), 2);

    let (first, applied) = session.next_completion().await.unwrap();
    assert_eq!(applied, Applied::Applied);
    assert_eq!(first.field, DependentField::Model);

    let (_, applied) = session.next_completion().await.unwrap();
    assert_eq!(applied, Applied::Stale);
    assert!(session.next_completion().await.is_none());

    let view = session.view();
    assert_eq!(view.model.options.values(), vec!["", "B1", "B2"]);
    assert_eq!(view.selection.customer.as_deref(), Some("B"));
}

#[tokio::test(start_paused = true)]
async fn slow_station_list_for_previous_model_loses() {
    let (_, mut session) = session(
        ScriptedLookup::default()
            .respond("Acme", None, 0, &["X1", "X2"], &["S1", "S2", "S3"])
            .respond("Acme", Some("X1"), 300, &[], &["S1"])
            .respond("Acme", Some("X2"), 5, &[], &["S2", "S3"]),
    );

    session.select_customer("Acme");
    session.settle().await;
    session.select_model("X1");
    session.select_model("X2");
    session.settle().await;

    let view = session.view();
    assert_eq!(view.station.state, FieldState::Enabled);
    assert_eq!(view.station.options.values(), vec!["", "S2", "S3"]);
}

#[tokio::test(start_paused = true)]
async fn lookup_timeout_reenables_field() {
    let (_, mut session) =
        session(ScriptedLookup::default().respond("Acme", None, 30_000, &["X1"], &[]));

    session.select_customer("Acme");
    assert_eq!(session.view().model.state, FieldState::Loading);
    session.settle().await;

    let view = session.view();
    assert_eq!(view.model.state, FieldState::Enabled);
    assert_eq!(view.model.options.labels(), vec![FAILED_MODELS]);
}

#[tokio::test(start_paused = true)]
async fn failed_station_lookup_can_be_retriggered() {
    let (lookup, mut session) = session(
        ScriptedLookup::default()
            .respond("Acme", None, 0, &["X1"], &["S1"])
            .fail("Acme", Some("X1"), 0),
    );

    session.select_customer("Acme");
    session.settle().await;
    session.select_model("X1");
    session.settle().await;
    assert_eq!(session.view().station.options.labels(), vec![FAILED_STATIONS]);
    assert_eq!(session.view().station.state, FieldState::Enabled);

    session.select_model("X1");
    session.settle().await;
    assert_eq!(lookup.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn same_customer_twice_yields_same_options() {
    let (_, mut session) =
        session(ScriptedLookup::default().respond("Acme", None, 20, &["X1", "X2"], &[]));

    session.select_customer("Acme");
    session.settle().await;
    let first = session.view().model;

    session.select_customer("Acme");
    session.settle().await;
    assert_eq!(session.view().model, first);
}

#[tokio::test(start_paused = true)]
async fn initialize_replays_customer_model_and_station() {
    let (lookup, mut session) = session(
        ScriptedLookup::default()
            .respond("Acme", None, 50, &["X1"], &["S1", "S2"])
            .respond("Acme", Some("X1"), 50, &[], &["S1"]),
    );

    let page = PageQuery::from_url("/?customer=Acme&model=X1&station=S1");
    session.initialize_from_selection(&page.selection).await;

    let view = session.view();
    assert_eq!(view.model.options.values(), vec!["", "X1"]);
    assert_eq!(view.station.options.values(), vec!["", "S1"]);
    assert_eq!(view.station.state, FieldState::Enabled);
    assert_eq!(view.selection, Selection::new("Acme", "X1", "S1"));
    assert_eq!(lookup.calls(), 2);
    assert_eq!(session.submit_url(), "/?customer=Acme&model=X1&station=S1");
}

#[tokio::test(start_paused = true)]
async fn initialize_skips_model_no_longer_offered() {
    let (lookup, mut session) =
        session(ScriptedLookup::default().respond("Acme", None, 0, &["X2"], &["S1"]));

    session
        .initialize_from_selection(&Selection::new("Acme", "X1", ""))
        .await;

    let view = session.view();
    assert_eq!(view.model.options.values(), vec!["", "X2"]);
    assert_eq!(view.station.state, FieldState::Disabled);
    assert_eq!(view.selection.model, None);
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn initialize_without_customer_makes_no_calls() {
    let (lookup, mut session) = session(ScriptedLookup::default());

    session
        .initialize_from_selection(&Selection::default())
        .await;

    assert_eq!(session.view().model.state, FieldState::Disabled);
    assert_eq!(session.view().station.state, FieldState::Disabled);
    assert_eq!(session.in_flight(), 0);
    assert_eq!(lookup.calls(), 0);
}

/// Lookup whose backend call blows up instead of returning.
struct PanickingLookup;

impl LookupService for PanickingLookup {
    fn lookup<'a>(
        &'a self,
        query: &'a LookupQuery,
    ) -> BoxFuture<'a, Result<LookupResult, LookupError>> {
        Box::pin(async move { panic!("lookup backend crashed for {}", query.customer) })
    }
}

#[tokio::test]
async fn panicking_lookup_reports_failure_instead_of_hanging() {
    let mut session = FilterSession::new(Arc::new(PanickingLookup), DateFilter::default(), TIMEOUT);

    session.select_customer("Acme");
    let settled = tokio::time::timeout(Duration::from_secs(3), session.settle()).await;

    assert!(settled.is_ok());
    assert_eq!(session.in_flight(), 0);
    let view = session.view();
    assert_eq!(view.model.state, FieldState::Enabled);
    assert_eq!(view.model.options.labels(), vec![FAILED_MODELS]);
}
