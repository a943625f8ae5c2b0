//! End-to-end tests for the candle creation flow.

use std::sync::Arc;
use std::time::Duration;

use candle_client::backend::mock::{FailureMode, MockBackend};
use candle_client::{CandlesClient, FlowState, Position, SubmitOutcome};
use taxonomy::{EmotionTaxonomy, MainEmotion};

fn grief_taxonomy() -> EmotionTaxonomy {
    EmotionTaxonomy::new(vec![MainEmotion::new(
        "sad",
        [("grief-cluster", ["lonely", "sorrow"])],
    )])
    .unwrap()
}

async fn client_over(backend: Arc<MockBackend>) -> CandlesClient {
    let client = CandlesClient::new(backend).with_taxonomy(grief_taxonomy());
    client.initialize(None).await.unwrap();
    client
}

#[tokio::test]
async fn full_flow_issues_exactly_one_create_call() {
    let backend = Arc::new(MockBackend::default());
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("lonely").unwrap();
    assert_eq!(flow.state(), &FlowState::Placing);

    flow.place(Position::new(38.9072, -77.0369).unwrap()).unwrap();
    flow.advance_hold(Duration::from_millis(2500)).unwrap();

    let outcome = flow.submit(&session).await.unwrap();
    let SubmitOutcome::Created { candle, tally } = outcome else {
        panic!("expected creation");
    };

    assert_eq!(backend.create_calls(), 1);
    assert_eq!(candle.emotion.as_deref(), Some("lonely"));
    assert_eq!(tally, 1);
    assert_eq!(flow.state(), &FlowState::Succeeded { tally: 1 });
    assert_eq!(client.candle_count(), 1);

    flow.acknowledge().unwrap();
    assert_eq!(flow.state(), &FlowState::Idle);
}

#[tokio::test]
async fn tally_counts_same_emotion_candles() {
    let backend = Arc::new(MockBackend::default());
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    // Two candles with the same leaf already on the map.
    for _ in 0..2 {
        let mut flow = client.new_flow();
        flow.begin().unwrap();
        flow.select_main("sad").unwrap();
        flow.select_mid("grief-cluster").unwrap();
        flow.select_leaf("lonely").unwrap();
        flow.place(Position::new(0.0, 0.0).unwrap()).unwrap();
        flow.advance_hold(Duration::from_millis(2500)).unwrap();
        flow.submit(&session).await.unwrap();
    }

    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("lonely").unwrap();
    flow.place(Position::new(1.0, 1.0).unwrap()).unwrap();
    flow.advance_hold(Duration::from_millis(2500)).unwrap();

    let outcome = flow.submit(&session).await.unwrap();
    let SubmitOutcome::Created { tally, .. } = outcome else {
        panic!("expected creation");
    };
    assert_eq!(tally, 3);
}

#[tokio::test]
async fn cancelling_before_submit_issues_no_create_calls() {
    let backend = Arc::new(MockBackend::default());
    let client = client_over(backend.clone()).await;

    // Cancel at each pre-submission step.
    for steps in 0..5 {
        let mut flow = client.new_flow();
        flow.begin().unwrap();
        if steps > 0 {
            flow.select_main("sad").unwrap();
        }
        if steps > 1 {
            flow.select_mid("grief-cluster").unwrap();
        }
        if steps > 2 {
            flow.select_leaf("lonely").unwrap();
        }
        if steps > 3 {
            flow.place(Position::new(0.0, 0.0).unwrap()).unwrap();
            flow.advance_hold(Duration::from_millis(1000)).unwrap();
        }
        flow.cancel();
        assert_eq!(flow.state(), &FlowState::Idle);
        assert!(flow.draft().is_none());
    }

    assert_eq!(backend.create_calls(), 0);
    assert_eq!(client.candle_count(), 0);
}

#[tokio::test]
async fn rate_limited_submit_keeps_draft_and_logs_rejection() {
    let backend = Arc::new(MockBackend::default().with_create_failure(FailureMode::RateLimited));
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    let position = Position::new(52.52, 13.405).unwrap();
    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("lonely").unwrap();
    flow.place(position).unwrap();
    flow.advance_hold(Duration::from_millis(2500)).unwrap();

    let outcome = flow.submit(&session).await.unwrap();
    let SubmitOutcome::Rejected {
        rate_limited,
        message,
    } = outcome
    else {
        panic!("expected rejection");
    };
    assert!(rate_limited);
    assert!(!message.is_empty());

    // Retry-ready, not idle; draft position and emotion intact.
    assert_eq!(flow.state(), &FlowState::Rejected);
    let draft = flow.draft().unwrap();
    assert_eq!(draft.emotion(), Some("lonely"));
    assert_eq!(draft.position, Some(position));
    assert!(flow.last_rejection().is_some());
    assert_eq!(client.candle_count(), 0);

    // The side-channel log call fired with the same emotion and position.
    flow.side_channel().flush().await;
    let reports = backend.rejection_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].emotion.as_deref(), Some("lonely"));
    assert_eq!(reports[0].position, Some(position));

    // Retry succeeds once the throttle clears, without repeating the hold.
    backend.set_create_failure(FailureMode::None);
    let outcome = flow.retry(&session).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Created { .. }));
    assert_eq!(backend.create_calls(), 2);
    assert_eq!(client.candle_count(), 1);
}

#[tokio::test]
async fn generic_failure_is_not_reported_to_the_side_channel() {
    let backend = Arc::new(MockBackend::default().with_create_failure(FailureMode::RequestFailed));
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("sorrow").unwrap();
    flow.place(Position::new(0.0, 0.0).unwrap()).unwrap();
    flow.advance_hold(Duration::from_millis(2500)).unwrap();

    let outcome = flow.submit(&session).await.unwrap();
    let SubmitOutcome::Rejected { rate_limited, .. } = outcome else {
        panic!("expected rejection");
    };
    assert!(!rate_limited);

    flow.side_channel().flush().await;
    assert_eq!(backend.log_calls(), 0);
    assert!(backend.rejection_reports().is_empty());
}

#[tokio::test]
async fn failed_rejection_log_never_disturbs_the_flow() {
    let backend = Arc::new(
        MockBackend::default()
            .with_create_failure(FailureMode::RateLimited)
            .with_log_failure(true),
    );
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("lonely").unwrap();
    flow.place(Position::new(0.0, 0.0).unwrap()).unwrap();
    flow.advance_hold(Duration::from_millis(2500)).unwrap();

    let outcome = flow.submit(&session).await.unwrap();
    assert!(matches!(
        outcome,
        SubmitOutcome::Rejected {
            rate_limited: true,
            ..
        }
    ));
    assert_eq!(flow.state(), &FlowState::Rejected);

    // The log failure is swallowed and only observable via counters.
    flow.side_channel().flush().await;
    let stats = client.side_channel_stats();
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.delivered, 0);
}

#[tokio::test]
async fn hold_abort_resets_progress_without_side_effects() {
    let backend = Arc::new(MockBackend::default());
    let client = client_over(backend.clone()).await;
    let session = client.ensure_session().await.unwrap();

    let mut flow = client.new_flow();
    flow.begin().unwrap();
    flow.select_main("sad").unwrap();
    flow.select_mid("grief-cluster").unwrap();
    flow.select_leaf("lonely").unwrap();
    flow.place(Position::new(0.0, 0.0).unwrap()).unwrap();

    flow.advance_hold(Duration::from_millis(2000)).unwrap();
    assert!(flow.hold_fraction() > 0.7);
    flow.release_hold();
    assert_eq!(flow.hold_fraction(), 0.0);

    // Still gated after the abort.
    assert!(flow.submit(&session).await.is_err());
    assert_eq!(backend.create_calls(), 0);

    // A fresh complete hold goes through.
    flow.advance_hold(Duration::from_millis(2500)).unwrap();
    assert!(matches!(
        flow.submit(&session).await.unwrap(),
        SubmitOutcome::Created { .. }
    ));
}
