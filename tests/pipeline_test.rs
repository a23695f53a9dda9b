mod common;

use common::{CallLog, Logged, UnavailableExecutor, UnavailableLedger, account, is_transaction_token, logged_steps};
use facepay::application::pipeline::TransactionPipeline;
use facepay::domain::account::AuthorizationRequest;
use facepay::domain::pipeline::{FailureKind, FailureReason, PipelineState, TerminalOutcome};
use facepay::domain::transaction::{PaymentMethod, TransactionStatus};
use facepay::error::PaymentError;
use facepay::infrastructure::in_memory::InMemoryLedger;
use facepay::infrastructure::simulated::SimulatedFraudDetector;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const CEILING: Decimal = dec!(999999.99);

fn request(identity: &str, amount: Decimal) -> AuthorizationRequest {
    AuthorizationRequest::new(identity, amount, PaymentMethod::FacePay, CEILING).unwrap()
}

async fn drain(mut rx: tokio::sync::broadcast::Receiver<PipelineState>) -> Vec<PipelineState> {
    let mut states = Vec::new();
    while let Ok(state) = rx.recv().await {
        states.push(state);
    }
    states
}

#[tokio::test]
async fn test_successful_payment_runs_every_step_in_order() {
    let log = CallLog::default();
    let ledger = InMemoryLedger::new();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        ledger.clone(),
    );
    let pipeline = TransactionPipeline::new(steps);
    let rx = pipeline.subscribe();

    let outcome = pipeline.authorize(request("John Doe", dec!(500))).await;

    let TerminalOutcome::Success { transaction_id, record, .. } = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(is_transaction_token(transaction_id.as_str()));
    assert_eq!(record.status, TransactionStatus::Completed);
    assert_eq!(record.amount.value(), dec!(500));
    assert_eq!(
        log.calls(),
        vec!["verify", "funds", "limits", "fraud", "execute", "record"]
    );
    assert_eq!(
        drain(rx).await,
        vec![
            PipelineState::Idle,
            PipelineState::VerifyingAccount,
            PipelineState::CheckingFunds,
            PipelineState::CheckingLimits,
            PipelineState::DetectingFraud,
            PipelineState::Executing,
            PipelineState::Succeeded,
        ]
    );
    assert_eq!(ledger.all_records().await.unwrap(), vec![record.clone()]);
}

#[tokio::test]
async fn test_insufficient_funds_stops_before_fraud_and_execution() {
    let log = CallLog::default();
    let ledger = InMemoryLedger::new();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(100), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        ledger.clone(),
    );
    let pipeline = TransactionPipeline::new(steps);
    let rx = pipeline.subscribe();

    let outcome = pipeline.authorize(request("John Doe", dec!(500))).await;

    assert_eq!(
        outcome,
        TerminalOutcome::Rejected {
            reason: FailureReason::insufficient_funds()
        }
    );
    assert_eq!(log.calls(), vec!["verify", "funds"]);
    assert!(ledger.all_records().await.unwrap().is_empty());

    let states = drain(rx).await;
    assert_eq!(
        states.last(),
        Some(&PipelineState::Failed(FailureReason::insufficient_funds()))
    );
    assert!(!states.contains(&PipelineState::DetectingFraud));
    assert!(!states.contains(&PipelineState::Executing));
}

#[tokio::test]
async fn test_daily_limit_exceeded() {
    let log = CallLog::default();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(10000), dec!(5000), dec!(4800))],
        SimulatedFraudDetector::always_clear(),
        InMemoryLedger::new(),
    );

    let outcome = TransactionPipeline::new(steps)
        .authorize(request("John Doe", dec!(500)))
        .await;

    match outcome {
        TerminalOutcome::Rejected { reason } => {
            assert_eq!(reason.message, "Daily limit exceeded");
            assert_eq!(reason.kind, FailureKind::DailyLimitExceeded);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(log.calls(), vec!["verify", "funds", "limits"]);
}

#[tokio::test]
async fn test_fraud_flag_never_reaches_execution() {
    let log = CallLog::default();
    let ledger = InMemoryLedger::new();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_flag(),
        ledger.clone(),
    );

    let outcome = TransactionPipeline::new(steps)
        .authorize(request("John Doe", dec!(50)))
        .await;

    assert_eq!(outcome.status(), TransactionStatus::FraudFlagged);
    match &outcome {
        TerminalOutcome::Rejected { reason } => {
            assert!(reason.message.starts_with("flagged: "));
            assert!(reason.kind.is_business_rejection());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(log.calls(), vec!["verify", "funds", "limits", "fraud"]);
    assert!(ledger.all_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_execution_fault_becomes_failed_state_without_ledger_entry() {
    let log = CallLog::default();
    let ledger = InMemoryLedger::new();
    let mut steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        ledger.clone(),
    );
    steps.executor = Arc::new(Logged::new("execute", &log, UnavailableExecutor));
    let pipeline = TransactionPipeline::new(steps);
    let rx = pipeline.subscribe();

    let outcome = pipeline.authorize(request("John Doe", dec!(50))).await;

    let TerminalOutcome::Rejected { reason } = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(reason.kind, FailureKind::InfrastructureFault);
    assert!(reason.message.contains("service unavailable"));
    assert!(!log.calls().contains(&"record"));
    assert!(ledger.all_records().await.unwrap().is_empty());

    let states = drain(rx).await;
    assert_eq!(states.iter().filter(|s| s.is_terminal()).count(), 1);
    assert!(matches!(states.last(), Some(PipelineState::Failed(_))));
}

#[tokio::test]
async fn test_ledger_fault_fails_the_attempt() {
    let log = CallLog::default();
    let mut steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        InMemoryLedger::new(),
    );
    steps.ledger = Arc::new(UnavailableLedger);

    let outcome = TransactionPipeline::new(steps)
        .authorize(request("John Doe", dec!(50)))
        .await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.status(), TransactionStatus::Failed);
}

#[tokio::test]
async fn test_unknown_customer_fails_verification() {
    let log = CallLog::default();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        InMemoryLedger::new(),
    );

    let outcome = TransactionPipeline::new(steps)
        .authorize(request("Emily Davis", dec!(50)))
        .await;

    match outcome {
        TerminalOutcome::Rejected { reason } => assert_eq!(reason.kind, FailureKind::AccountNotFound),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(log.calls(), vec!["verify"]);
}

#[test]
fn test_amounts_outside_bounds_never_build_a_request() {
    for amount in [dec!(0), dec!(-0.01), dec!(-500), dec!(1000000), dec!(999999.991)] {
        assert!(matches!(
            AuthorizationRequest::new("John Doe", amount, PaymentMethod::Card, CEILING),
            Err(PaymentError::ValidationError(_))
        ));
    }
    for amount in [dec!(0.01), dec!(0.001), dec!(1), dec!(500), CEILING] {
        assert!(AuthorizationRequest::new("John Doe", amount, PaymentMethod::Card, CEILING).is_ok());
    }
}

#[tokio::test]
async fn test_observer_on_another_task_sees_one_terminal_state() {
    let log = CallLog::default();
    let steps = logged_steps(
        &log,
        vec![account("John Doe", dec!(1000), dec!(5000), dec!(0))],
        SimulatedFraudDetector::always_clear(),
        InMemoryLedger::new(),
    );
    let pipeline = TransactionPipeline::new(steps);
    let observer = tokio::spawn(drain(pipeline.subscribe()));

    let outcome = pipeline.authorize(request("John Doe", dec!(10))).await;
    let states = observer.await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(states.iter().filter(|s| s.is_terminal()).count(), 1);
    assert_eq!(states.first(), Some(&PipelineState::Idle));
    assert_eq!(states.last(), Some(&PipelineState::Succeeded));
}

#[tokio::test]
async fn test_independent_pipelines_get_distinct_ids() {
    let log = CallLog::default();
    let ledger = InMemoryLedger::new();
    let steps = logged_steps(
        &log,
        vec![
            account("John Doe", dec!(1000), dec!(5000), dec!(0)),
            account("Jane Smith", dec!(1000), dec!(5000), dec!(0)),
        ],
        SimulatedFraudDetector::always_clear(),
        ledger.clone(),
    );

    let (a, b) = tokio::join!(
        TransactionPipeline::new(steps.clone()).authorize(request("John Doe", dec!(10))),
        TransactionPipeline::new(steps).authorize(request("Jane Smith", dec!(20))),
    );

    let (
        TerminalOutcome::Success { transaction_id: id_a, .. },
        TerminalOutcome::Success { transaction_id: id_b, .. },
    ) = (a, b)
    else {
        panic!("both payments should succeed");
    };
    assert_ne!(id_a, id_b);
    assert_eq!(ledger.all_records().await.unwrap().len(), 2);
}
