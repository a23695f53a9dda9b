use crate::domain::account::{Account, AuthorizationRequest};
use crate::domain::pipeline::{FailureReason, PipelineState, StepOutcome, TerminalOutcome};
use crate::domain::ports::{
    AccountVerifierRef, FraudDetectorRef, FundsCheckerRef, LedgerRecorderRef, LimitCheckerRef,
    PaymentExecutorRef,
};
use crate::domain::transaction::{TransactionId, TransactionRecord};
use crate::error::Result;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Every state of a run fits in the buffer, so subscribers never lag.
const STATE_CHANNEL_CAPACITY: usize = 16;

/// The step executors a pipeline runs, in the order they are invoked.
///
/// Cheap to clone; a terminal keeps one set and hands a clone to every new
/// pipeline.
#[derive(Clone)]
pub struct PipelineSteps {
    pub verifier: AccountVerifierRef,
    pub funds: FundsCheckerRef,
    pub limits: LimitCheckerRef,
    pub fraud: FraudDetectorRef,
    pub executor: PaymentExecutorRef,
    pub ledger: LedgerRecorderRef,
}

enum Run {
    Completed {
        transaction_id: TransactionId,
        record: TransactionRecord,
        account: Account,
    },
    Rejected(FailureReason),
}

/// Runs one authorization attempt through the verification steps.
///
/// A pipeline is single-use: `authorize` consumes it, and the state stream
/// closes right after the terminal state is published.
pub struct TransactionPipeline {
    steps: PipelineSteps,
    state: PipelineState,
    state_tx: broadcast::Sender<PipelineState>,
}

impl TransactionPipeline {
    pub fn new(steps: PipelineSteps) -> Self {
        let (state_tx, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            steps,
            state: PipelineState::Idle,
            state_tx,
        }
    }

    /// Subscribes to state changes. Only states published after this call
    /// are delivered; a subscriber attached before `authorize` sees `Idle`
    /// first and the terminal state last.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Runs every step in order and returns the single terminal outcome.
    ///
    /// Business rejections and infrastructure faults both end the run in
    /// `Failed`; no step after the failing one is invoked.
    pub async fn authorize(mut self, request: AuthorizationRequest) -> TerminalOutcome {
        let _ = self.state_tx.send(self.state.clone());
        info!(
            identity = %request.identity,
            amount = %request.amount,
            method = %request.method,
            "Starting authorization"
        );

        match self.run(&request).await {
            Ok(Run::Completed {
                transaction_id,
                record,
                account,
            }) => {
                self.transition(PipelineState::Succeeded);
                info!(transaction_id = %transaction_id, "Payment authorized");
                TerminalOutcome::Success {
                    transaction_id,
                    record,
                    customer_name: account.customer_name,
                }
            }
            Ok(Run::Rejected(reason)) => self.fail(reason),
            Err(e) => self.fail(FailureReason::from(e)),
        }
    }

    async fn run(&mut self, request: &AuthorizationRequest) -> Result<Run> {
        let amount = request.amount;

        self.transition(PipelineState::VerifyingAccount);
        let account = self.steps.verifier.verify(&request.identity).await?;

        self.transition(PipelineState::CheckingFunds);
        if let StepOutcome::Rejected(reason) = self.steps.funds.check(&account, amount).await? {
            return Ok(Run::Rejected(reason));
        }

        self.transition(PipelineState::CheckingLimits);
        if let StepOutcome::Rejected(reason) = self.steps.limits.check(&account, amount).await? {
            return Ok(Run::Rejected(reason));
        }

        self.transition(PipelineState::DetectingFraud);
        if let StepOutcome::Rejected(reason) = self.steps.fraud.evaluate(&account, amount).await? {
            return Ok(Run::Rejected(reason));
        }

        self.transition(PipelineState::Executing);
        let transaction_id = self.steps.executor.execute(&account, amount).await?;
        let record =
            TransactionRecord::completed(transaction_id.clone(), &account.id, amount, request.method);
        self.steps.ledger.record(&record).await?;

        Ok(Run::Completed {
            transaction_id,
            record,
            account,
        })
    }

    fn fail(&mut self, reason: FailureReason) -> TerminalOutcome {
        warn!(kind = ?reason.kind, reason = %reason, "Authorization failed");
        self.transition(PipelineState::Failed(reason.clone()));
        TerminalOutcome::Rejected { reason }
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.is_terminal() {
            return;
        }
        debug!(from = ?self.state, to = ?next, step = next.description(), "Pipeline transition");
        self.state = next.clone();
        // No subscribers is fine.
        let _ = self.state_tx.send(next);
    }
}
