use super::account::{Account, Amount};
use super::acquisition::AcquisitionSample;
use super::pipeline::StepOutcome;
use super::receipt::Receipt;
use super::transaction::{TransactionId, TransactionRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait AccountVerifier: Send + Sync {
    /// Looks up the account owned by `identity`, failing with `AccountNotFound`.
    async fn verify(&self, identity: &str) -> Result<Account>;
}

#[async_trait]
pub trait FundsChecker: Send + Sync {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome>;
}

#[async_trait]
pub trait LimitChecker: Send + Sync {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome>;
}

#[async_trait]
pub trait FraudDetector: Send + Sync {
    async fn evaluate(&self, account: &Account, amount: Amount) -> Result<StepOutcome>;
}

#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn execute(&self, account: &Account, amount: Amount) -> Result<TransactionId>;
}

#[async_trait]
pub trait LedgerRecorder: Send + Sync {
    async fn record(&self, record: &TransactionRecord) -> Result<()>;
}

/// Produces one presence-confidence sample per tick.
#[async_trait]
pub trait PresenceSource: Send + Sync {
    async fn sample(&self) -> Result<AcquisitionSample>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// Paces the acquisition loop.
///
/// `tick` returns `false` once the schedule is exhausted, which ends the loop.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self) -> bool;
}

#[async_trait]
pub trait ReceiptNotifier: Send + Sync {
    async fn send(&self, receipt: &Receipt, destination: &str) -> Result<()>;
}

pub type AccountVerifierRef = Arc<dyn AccountVerifier>;
pub type FundsCheckerRef = Arc<dyn FundsChecker>;
pub type LimitCheckerRef = Arc<dyn LimitChecker>;
pub type FraudDetectorRef = Arc<dyn FraudDetector>;
pub type PaymentExecutorRef = Arc<dyn PaymentExecutor>;
pub type LedgerRecorderRef = Arc<dyn LedgerRecorder>;
pub type PresenceSourceRef = Arc<dyn PresenceSource>;
pub type IdentityResolverRef = Arc<dyn IdentityResolver>;
pub type ReceiptNotifierRef = Arc<dyn ReceiptNotifier>;

pub type TickerBox = Box<dyn Ticker>;
/// Builds a fresh ticker for every scan session.
pub type TickerFactory = Box<dyn Fn() -> TickerBox + Send + Sync>;
