//! Demo collaborators for running the terminal without a bank or a camera.
//!
//! Random outcomes here are stand-ins with seedable generators, not policy.

use crate::domain::account::{Account, Amount};
use crate::domain::acquisition::AcquisitionSample;
use crate::domain::pipeline::{FailureReason, StepOutcome};
use crate::domain::ports::{
    AccountVerifier, FraudDetector, FundsChecker, IdentityResolver, LedgerRecorder, LimitChecker,
    PaymentExecutor, PresenceSource, ReceiptNotifier,
};
use crate::domain::receipt::Receipt;
use crate::domain::transaction::{TransactionId, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

const HIGH_RISK_MESSAGE: &str = "High risk transaction detected";

fn seeded(seed: Option<u64>) -> Mutex<StdRng> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Mutex::new(rng)
}

/// Flags a fixed share of transactions at random.
pub struct SimulatedFraudDetector {
    flag_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedFraudDetector {
    /// `flag_rate` is clamped to [0, 1].
    pub fn new(flag_rate: f64, seed: Option<u64>) -> Self {
        Self {
            flag_rate: flag_rate.clamp(0.0, 1.0),
            rng: seeded(seed),
        }
    }

    pub fn always_clear() -> Self {
        Self::new(0.0, Some(0))
    }

    pub fn always_flag() -> Self {
        Self::new(1.0, Some(0))
    }
}

#[async_trait]
impl FraudDetector for SimulatedFraudDetector {
    async fn evaluate(&self, _account: &Account, _amount: Amount) -> Result<StepOutcome> {
        let roll: f64 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .r#gen();
        if roll < self.flag_rate {
            Ok(StepOutcome::Rejected(FailureReason::fraud_flagged(HIGH_RISK_MESSAGE)))
        } else {
            Ok(StepOutcome::Passed)
        }
    }
}

/// Executes every payment locally and hands out a fresh transaction id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedPaymentExecutor;

#[async_trait]
impl PaymentExecutor for SimulatedPaymentExecutor {
    async fn execute(&self, _account: &Account, _amount: Amount) -> Result<TransactionId> {
        Ok(TransactionId::generate())
    }
}

/// Delays every call to the wrapped step, imitating network round trips.
pub struct WithLatency<T> {
    inner: T,
    delay: Duration,
}

impl<T> WithLatency<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl<T: AccountVerifier> AccountVerifier for WithLatency<T> {
    async fn verify(&self, identity: &str) -> Result<Account> {
        self.pause().await;
        self.inner.verify(identity).await
    }
}

#[async_trait]
impl<T: FundsChecker> FundsChecker for WithLatency<T> {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.pause().await;
        self.inner.check(account, amount).await
    }
}

#[async_trait]
impl<T: LimitChecker> LimitChecker for WithLatency<T> {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.pause().await;
        self.inner.check(account, amount).await
    }
}

#[async_trait]
impl<T: FraudDetector> FraudDetector for WithLatency<T> {
    async fn evaluate(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.pause().await;
        self.inner.evaluate(account, amount).await
    }
}

#[async_trait]
impl<T: PaymentExecutor> PaymentExecutor for WithLatency<T> {
    async fn execute(&self, account: &Account, amount: Amount) -> Result<TransactionId> {
        self.pause().await;
        self.inner.execute(account, amount).await
    }
}

#[async_trait]
impl<T: LedgerRecorder> LedgerRecorder for WithLatency<T> {
    async fn record(&self, record: &TransactionRecord) -> Result<()> {
        self.pause().await;
        self.inner.record(record).await
    }
}

/// Replays a fixed list of confidences, repeating the last one forever.
pub struct ScriptedPresenceSource {
    confidences: Vec<f64>,
    calls: AtomicUsize,
}

impl ScriptedPresenceSource {
    pub fn new(confidences: Vec<f64>) -> Self {
        Self {
            confidences,
            calls: AtomicUsize::new(0),
        }
    }

    /// A subject standing still in front of the camera.
    pub fn steady(confidence: f64) -> Self {
        Self::new(vec![confidence])
    }

    /// How many samples have been taken so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresenceSource for ScriptedPresenceSource {
    async fn sample(&self) -> Result<AcquisitionSample> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let confidence = self
            .confidences
            .get(index)
            .or_else(|| self.confidences.last())
            .copied()
            .ok_or_else(|| PaymentError::AcquisitionFault("No presence frames available".to_string()))?;
        Ok(AcquisitionSample::now(confidence))
    }
}

/// Confidence drawn uniformly from `mean ± jitter`.
pub struct NoisyPresenceSource {
    mean: f64,
    jitter: f64,
    rng: Mutex<StdRng>,
}

impl NoisyPresenceSource {
    pub fn new(mean: f64, jitter: f64, seed: Option<u64>) -> Self {
        Self {
            mean,
            jitter: jitter.abs(),
            rng: seeded(seed),
        }
    }
}

#[async_trait]
impl PresenceSource for NoisyPresenceSource {
    async fn sample(&self) -> Result<AcquisitionSample> {
        let offset = if self.jitter > 0.0 {
            self.rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        Ok(AcquisitionSample::now(self.mean + offset))
    }
}

/// Resolves every scan to the same customer.
#[derive(Debug, Clone)]
pub struct StaticIdentityResolver {
    identity: String,
}

impl StaticIdentityResolver {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self) -> Result<String> {
        Ok(self.identity.clone())
    }
}

/// Writes receipts to the log instead of a mail server.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl ReceiptNotifier for LogNotifier {
    async fn send(&self, receipt: &Receipt, destination: &str) -> Result<()> {
        super::validate_destination(destination)?;
        let body = serde_json::to_string(receipt)
            .map_err(|e| PaymentError::NotificationError(e.to_string()))?;
        info!(to = destination, subject = %receipt.subject(), %body, "Receipt sent");
        Ok(())
    }
}
