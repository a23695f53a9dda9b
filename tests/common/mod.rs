#![allow(dead_code)]

use async_trait::async_trait;
use facepay::application::pipeline::PipelineSteps;
use facepay::domain::account::{Account, Amount};
use facepay::domain::pipeline::StepOutcome;
use facepay::domain::ports::{
    AccountVerifier, FraudDetector, FundsChecker, IdentityResolver, LedgerRecorder, LimitChecker,
    PaymentExecutor,
};
use facepay::domain::transaction::{TransactionId, TransactionRecord};
use facepay::error::{PaymentError, Result};
use facepay::infrastructure::in_memory::{InMemoryAccountDirectory, InMemoryLedger};
use facepay::infrastructure::rules::{BalanceFundsChecker, DailyLimitChecker};
use facepay::infrastructure::simulated::{SimulatedFraudDetector, SimulatedPaymentExecutor};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// Order in which pipeline steps were invoked.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, step: &'static str) {
        self.0.lock().unwrap().push(step);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// Logs every call before delegating to the wrapped step.
pub struct Logged<T> {
    name: &'static str,
    log: CallLog,
    inner: T,
}

impl<T> Logged<T> {
    pub fn new(name: &'static str, log: &CallLog, inner: T) -> Self {
        Self {
            name,
            log: log.clone(),
            inner,
        }
    }
}

#[async_trait]
impl<T: AccountVerifier> AccountVerifier for Logged<T> {
    async fn verify(&self, identity: &str) -> Result<Account> {
        self.log.push(self.name);
        self.inner.verify(identity).await
    }
}

#[async_trait]
impl<T: FundsChecker> FundsChecker for Logged<T> {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.log.push(self.name);
        self.inner.check(account, amount).await
    }
}

#[async_trait]
impl<T: LimitChecker> LimitChecker for Logged<T> {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.log.push(self.name);
        self.inner.check(account, amount).await
    }
}

#[async_trait]
impl<T: FraudDetector> FraudDetector for Logged<T> {
    async fn evaluate(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        self.log.push(self.name);
        self.inner.evaluate(account, amount).await
    }
}

#[async_trait]
impl<T: PaymentExecutor> PaymentExecutor for Logged<T> {
    async fn execute(&self, account: &Account, amount: Amount) -> Result<TransactionId> {
        self.log.push(self.name);
        self.inner.execute(account, amount).await
    }
}

#[async_trait]
impl<T: LedgerRecorder> LedgerRecorder for Logged<T> {
    async fn record(&self, record: &TransactionRecord) -> Result<()> {
        self.log.push(self.name);
        self.inner.record(record).await
    }
}

/// A payment gateway that is down.
pub struct UnavailableExecutor;

#[async_trait]
impl PaymentExecutor for UnavailableExecutor {
    async fn execute(&self, _account: &Account, _amount: Amount) -> Result<TransactionId> {
        Err(PaymentError::ExecutionFault("service unavailable".to_string()))
    }
}

/// A ledger whose storage is down.
pub struct UnavailableLedger;

#[async_trait]
impl LedgerRecorder for UnavailableLedger {
    async fn record(&self, _record: &TransactionRecord) -> Result<()> {
        Err(PaymentError::ExecutionFault("ledger unavailable".to_string()))
    }
}

pub struct UnavailableResolver;

#[async_trait]
impl IdentityResolver for UnavailableResolver {
    async fn resolve(&self) -> Result<String> {
        Err(PaymentError::AcquisitionFault("matcher offline".to_string()))
    }
}

pub fn account(name: &str, balance: Decimal, daily_limit: Decimal, daily_spent: Decimal) -> Account {
    Account::new("ACC-1001", name, balance, daily_limit, daily_spent).unwrap()
}

/// Real rules behind call logging, with a chosen fraud detector.
pub fn logged_steps(
    log: &CallLog,
    accounts: Vec<Account>,
    fraud: SimulatedFraudDetector,
    ledger: InMemoryLedger,
) -> PipelineSteps {
    PipelineSteps {
        verifier: Arc::new(Logged::new(
            "verify",
            log,
            InMemoryAccountDirectory::with_accounts(accounts),
        )),
        funds: Arc::new(Logged::new("funds", log, BalanceFundsChecker)),
        limits: Arc::new(Logged::new("limits", log, DailyLimitChecker)),
        fraud: Arc::new(Logged::new("fraud", log, fraud)),
        executor: Arc::new(Logged::new("execute", log, SimulatedPaymentExecutor)),
        ledger: Arc::new(Logged::new("record", log, ledger)),
    }
}

/// Whether `id` looks like `TXN-` followed by 8 uppercase alphanumerics.
pub fn is_transaction_token(id: &str) -> bool {
    id.strip_prefix("TXN-").is_some_and(|token| {
        token.len() == 8 && token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    })
}
