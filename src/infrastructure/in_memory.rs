use crate::domain::account::Account;
use crate::domain::ports::{AccountVerifier, LedgerRecorder, ReceiptNotifier};
use crate::domain::receipt::Receipt;
use crate::domain::transaction::{TransactionId, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A thread-safe in-memory directory of customer accounts, keyed by the
/// customer name an identity resolves to.
///
/// This is the lookup stub standing in for a bank's account service.
#[derive(Default, Clone)]
pub struct InMemoryAccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.customer_name.clone(), account))
            .collect();
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }

    pub async fn insert(&self, account: Account) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.customer_name.clone(), account);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountVerifier for InMemoryAccountDirectory {
    async fn verify(&self, identity: &str) -> Result<Account> {
        let accounts = self.accounts.read().await;
        accounts
            .get(identity)
            .cloned()
            .ok_or_else(|| PaymentError::AccountNotFound(identity.to_string()))
    }
}

/// A thread-safe in-memory ledger of executed payments.
///
/// Records only ever arrive after every verification step has passed.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<HashMap<TransactionId, TransactionRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &TransactionId) -> Result<Option<TransactionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    pub async fn all_records(&self) -> Result<Vec<TransactionRecord>> {
        let records = self.records.read().await;
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by_key(|record| record.timestamp);
        Ok(all)
    }
}

#[async_trait]
impl LedgerRecorder for InMemoryLedger {
    async fn record(&self, record: &TransactionRecord) -> Result<()> {
        let id = record.id.clone().ok_or_else(|| {
            PaymentError::ExecutionFault("Cannot record a transaction without an id".to_string())
        })?;
        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            return Err(PaymentError::ExecutionFault(format!(
                "Transaction {id} already recorded"
            )));
        }
        debug!(transaction_id = %id, "Transaction record saved");
        records.insert(id, record.clone());
        Ok(())
    }
}

/// Keeps every receipt sent, with its destination.
#[derive(Default, Clone)]
pub struct InMemoryOutbox {
    sent: Arc<RwLock<Vec<(String, Receipt)>>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, Receipt)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl ReceiptNotifier for InMemoryOutbox {
    async fn send(&self, receipt: &Receipt, destination: &str) -> Result<()> {
        super::validate_destination(destination)?;
        let mut sent = self.sent.write().await;
        sent.push((destination.to_string(), receipt.clone()));
        Ok(())
    }
}
