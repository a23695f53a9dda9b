use crate::domain::account::Amount;
use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TRANSACTION_ID_PREFIX: &str = "TXN-";
const TRANSACTION_TOKEN_LEN: usize = 8;

/// Identifier of an executed payment, e.g. `TXN-4F9A2C1B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a fresh id from 8 random uppercase alphanumerics.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TRANSACTION_TOKEN_LEN)
            .map(|c| char::from(c).to_ascii_uppercase())
            .collect();
        Self(format!("{TRANSACTION_ID_PREFIX}{token}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PaymentMethod {
    FacePay,
    Card,
    Transfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::FacePay => "FacePay",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "face" | "facepay" => Ok(PaymentMethod::FacePay),
            "card" => Ok(PaymentMethod::Card),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(PaymentError::ValidationError(format!(
                "Unknown payment method '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    FraudFlagged,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::FraudFlagged => "fraudflagged",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    /// Set once the payment executor has produced an id.
    pub id: Option<TransactionId>,
    pub account_id: String,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    pub fn completed(
        id: TransactionId,
        account_id: impl Into<String>,
        amount: Amount,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: Some(id),
            account_id: account_id.into(),
            amount,
            timestamp: Utc::now(),
            method,
            status: TransactionStatus::Completed,
        }
    }
}
