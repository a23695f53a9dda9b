use crate::domain::transaction::{PaymentMethod, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Merchant constants printed on every receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    pub id: String,
    pub currency: String,
}

impl Default for Merchant {
    fn default() -> Self {
        Self {
            name: "FacePay Terminal".to_string(),
            id: "MERCHANT-001".to_string(),
            currency: "RM".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptContext {
    pub customer_name: String,
    pub merchant: Merchant,
}

/// Immutable proof of a completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub merchant_name: String,
    pub merchant_id: String,
    pub currency: String,
}

impl Receipt {
    pub fn subject(&self) -> String {
        format!("FacePay Transaction Receipt - {}", self.transaction_id)
    }

    /// Amount with currency, e.g. `RM 12.50`.
    pub fn formatted_amount(&self) -> String {
        format!("{} {:.2}", self.currency, self.amount)
    }
}
