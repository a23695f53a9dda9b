use crate::domain::receipt::{Merchant, Receipt, ReceiptContext};
use crate::domain::transaction::{TransactionId, TransactionRecord, TransactionStatus};
use crate::error::{PaymentError, Result};

/// Builds receipts for completed transactions.
#[derive(Debug, Clone, Default)]
pub struct ReceiptBuilder {
    merchant: Merchant,
}

impl ReceiptBuilder {
    pub fn new(merchant: Merchant) -> Self {
        Self { merchant }
    }

    /// Maps a completed record to a receipt, generating an id if it has none.
    ///
    /// Only `Completed` records qualify.
    pub fn build(&self, record: &TransactionRecord, context: &ReceiptContext) -> Result<Receipt> {
        if record.status != TransactionStatus::Completed {
            return Err(PaymentError::ValidationError(format!(
                "Receipts are only issued for completed transactions, got {}",
                record.status
            )));
        }

        let merchant = &context.merchant;
        Ok(Receipt {
            transaction_id: record.id.clone().unwrap_or_else(TransactionId::generate),
            customer_name: context.customer_name.clone(),
            payment_method: record.method,
            amount: record.amount.value(),
            timestamp: record.timestamp,
            merchant_name: merchant.name.clone(),
            merchant_id: merchant.id.clone(),
            currency: merchant.currency.clone(),
        })
    }

    /// Context for `customer_name` with this builder's merchant.
    pub fn context_for(&self, customer_name: impl Into<String>) -> ReceiptContext {
        ReceiptContext {
            customer_name: customer_name.into(),
            merchant: self.merchant.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Amount;
    use crate::domain::transaction::PaymentMethod;
    use rust_decimal_macros::dec;

    fn completed() -> TransactionRecord {
        TransactionRecord::completed(
            TransactionId::from("TXN-ABCD1234".to_string()),
            "ACC-1",
            Amount::new(dec!(12.5)).unwrap(),
            PaymentMethod::FacePay,
        )
    }

    #[test]
    fn test_build_keeps_record_id() {
        let builder = ReceiptBuilder::default();
        let receipt = builder
            .build(&completed(), &builder.context_for("John Doe"))
            .unwrap();

        assert_eq!(receipt.transaction_id.as_str(), "TXN-ABCD1234");
        assert_eq!(receipt.customer_name, "John Doe");
        assert_eq!(receipt.merchant_id, "MERCHANT-001");
        assert_eq!(receipt.formatted_amount(), "RM 12.50");
        assert_eq!(receipt.subject(), "FacePay Transaction Receipt - TXN-ABCD1234");
    }

    #[test]
    fn test_build_generates_missing_id() {
        let builder = ReceiptBuilder::default();
        let mut record = completed();
        record.id = None;

        let receipt = builder.build(&record, &builder.context_for("Jane Smith")).unwrap();
        let token = receipt.transaction_id.as_str().strip_prefix("TXN-").unwrap();
        assert_eq!(token.len(), 8);
    }

    #[test]
    fn test_build_requires_completed_record() {
        let builder = ReceiptBuilder::default();
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Failed,
            TransactionStatus::FraudFlagged,
        ] {
            let mut record = completed();
            record.status = status;
            assert!(matches!(
                builder.build(&record, &builder.context_for("John Doe")),
                Err(PaymentError::ValidationError(_))
            ));
        }
    }
}
