use crate::domain::pipeline::TerminalOutcome;
use crate::domain::transaction::{PaymentMethod, TransactionStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One line of the checkout report.
#[derive(Debug, Serialize, PartialEq)]
pub struct OutcomeRow {
    pub customer: String,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub transaction_id: String,
    pub reason: String,
}

impl OutcomeRow {
    pub fn from_outcome(customer: &str, amount: Decimal, method: PaymentMethod, outcome: &TerminalOutcome) -> Self {
        let (transaction_id, reason) = match outcome {
            TerminalOutcome::Success { transaction_id, .. } => (transaction_id.to_string(), String::new()),
            TerminalOutcome::Rejected { reason } => (String::new(), reason.message.clone()),
        };
        Self {
            customer: customer.to_string(),
            amount,
            method: method.to_string(),
            status: outcome.status().to_string(),
            transaction_id,
            reason,
        }
    }

    /// A checkout that never reached the pipeline, e.g. a failed scan.
    pub fn aborted(customer: &str, amount: Decimal, method: PaymentMethod, reason: impl Into<String>) -> Self {
        Self {
            customer: customer.to_string(),
            amount,
            method: method.to_string(),
            status: TransactionStatus::Failed.to_string(),
            transaction_id: String::new(),
            reason: reason.into(),
        }
    }
}

/// Writes the checkout report as CSV.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, row: &OutcomeRow) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
