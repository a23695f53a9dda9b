use crate::domain::transaction::PaymentMethod;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One payment attempt queued at the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAttempt {
    /// The customer standing at the terminal (or named on the card).
    pub customer: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
struct AttemptRow {
    customer: String,
    amount: Decimal,
    method: String,
}

impl TryFrom<AttemptRow> for PaymentAttempt {
    type Error = PaymentError;

    fn try_from(row: AttemptRow) -> Result<Self> {
        Ok(Self {
            customer: row.customer,
            amount: row.amount,
            method: row.method.parse()?,
        })
    }
}

/// Reads payment attempts from a CSV source with a `customer, amount, method` header.
///
/// Whitespace around fields is trimmed; a malformed row yields an error for
/// that row only.
pub struct AttemptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AttemptReader<R> {
    /// Creates a new `AttemptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes attempts.
    pub fn attempts(self) -> impl Iterator<Item = Result<PaymentAttempt>> {
        self.reader.into_deserialize::<AttemptRow>().map(|result| {
            result
                .map_err(PaymentError::from)
                .and_then(PaymentAttempt::try_from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "customer, amount, method\nJohn Doe, 12.50, face\nJane Smith, 3, card";
        let reader = AttemptReader::new(data.as_bytes());
        let results: Vec<Result<PaymentAttempt>> = reader.attempts().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.customer, "John Doe");
        assert_eq!(first.amount, dec!(12.50));
        assert_eq!(first.method, PaymentMethod::FacePay);
        assert_eq!(results[1].as_ref().unwrap().method, PaymentMethod::Card);
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = "customer, amount, method\nJohn Doe, lots, face\nJohn Doe, 1.0, cash\nJohn Doe, 1.0, card";
        let reader = AttemptReader::new(data.as_bytes());
        let results: Vec<Result<PaymentAttempt>> = reader.attempts().collect();

        assert!(matches!(results[0], Err(PaymentError::CsvError(_))));
        assert!(matches!(results[1], Err(PaymentError::ValidationError(_))));
        assert!(results[2].is_ok());
    }
}
