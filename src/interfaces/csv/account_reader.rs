use crate::domain::account::Account;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct AccountRow {
    id: String,
    customer: String,
    balance: Decimal,
    daily_limit: Decimal,
    daily_spent: Decimal,
}

/// Reads the account directory from a CSV source with an
/// `id, customer, balance, daily_limit, daily_spent` header.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Every row must hold a valid account; the first bad row fails the read.
    pub fn accounts(self) -> Result<Vec<Account>> {
        self.reader
            .into_deserialize::<AccountRow>()
            .map(|result| {
                let row = result.map_err(PaymentError::from)?;
                Account::new(row.id, row.customer, row.balance, row.daily_limit, row.daily_spent)
            })
            .collect()
    }
}

/// Accounts available when no directory file is supplied.
pub fn demo_accounts() -> Vec<Account> {
    use rust_decimal_macros::dec;

    let rows = [
        ("ACC-1001", "John Doe", dec!(2500.00), dec!(5000), dec!(150.00)),
        ("ACC-1002", "Jane Smith", dec!(80.00), dec!(5000), dec!(0)),
        ("ACC-1003", "Michael Johnson", dec!(10000.00), dec!(5000), dec!(4900.00)),
        ("ACC-1004", "Sarah Wilson", dec!(640.25), dec!(5000), dec!(320.00)),
        ("ACC-1005", "David Brown", dec!(7200.00), dec!(5000), dec!(0)),
        ("ACC-1006", "Emily Davis", dec!(1500.00), dec!(5000), dec!(999.99)),
    ];
    rows.into_iter()
        .map(|(id, name, balance, limit, spent)| Account {
            id: id.to_string(),
            customer_name: name.to_string(),
            balance,
            daily_limit: limit,
            daily_spent: spent,
        })
        .collect()
}
