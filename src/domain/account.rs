use crate::domain::transaction::PaymentMethod;
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a positive monetary amount for a payment.
///
/// This is a wrapper around `rust_decimal::Decimal` that can only hold values
/// strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A customer's account as reported by the account verifier.
///
/// Accounts are looked up fresh for every authorization attempt and are never
/// mutated by the terminal.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    /// The account identifier, e.g. `ACC-1024`.
    pub id: String,
    /// Name of the customer owning the account.
    pub customer_name: String,
    /// Funds currently available.
    pub balance: Decimal,
    /// Maximum amount the customer may spend per day.
    pub daily_limit: Decimal,
    /// Amount already spent today.
    pub daily_spent: Decimal,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        balance: Decimal,
        daily_limit: Decimal,
        daily_spent: Decimal,
    ) -> Result<Self, PaymentError> {
        let id = id.into();
        if balance < Decimal::ZERO || daily_limit < Decimal::ZERO || daily_spent < Decimal::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "Account {id} has negative figures"
            )));
        }
        if daily_spent > daily_limit {
            return Err(PaymentError::ValidationError(format!(
                "Account {id} has spent {daily_spent} over its daily limit of {daily_limit}"
            )));
        }
        Ok(Self {
            id,
            customer_name: customer_name.into(),
            balance,
            daily_limit,
            daily_spent,
        })
    }

    /// Whether the balance can pay for `amount`.
    pub fn covers(&self, amount: Amount) -> bool {
        self.balance >= amount.value()
    }

    /// Whether spending `amount` keeps the account within its daily limit.
    pub fn within_daily_limit(&self, amount: Amount) -> bool {
        self.daily_spent + amount.value() <= self.daily_limit
    }
}

/// A validated request to authorize a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub identity: String,
    pub amount: Amount,
    pub method: PaymentMethod,
}

impl AuthorizationRequest {
    /// Validates `0 < amount <= ceiling` and a non-empty identity.
    ///
    /// Failing requests never reach a pipeline.
    pub fn new(
        identity: impl Into<String>,
        amount: Decimal,
        method: PaymentMethod,
        ceiling: Decimal,
    ) -> Result<Self, PaymentError> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Customer identity is required".to_string(),
            ));
        }
        let amount = Amount::new(amount)?;
        if amount.value() > ceiling {
            return Err(PaymentError::ValidationError(format!(
                "Amount {} exceeds the maximum of {}",
                amount, ceiling
            )));
        }
        Ok(Self {
            identity,
            amount,
            method,
        })
    }
}
