use crate::domain::account::{Account, Amount};
use crate::domain::pipeline::{FailureReason, StepOutcome};
use crate::domain::ports::{FundsChecker, LimitChecker};
use crate::error::Result;
use async_trait::async_trait;

/// Passes when the account balance covers the amount.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalanceFundsChecker;

#[async_trait]
impl FundsChecker for BalanceFundsChecker {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        if account.covers(amount) {
            Ok(StepOutcome::Passed)
        } else {
            Ok(StepOutcome::Rejected(FailureReason::insufficient_funds()))
        }
    }
}

/// Passes when `daily_spent + amount <= daily_limit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DailyLimitChecker;

#[async_trait]
impl LimitChecker for DailyLimitChecker {
    async fn check(&self, account: &Account, amount: Amount) -> Result<StepOutcome> {
        if account.within_daily_limit(amount) {
            Ok(StepOutcome::Passed)
        } else {
            Ok(StepOutcome::Rejected(FailureReason::daily_limit_exceeded()))
        }
    }
}
