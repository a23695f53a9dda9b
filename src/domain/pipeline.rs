use crate::domain::transaction::{TransactionId, TransactionRecord, TransactionStatus};
use crate::error::PaymentError;
use std::fmt;

/// Machine-readable category of a failed authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AccountNotFound,
    InsufficientFunds,
    DailyLimitExceeded,
    FraudFlagged,
    InfrastructureFault,
}

impl FailureKind {
    /// Funds, limit and fraud failures are business rule violations.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            FailureKind::InsufficientFunds | FailureKind::DailyLimitExceeded | FailureKind::FraudFlagged
        )
    }
}

/// Why an authorization failed: a kind plus the message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn insufficient_funds() -> Self {
        Self::new(FailureKind::InsufficientFunds, "Insufficient funds")
    }

    pub fn daily_limit_exceeded() -> Self {
        Self::new(FailureKind::DailyLimitExceeded, "Daily limit exceeded")
    }

    pub fn fraud_flagged(message: &str) -> Self {
        Self::new(FailureKind::FraudFlagged, format!("flagged: {message}"))
    }
}

impl From<PaymentError> for FailureReason {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::AccountNotFound(identity) => Self::new(
                FailureKind::AccountNotFound,
                format!("Account not found: {identity}"),
            ),
            other => Self::new(
                FailureKind::InfrastructureFault,
                format!("Payment failed: {other}"),
            ),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a single verification step.
///
/// Business rejections are values; infrastructure faults travel as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Rejected(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    VerifyingAccount,
    CheckingFunds,
    CheckingLimits,
    DetectingFraud,
    Executing,
    Succeeded,
    Failed(FailureReason),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed(_))
    }

    /// Text shown to the operator while the state is current.
    pub fn description(&self) -> &str {
        match self {
            PipelineState::Idle => "Waiting for payment",
            PipelineState::VerifyingAccount => "Verifying customer account details...",
            PipelineState::CheckingFunds => "Checking account balance...",
            PipelineState::CheckingLimits => "Verifying daily payment limits...",
            PipelineState::DetectingFraud => "Running fraud detection checks...",
            PipelineState::Executing => "Processing your payment...",
            PipelineState::Succeeded => "Payment successful",
            PipelineState::Failed(reason) => &reason.message,
        }
    }
}

/// The single result of an authorization attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOutcome {
    Success {
        transaction_id: TransactionId,
        record: TransactionRecord,
        customer_name: String,
    },
    Rejected {
        reason: FailureReason,
    },
}

impl TerminalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TerminalOutcome::Success { .. })
    }

    pub fn status(&self) -> TransactionStatus {
        match self {
            TerminalOutcome::Success { .. } => TransactionStatus::Completed,
            TerminalOutcome::Rejected { reason } if reason.kind == FailureKind::FraudFlagged => {
                TransactionStatus::FraudFlagged
            }
            TerminalOutcome::Rejected { .. } => TransactionStatus::Failed,
        }
    }
}
