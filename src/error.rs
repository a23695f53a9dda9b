use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Execution fault: {0}")]
    ExecutionFault(String),
    #[error("Acquisition fault: {0}")]
    AcquisitionFault(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
