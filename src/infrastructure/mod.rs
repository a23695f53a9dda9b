pub mod in_memory;
pub mod rules;
pub mod scheduler;
pub mod simulated;

use crate::error::{PaymentError, Result};

/// Receipts go to a mail address; anything without an `@` is refused.
pub(crate) fn validate_destination(destination: &str) -> Result<()> {
    let destination = destination.trim();
    match destination.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(PaymentError::NotificationError(format!(
            "Invalid receipt destination '{destination}'"
        ))),
    }
}
