//! Application layer orchestrating the payment flow.
//!
//! `TransactionPipeline` authorizes one payment, `BiometricAcquisitionEngine`
//! identifies the payer, `ReceiptBuilder` turns a completed payment into a
//! receipt and `Terminal` strings them together for one device.

pub mod acquisition;
pub mod pipeline;
pub mod receipt;
pub mod terminal;
