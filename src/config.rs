use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

pub const DEFAULT_MAX_AMOUNT: Decimal = dec!(999999.99);
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PROGRESS_INCREMENT: f64 = 0.05;
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_millis(100);

/// Tuning of the biometric acquisition loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    /// A sample must exceed this confidence to count as a detection.
    pub detection_threshold: f64,
    /// Progress added per tick while a subject stays detected.
    pub progress_increment: f64,
    pub sampling_interval: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            progress_increment: DEFAULT_PROGRESS_INCREMENT,
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
        }
    }
}

impl AcquisitionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(PaymentError::ValidationError(format!(
                "Detection threshold {} must be within [0, 1]",
                self.detection_threshold
            )));
        }
        if !(self.progress_increment > 0.0 && self.progress_increment <= 1.0) {
            return Err(PaymentError::ValidationError(format!(
                "Progress increment {} must be within (0, 1]",
                self.progress_increment
            )));
        }
        if self.sampling_interval.is_zero() {
            return Err(PaymentError::ValidationError(
                "Sampling interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Externally supplied constants of the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    /// Ceiling for a single payment.
    pub max_amount: Decimal,
    pub acquisition: AcquisitionConfig,
    /// Simulated I/O latency of each pipeline step.
    pub step_latency: Duration,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_amount: DEFAULT_MAX_AMOUNT,
            acquisition: AcquisitionConfig::default(),
            step_latency: Duration::ZERO,
        }
    }
}

impl TerminalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_amount <= Decimal::ZERO {
            return Err(PaymentError::ValidationError(
                "Maximum amount must be positive".to_string(),
            ));
        }
        self.acquisition.validate()
    }
}
