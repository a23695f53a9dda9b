use chrono::{DateTime, Utc};

/// One frame's presence confidence, as reported by the presence source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionSample {
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub captured_at: DateTime<Utc>,
}

impl AcquisitionSample {
    /// Builds a sample, clamping the confidence into [0, 1]. NaN counts as 0.
    pub fn new(confidence: f64, captured_at: DateTime<Utc>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            confidence,
            captured_at,
        }
    }

    pub fn now(confidence: f64) -> Self {
        Self::new(confidence, Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Completed,
    Faulted(String),
    Stopped,
}

/// Observable state of a biometric scan session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AcquisitionState {
    pub detected: bool,
    /// Fraction of the scan completed, in [0, 1].
    pub progress: f64,
    pub resolved_identity: Option<String>,
    pub status: ScanStatus,
}

impl AcquisitionState {
    pub fn scanning() -> Self {
        Self {
            status: ScanStatus::Scanning,
            ..Self::default()
        }
    }

    pub fn stopped() -> Self {
        Self {
            status: ScanStatus::Stopped,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved_identity.is_some()
    }
}
