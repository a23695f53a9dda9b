use crate::application::acquisition::BiometricAcquisitionEngine;
use crate::application::pipeline::{PipelineSteps, TransactionPipeline};
use crate::application::receipt::ReceiptBuilder;
use crate::config::TerminalConfig;
use crate::domain::account::AuthorizationRequest;
use crate::domain::acquisition::ScanStatus;
use crate::domain::pipeline::TerminalOutcome;
use crate::domain::ports::{IdentityResolverRef, PresenceSourceRef, ReceiptNotifierRef, TickerFactory};
use crate::domain::receipt::Receipt;
use crate::domain::transaction::PaymentMethod;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Outcome of one checkout, with the receipt when the payment went through.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub outcome: TerminalOutcome,
    pub receipt: Option<Receipt>,
}

/// Ties identification, authorization and receipts together for one device.
///
/// Checkouts are expected to be serialized by the caller; every checkout
/// gets its own pipeline.
pub struct Terminal {
    config: TerminalConfig,
    steps: PipelineSteps,
    receipts: ReceiptBuilder,
    notifier: Option<(ReceiptNotifierRef, String)>,
}

impl Terminal {
    /// Fails with `ValidationError` when `config` is out of range.
    pub fn new(config: TerminalConfig, steps: PipelineSteps, receipts: ReceiptBuilder) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            steps,
            receipts,
            notifier: None,
        })
    }

    /// Sends a receipt to `destination` after every successful checkout.
    pub fn with_notifier(mut self, notifier: ReceiptNotifierRef, destination: impl Into<String>) -> Self {
        self.notifier = Some((notifier, destination.into()));
        self
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Validates an amount against the configured ceiling.
    pub fn request(
        &self,
        identity: impl Into<String>,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<AuthorizationRequest> {
        AuthorizationRequest::new(identity, amount, method, self.config.max_amount)
    }

    /// Runs one scan session to its end and returns the resolved identity.
    ///
    /// A stopped, exhausted or faulted session is an `AcquisitionFault`.
    pub async fn scan(
        &self,
        source: PresenceSourceRef,
        resolver: IdentityResolverRef,
        ticker_factory: TickerFactory,
    ) -> Result<String> {
        let engine = BiometricAcquisitionEngine::new(
            self.config.acquisition.clone(),
            source,
            resolver,
            ticker_factory,
        )?;
        engine.start();
        let state = engine.completion().await;

        match (state.status, state.resolved_identity) {
            (ScanStatus::Completed, Some(identity)) => Ok(identity),
            (ScanStatus::Faulted(message), _) => Err(PaymentError::AcquisitionFault(message)),
            (status, _) => Err(PaymentError::AcquisitionFault(format!(
                "Scan ended without an identity ({status:?})"
            ))),
        }
    }

    /// Authorizes `request` on a fresh pipeline and issues a receipt on success.
    pub async fn checkout(&self, request: AuthorizationRequest) -> Result<Checkout> {
        let pipeline = TransactionPipeline::new(self.steps.clone());
        let outcome = pipeline.authorize(request).await;

        let receipt = match &outcome {
            TerminalOutcome::Success {
                record,
                customer_name,
                ..
            } => {
                let context = self.receipts.context_for(customer_name.clone());
                let receipt = self.receipts.build(record, &context)?;
                self.notify(&receipt).await;
                Some(receipt)
            }
            TerminalOutcome::Rejected { .. } => None,
        };

        Ok(Checkout { outcome, receipt })
    }

    async fn notify(&self, receipt: &Receipt) {
        let Some((notifier, destination)) = &self.notifier else {
            return;
        };
        match notifier.send(receipt, destination).await {
            Ok(()) => info!(transaction_id = %receipt.transaction_id, to = %destination, "Receipt delivered"),
            Err(e) => warn!(transaction_id = %receipt.transaction_id, error = %e, "Receipt delivery failed"),
        }
    }
}
