use clap::Parser;
use facepay::application::pipeline::PipelineSteps;
use facepay::application::receipt::ReceiptBuilder;
use facepay::application::terminal::Terminal;
use facepay::config::{AcquisitionConfig, TerminalConfig};
use facepay::domain::transaction::PaymentMethod;
use facepay::infrastructure::in_memory::{InMemoryAccountDirectory, InMemoryLedger};
use facepay::infrastructure::rules::{BalanceFundsChecker, DailyLimitChecker};
use facepay::infrastructure::scheduler::IntervalTicker;
use facepay::infrastructure::simulated::{
    LogNotifier, NoisyPresenceSource, SimulatedFraudDetector, SimulatedPaymentExecutor,
    StaticIdentityResolver, WithLatency,
};
use facepay::interfaces::csv::account_reader::{AccountReader, demo_accounts};
use facepay::interfaces::csv::attempt_reader::{AttemptReader, PaymentAttempt};
use facepay::interfaces::csv::outcome_writer::{OutcomeRow, OutcomeWriter};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Mean presence confidence of a customer facing the camera.
const FACE_CONFIDENCE: f64 = 0.85;
const FACE_JITTER: f64 = 0.1;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment attempts CSV file (customer, amount, method)
    input: PathBuf,

    /// Account directory CSV file. Defaults to the built-in demo accounts.
    #[arg(long, env = "FACEPAY_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Largest amount a single payment may carry
    #[arg(long, env = "FACEPAY_MAX_AMOUNT", default_value = "999999.99")]
    max_amount: Decimal,

    /// Presence confidence a frame must exceed to count as a detection
    #[arg(long, env = "FACEPAY_DETECTION_THRESHOLD", default_value_t = 0.3)]
    detection_threshold: f64,

    /// Scan progress gained per sampling tick
    #[arg(long, env = "FACEPAY_PROGRESS_INCREMENT", default_value_t = 0.05)]
    progress_increment: f64,

    /// Milliseconds between presence samples
    #[arg(long, env = "FACEPAY_SAMPLING_INTERVAL_MS", default_value_t = 100)]
    sampling_interval_ms: u64,

    /// Simulated latency of every authorization step, in milliseconds
    #[arg(long, env = "FACEPAY_STEP_LATENCY_MS", default_value_t = 0)]
    step_latency_ms: u64,

    /// Share of payments the simulated fraud check flags
    #[arg(long, env = "FACEPAY_FRAUD_RATE", default_value_t = 0.05)]
    fraud_rate: f64,

    /// Seed for the simulated collaborators, for reproducible runs
    #[arg(long, env = "FACEPAY_SEED")]
    seed: Option<u64>,

    /// Mail receipts of successful payments to this address
    #[arg(long, env = "FACEPAY_RECEIPT_TO")]
    receipt_to: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> TerminalConfig {
        TerminalConfig {
            max_amount: self.max_amount,
            acquisition: AcquisitionConfig {
                detection_threshold: self.detection_threshold,
                progress_increment: self.progress_increment,
                sampling_interval: Duration::from_millis(self.sampling_interval_ms),
            },
            step_latency: Duration::from_millis(self.step_latency_ms),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();

    let accounts = match &cli.accounts {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            AccountReader::new(file).accounts().into_diagnostic()?
        }
        None => demo_accounts(),
    };
    info!(accounts = accounts.len(), "Account directory loaded");

    let latency = config.step_latency;
    let ledger = InMemoryLedger::new();
    let steps = PipelineSteps {
        verifier: Arc::new(WithLatency::new(
            InMemoryAccountDirectory::with_accounts(accounts),
            latency,
        )),
        funds: Arc::new(WithLatency::new(BalanceFundsChecker, latency)),
        limits: Arc::new(WithLatency::new(DailyLimitChecker, latency)),
        fraud: Arc::new(WithLatency::new(
            SimulatedFraudDetector::new(cli.fraud_rate, cli.seed),
            latency,
        )),
        executor: Arc::new(WithLatency::new(SimulatedPaymentExecutor, latency)),
        ledger: Arc::new(WithLatency::new(ledger.clone(), latency)),
    };

    let mut terminal = Terminal::new(config, steps, ReceiptBuilder::default()).into_diagnostic()?;
    if let Some(destination) = &cli.receipt_to {
        terminal = terminal.with_notifier(Arc::new(LogNotifier), destination.clone());
    }

    // Process attempts one at a time; a terminal serves one customer at once.
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = AttemptReader::new(file);
    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());

    for (index, attempt) in reader.attempts().enumerate() {
        let row = index + 1;
        match attempt {
            Ok(attempt) => {
                let seed = cli.seed.map(|seed| seed.wrapping_add(row as u64));
                if let Some(outcome) = process_attempt(&terminal, &attempt, seed).await {
                    writer.write(&outcome).into_diagnostic()?;
                }
            }
            Err(e) => {
                warn!(row, error = %e, "Error reading attempt");
            }
        }
    }
    writer.flush().into_diagnostic()?;

    let recorded = ledger.all_records().await.into_diagnostic()?;
    info!(recorded = recorded.len(), "Session finished");

    Ok(())
}

/// Identifies the payer and runs the checkout. Returns `None` when the
/// attempt is refused before authorization starts.
async fn process_attempt(
    terminal: &Terminal,
    attempt: &PaymentAttempt,
    seed: Option<u64>,
) -> Option<OutcomeRow> {
    // Amount is entered before the payer is identified.
    if let Err(e) = terminal.request(&attempt.customer, attempt.amount, attempt.method) {
        warn!(customer = %attempt.customer, error = %e, "Attempt rejected");
        return None;
    }

    let identity = match attempt.method {
        PaymentMethod::FacePay => {
            let interval = terminal.config().acquisition.sampling_interval;
            let scan = terminal
                .scan(
                    Arc::new(NoisyPresenceSource::new(FACE_CONFIDENCE, FACE_JITTER, seed)),
                    Arc::new(StaticIdentityResolver::new(attempt.customer.clone())),
                    IntervalTicker::factory(interval),
                )
                .await;
            match scan {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(customer = %attempt.customer, error = %e, "Face scan failed");
                    return Some(OutcomeRow::aborted(
                        &attempt.customer,
                        attempt.amount,
                        attempt.method,
                        e.to_string(),
                    ));
                }
            }
        }
        PaymentMethod::Card | PaymentMethod::Transfer => attempt.customer.clone(),
    };

    let request = match terminal.request(identity, attempt.amount, attempt.method) {
        Ok(request) => request,
        Err(e) => {
            warn!(customer = %attempt.customer, error = %e, "Attempt rejected");
            return None;
        }
    };

    match terminal.checkout(request).await {
        Ok(checkout) => Some(OutcomeRow::from_outcome(
            &attempt.customer,
            attempt.amount,
            attempt.method,
            &checkout.outcome,
        )),
        Err(e) => Some(OutcomeRow::aborted(
            &attempt.customer,
            attempt.amount,
            attempt.method,
            e.to_string(),
        )),
    }
}
