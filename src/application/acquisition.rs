use crate::config::AcquisitionConfig;
use crate::domain::acquisition::{AcquisitionSample, AcquisitionState, ScanStatus};
use crate::domain::ports::{IdentityResolverRef, PresenceSourceRef, TickerFactory};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Accumulated progress at or above `1.0 - PROGRESS_EPSILON` counts as complete.
const PROGRESS_EPSILON: f64 = 1e-9;

/// Session bookkeeping. The loop only writes state while its generation is
/// the live one, and always under this lock.
#[derive(Default)]
struct Gate {
    generation: u64,
    live: bool,
    handle: Option<JoinHandle<()>>,
}

impl Gate {
    fn is_current(&self, generation: u64) -> bool {
        self.live && self.generation == generation
    }
}

struct Inner {
    config: AcquisitionConfig,
    source: PresenceSourceRef,
    resolver: IdentityResolverRef,
    ticker_factory: TickerFactory,
    gate: Mutex<Gate>,
    state_tx: watch::Sender<AcquisitionState>,
}

enum Tick {
    Continue,
    Complete,
}

/// Turns per-frame presence confidence into a debounced, monotonic scan.
///
/// `start` spawns a sampling loop on the tokio runtime; `stop` may be called
/// from any thread and guarantees that the loop publishes nothing afterwards.
pub struct BiometricAcquisitionEngine {
    inner: Arc<Inner>,
}

impl BiometricAcquisitionEngine {
    /// Fails with `ValidationError` when `config` is out of range.
    pub fn new(
        config: AcquisitionConfig,
        source: PresenceSourceRef,
        resolver: IdentityResolverRef,
        ticker_factory: TickerFactory,
    ) -> Result<Self> {
        config.validate()?;
        let (state_tx, _) = watch::channel(AcquisitionState::default());
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                source,
                resolver,
                ticker_factory,
                gate: Mutex::new(Gate::default()),
                state_tx,
            }),
        })
    }

    /// Starts a fresh scan session. No-op while a session is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut gate = self.inner.lock_gate();
        if gate.live {
            return;
        }
        gate.generation += 1;
        gate.live = true;
        self.inner.state_tx.send_replace(AcquisitionState::scanning());

        let generation = gate.generation;
        let inner = Arc::clone(&self.inner);
        gate.handle = Some(tokio::spawn(run_session(inner, generation)));
        info!(session = generation, "Biometric acquisition started");
    }

    /// Halts sampling and resets progress. Safe to call repeatedly, before
    /// `start`, and from outside the runtime.
    pub fn stop(&self) {
        let mut gate = self.inner.lock_gate();
        let was_live = gate.live;
        gate.live = false;
        if let Some(handle) = gate.handle.take() {
            handle.abort();
        }
        self.inner.state_tx.send_if_modified(|state| {
            let stopped = AcquisitionState::stopped();
            if *state == stopped {
                return false;
            }
            *state = stopped;
            true
        });
        if was_live {
            info!(session = gate.generation, "Biometric acquisition stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_gate().live
    }

    pub fn state(&self) -> AcquisitionState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AcquisitionState> {
        self.inner.state_tx.subscribe()
    }

    /// Waits until the current session leaves `Scanning` and returns the
    /// state it ended in. Returns immediately when no session is running.
    pub async fn completion(&self) -> AcquisitionState {
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|state| state.status != ScanStatus::Scanning)
            .await
            .map(|state| state.clone());
        result.unwrap_or_else(|_| self.state())
    }
}

impl Drop for BiometricAcquisitionEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_gate().is_current(generation)
    }

    /// Applies one sample. Returns `None` when the session is no longer live.
    fn apply(&self, generation: u64, sample: AcquisitionSample, ticks: &mut u32) -> Option<Tick> {
        let gate = self.lock_gate();
        if !gate.is_current(generation) {
            return None;
        }

        let threshold = self.config.detection_threshold;
        let increment = self.config.progress_increment;
        let mut outcome = Tick::Continue;

        self.state_tx.send_if_modified(|state| {
            if state.detected {
                if sample.confidence < threshold {
                    debug!(confidence = sample.confidence, "Subject lost, progress reset");
                    state.detected = false;
                    state.progress = 0.0;
                    *ticks = 0;
                    return true;
                }
            } else if sample.confidence > threshold {
                debug!(confidence = sample.confidence, "Subject detected");
                state.detected = true;
            } else {
                return false;
            }

            *ticks += 1;
            state.progress = (f64::from(*ticks) * increment).min(1.0);
            if state.progress >= 1.0 - PROGRESS_EPSILON {
                state.progress = 1.0;
                outcome = Tick::Complete;
            }
            true
        });
        Some(outcome)
    }

    /// Ends the session, applying `update` if it is still the live one.
    fn finish(&self, generation: u64, update: impl FnOnce(&mut AcquisitionState)) {
        let mut gate = self.lock_gate();
        if !gate.is_current(generation) {
            return;
        }
        gate.live = false;
        gate.handle = None;
        self.state_tx.send_modify(update);
    }
}

async fn run_session(inner: Arc<Inner>, generation: u64) {
    let mut ticker = (inner.ticker_factory)();
    let mut ticks: u32 = 0;

    loop {
        if !ticker.tick().await {
            debug!(session = generation, "Sampling schedule exhausted");
            inner.finish(generation, |state| *state = AcquisitionState::stopped());
            return;
        }
        if !inner.is_current(generation) {
            return;
        }

        let sample = match inner.source.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(session = generation, error = %e, "Presence source failed");
                let message = e.to_string();
                inner.finish(generation, |state| {
                    *state = AcquisitionState {
                        status: ScanStatus::Faulted(message),
                        ..AcquisitionState::default()
                    };
                });
                return;
            }
        };
        // A stop may have landed while the source was being sampled.
        if !inner.is_current(generation) {
            return;
        }
        trace!(session = generation, confidence = sample.confidence, "Sample");

        match inner.apply(generation, sample, &mut ticks) {
            None => return,
            Some(Tick::Continue) => continue,
            Some(Tick::Complete) => break,
        }
    }

    match inner.resolver.resolve().await {
        Ok(identity) => {
            info!(session = generation, identity = %identity, "Biometric acquisition complete");
            inner.finish(generation, |state| {
                state.resolved_identity = Some(identity);
                state.status = ScanStatus::Completed;
            });
        }
        Err(e) => {
            warn!(session = generation, error = %e, "Identity resolution failed");
            let message = e.to_string();
            inner.finish(generation, |state| {
                *state = AcquisitionState {
                    status: ScanStatus::Faulted(message),
                    ..AcquisitionState::default()
                };
            });
        }
    }
}
