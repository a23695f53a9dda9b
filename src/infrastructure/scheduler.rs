use crate::domain::ports::{Ticker, TickerBox, TickerFactory};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Wall-clock ticker backed by `tokio::time::interval`.
///
/// The first tick fires one period after creation.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn factory(period: Duration) -> TickerFactory {
        Box::new(move || Box::new(IntervalTicker::new(period)) as TickerBox)
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

type TickPermit = oneshot::Sender<()>;

/// Ticker driven explicitly through a [`TickHandle`].
///
/// Every ticker built by the same factory draws from the same handle, so one
/// handle can drive consecutive sessions.
pub struct ManualTicker {
    permits: Arc<Mutex<mpsc::UnboundedReceiver<TickPermit>>>,
    in_flight: Option<TickPermit>,
}

impl ManualTicker {
    pub fn factory() -> (TickerFactory, TickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let permits = Arc::new(Mutex::new(rx));
        let factory: TickerFactory = Box::new(move || {
            Box::new(ManualTicker {
                permits: Arc::clone(&permits),
                in_flight: None,
            }) as TickerBox
        });
        (factory, TickHandle { tx })
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        // Asking for the next tick means the previous one is fully processed.
        if let Some(done) = self.in_flight.take() {
            let _ = done.send(());
        }
        match self.permits.lock().await.recv().await {
            Some(permit) => {
                self.in_flight = Some(permit);
                true
            }
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<TickPermit>,
}

impl TickHandle {
    /// Releases one tick and waits until the loop has processed it.
    ///
    /// Returns `false` if the loop ended instead of asking for another tick.
    pub async fn advance(&self) -> bool {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(done_tx).is_err() {
            return false;
        }
        done_rx.await.is_ok()
    }
}
