use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One elapsed second, as delivered to the owner of a [`Ticker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

pub type TickSender = mpsc::UnboundedSender<Tick>;
pub type TickReceiver = mpsc::UnboundedReceiver<Tick>;

pub fn tick_channel() -> (TickSender, TickReceiver) {
    mpsc::unbounded_channel()
}

/// Handle to a running one-second interval.
///
/// The interval task lives exactly as long as the handle: dropping the
/// `Ticker` aborts it, so no tick is produced after release. Must be created
/// inside a tokio runtime.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub const PERIOD: Duration = Duration::from_secs(1);

    pub fn spawn(ticks: TickSender) -> Self {
        Self::with_period(Self::PERIOD, ticks)
    }

    pub fn with_period(period: Duration, ticks: TickSender) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick).is_err() {
                    tracing::debug!("Tick receiver dropped, stopping ticker");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
