use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::TimerTick;

#[derive(Debug)]
struct ActiveTimer {
    generation: u64,
    cancel: CancellationToken,
}

/// Single repeating timer that asks its gallery to advance.
///
/// Ticks are delivered over a channel and tagged with the generation of the timer that produced
/// them; once [`clear`](Self::clear) runs, ticks already queued from that generation are refused
/// by [`accepts`](Self::accepts).
#[derive(Debug)]
pub struct AutoRotateTimer {
    interval: Duration,
    clear_on_interact: bool,
    active: Option<ActiveTimer>,
    generation: u64,
    ticks: Sender<TimerTick>,
}

impl AutoRotateTimer {
    pub fn new(interval: Duration, clear_on_interact: bool, ticks: Sender<TimerTick>) -> Self {
        Self {
            interval,
            clear_on_interact,
            active: None,
            generation: 0,
            ticks,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn clear_on_interact(&self) -> bool {
        self.clear_on_interact
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Restart the timer. No-op when the interval is zero.
    pub fn start(&mut self) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        self.clear();

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("auto-rotate requested outside a tokio runtime: {err}");
                return false;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();
        let period = self.interval;
        let ticks = self.ticks.clone();
        let stop = cancel.clone();
        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            biased;
                            _ = stop.cancelled() => break,
                            sent = ticks.send(TimerTick { generation }) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            debug!(generation, "auto-rotate timer stopped");
        });

        debug!(
            generation,
            interval_ms = period.as_millis() as u64,
            "auto-rotate timer started"
        );
        self.active = Some(ActiveTimer { generation, cancel });
        true
    }

    /// Cancel the active timer, if any.
    pub fn clear(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            debug!(generation = active.generation, "auto-rotate timer cleared");
        }
    }

    /// Whether `tick` came from the timer that is currently running.
    pub fn accepts(&self, tick: TimerTick) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == tick.generation)
    }
}

impl Drop for AutoRotateTimer {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn zero_interval_never_starts() {
        let (tx, _rx) = mpsc::channel(4);
        let mut timer = AutoRotateTimer::new(Duration::ZERO, false, tx);
        assert!(!timer.start());
        assert!(!timer.is_active());
        timer.clear();
        timer.clear();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn ticks_repeat_until_cleared() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = AutoRotateTimer::new(Duration::from_millis(20), false, tx);
        assert!(timer.start());

        for _ in 0..2 {
            let tick = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timeout waiting for tick")
                .expect("tick channel closed");
            assert!(timer.accepts(tick));
        }

        timer.clear();
        assert!(!timer.is_active());
        // Anything still queued belongs to the cleared generation.
        while let Ok(Some(tick)) =
            tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
        {
            assert!(!timer.accepts(tick));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn restart_invalidates_previous_generation() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = AutoRotateTimer::new(Duration::from_millis(20), false, tx);
        timer.start();
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        timer.start();
        assert!(!timer.accepts(first));
        assert!(timer.accepts(TimerTick {
            generation: first.generation + 1
        }));
    }
}
