//! Owned set of cancellable timers
//!
//! Periodic work (liveness probe, resubscribe, heartbeat) runs as small
//! spawned tasks that do nothing but post a tick into the owning session's
//! channel. The session does the actual work on its own task, so timers never
//! touch session state directly.
//!
//! All timers die together: [`ScheduledTasks::cancel_all`] aborts them and is
//! also run on drop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::trace;

/// Timers that post `T` ticks into one channel
#[derive(Debug)]
pub struct ScheduledTasks<T> {
    ticks: mpsc::Sender<T>,
    handles: Vec<JoinHandle<()>>,
}

impl<T> ScheduledTasks<T>
where
    T: Copy + Send + std::fmt::Debug + 'static,
{
    pub fn new(ticks: mpsc::Sender<T>) -> Self {
        Self {
            ticks,
            handles: Vec::new(),
        }
    }

    /// Post `tick` once after `delay`
    pub fn after(&mut self, delay: Duration, tick: T) {
        let ticks = self.ticks.clone();
        self.handles.push(tokio::spawn(async move {
            sleep(delay).await;
            trace!(?tick, "one-shot timer fired");
            let _ = ticks.send(tick).await;
        }));
    }

    /// Post `tick` every `period`, first after one full period
    pub fn every(&mut self, period: Duration, tick: T) {
        let ticks = self.ticks.clone();
        self.handles.push(tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                trace!(?tick, "periodic timer fired");
                if ticks.send(tick).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Number of timers not yet finished
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl<T> Drop for ScheduledTasks<T> {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tick {
        Probe,
        Once,
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_and_one_shot_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut tasks = ScheduledTasks::new(tx);
        tasks.every(Duration::from_secs(5), Tick::Probe);
        tasks.after(Duration::from_secs(1), Tick::Once);

        assert_eq!(rx.recv().await, Some(Tick::Once));
        assert_eq!(rx.recv().await, Some(Tick::Probe));
        assert_eq!(rx.recv().await, Some(Tick::Probe));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_stops_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut tasks = ScheduledTasks::new(tx);
        tasks.every(Duration::from_secs(1), Tick::Probe);
        tasks.cancel_all();
        assert_eq!(tasks.active(), 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel(8);
        {
            let mut tasks = ScheduledTasks::new(tx);
            tasks.every(Duration::from_secs(1), Tick::Probe);
        }
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
