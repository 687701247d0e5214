//! Real-time driving of a [`TweenerSystem`].
//!
//! The [`SystemClock`] ticks at a fixed [`ClockResolution`] and broadcasts a
//! [`TickEvent`] for each tick. [`drive`] listens to these ticks and advances
//! a shared system by the time elapsed between them.

use crate::config::{ClockResolution, Config};
use crate::contract::ContractViolation;
use crate::system::TweenerSystem;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Broadcast by the [`SystemClock`] on each tick.
#[derive(Debug, Clone)]
pub struct TickEvent {
    /// Number of ticks since the clock started, starting at 1.
    pub tick_count: u64,
    pub timestamp: Instant,
    /// Time since the previous tick.
    pub delta: Duration,
}

/// The source of time of the real-time drivers.
pub struct SystemClock {
    resolution: ClockResolution,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
}

impl SystemClock {
    pub fn new(resolution: ClockResolution, tick_sender: broadcast::Sender<Arc<TickEvent>>) -> Self {
        Self {
            resolution,
            tick_sender,
        }
    }

    /// Ticks until a message is received on `shutdown_rx`.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.resolution.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick_count = 0u64;
        let mut last = Instant::now();
        info!("SystemClock started at {:?}.", self.resolution);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                now = interval.tick() => {
                    tick_count += 1;
                    let tick = TickEvent {
                        tick_count,
                        timestamp: now,
                        delta: now.saturating_duration_since(last),
                    };
                    last = now;

                    if self.tick_sender.send(Arc::new(tick)).is_err() {
                        trace!("Tick #{} has no listener.", tick_count);
                    }
                }
            }
        }

        info!("SystemClock stopped after {} ticks.", tick_count);
    }
}

/// Updates `system` on each tick received from `ticks`, by the step that
/// `to_step` computes from the tick.
///
/// Returns the number of updates once the clock's channel closes. Ticks
/// missed because the receiver lagged behind are skipped.
pub async fn drive<C, F>(
    system: Arc<Mutex<TweenerSystem<C>>>,
    mut ticks: broadcast::Receiver<Arc<TickEvent>>,
    mut to_step: F,
) -> Result<u64, ContractViolation<C::Id>>
where
    C: Config,
    F: FnMut(&TickEvent) -> C::Duration,
{
    let mut update_count = 0;

    loop {
        match ticks.recv().await {
            Ok(tick) => {
                trace!("Tick #{} received.", tick.tick_count);
                let step = to_step(&tick);
                system.lock().await.try_update(step)?;
                update_count += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Driver lagged behind the clock, {} ticks skipped.", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    debug!("Driver stopped after {} updates.", update_count);
    Ok(update_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::config::DefaultConfig;
    use crate::easing;

    #[tokio::test]
    async fn clock_ticks_until_shutdown() {
        let (tick_sender, mut ticks) = broadcast::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let clock = SystemClock::new(
            ClockResolution::Custom {
                ticks_per_second: 200,
            },
            tick_sender,
        );
        let handle = tokio::spawn(clock.run(shutdown_rx));

        for expected in 1..=3 {
            let tick = ticks.recv().await.unwrap();
            assert_eq!(tick.tick_count, expected);
        }

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn drive_updates_with_the_tick_deltas() {
        let system = Arc::new(Mutex::new(TweenerSystem::<DefaultConfig>::new()));
        let value = Arc::new(std::sync::Mutex::new(0.0f32));

        Builder::new()
            .range_assign(0.0, 100.0, 1.0, value.clone(), easing::linear)
            .build(&mut *system.lock().await);

        let (tick_sender, ticks) = broadcast::channel(16);
        let driver = tokio::spawn(drive(system.clone(), ticks, |tick: &TickEvent| {
            tick.delta.as_secs_f32()
        }));

        let start = Instant::now();
        for tick_count in 1..=4 {
            tick_sender
                .send(Arc::new(TickEvent {
                    tick_count,
                    timestamp: start,
                    delta: Duration::from_millis(125),
                }))
                .unwrap();
        }
        drop(tick_sender);

        assert_eq!(driver.await.unwrap(), Ok(4));
        assert_eq!(*value.lock().unwrap(), 50.0);
    }
}
