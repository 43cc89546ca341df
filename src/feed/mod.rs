//! Simulated price feed.
//!
//! [`PriceFeed`] produces the next snapshot; [`FeedTask`] owns the timer and
//! pushes every snapshot to its subscribers.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{PriceSnapshot, instrument, now};

/// Default interval between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Capacity of the snapshot broadcast channel.
const CHANNEL_CAPACITY: usize = 64;

/// PriceFeed random-walks every instrument's price.
pub struct PriceFeed {
    snapshot: PriceSnapshot,
    rng: StdRng,
}

impl PriceFeed {
    /// Starts from the instrument table's initial prices. A seed makes the walk reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_snapshot(PriceSnapshot::initial(), seed)
    }

    pub fn with_snapshot(snapshot: PriceSnapshot, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { snapshot, rng }
    }

    pub fn snapshot(&self) -> &PriceSnapshot {
        &self.snapshot
    }

    /// Moves every price by a random factor in `[-volatility, +volatility)`.
    pub fn tick(&mut self) -> &PriceSnapshot {
        let mut next = self.snapshot.clone();

        for (symbol, price) in self.snapshot.iter() {
            let (volatility, precision) = match instrument::find(symbol) {
                Some(inst) => (inst.volatility, Some(inst.precision)),
                None => (instrument::DEFAULT_VOLATILITY, None),
            };

            let unit: f64 = self.rng.random();
            let change = Decimal::from_f64((unit - 0.5) * 2.0).unwrap_or(Decimal::ZERO) * volatility;
            let moved = price * (Decimal::ONE + change);
            let moved = match precision {
                Some(dp) => moved.round_dp(dp),
                None => moved,
            };
            next.set(symbol, moved);
        }

        next.sequence = self.snapshot.sequence + 1;
        next.timestamp = now();
        self.snapshot = next;
        &self.snapshot
    }
}

/// FeedTask runs a [`PriceFeed`] on a fixed interval.
pub struct FeedTask {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl FeedTask {
    /// Spawns the tick loop and returns it with a first subscriber.
    pub fn spawn(
        mut feed: PriceFeed,
        interval: Duration,
    ) -> (Self, broadcast::Sender<PriceSnapshot>, broadcast::Receiver<PriceSnapshot>) {
        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let sender = tx.clone();

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // The first tick of a tokio interval completes immediately.
            timer.tick().await;

            info!(interval = ?interval, instruments = feed.snapshot().len(), "Price feed started");

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let snapshot = feed.tick().clone();
                        debug!(sequence = snapshot.sequence, "Price tick");
                        // No subscribers is fine; the feed keeps running.
                        let _ = sender.send(snapshot);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Price feed stopped");
        });

        (Self { handle, shutdown }, tx, rx)
    }

    /// Signals the loop to stop and waits for it.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_tick_stays_within_volatility_band() {
        let mut feed = PriceFeed::new(Some(7));

        for _ in 0..50 {
            let before = feed.snapshot().clone();
            let after = feed.tick().clone();

            for (symbol, old) in before.iter() {
                let inst = instrument::find(symbol).unwrap();
                let new = after.get(symbol).unwrap();
                // Rounding to precision can add at most half a unit of the last decimal.
                let slack = Decimal::new(5, inst.precision + 1);
                let band = old * inst.volatility + slack;
                assert!((new - old).abs() <= band, "{symbol}: {old} -> {new}");
                assert!(new.scale() <= inst.precision);
            }
        }
    }

    #[test]
    fn test_tick_advances_sequence() {
        let mut feed = PriceFeed::new(Some(1));
        assert_eq!(feed.snapshot().sequence, 0);
        feed.tick();
        feed.tick();
        assert_eq!(feed.snapshot().sequence, 2);
    }

    #[test]
    fn test_seeded_feeds_are_reproducible() {
        let mut a = PriceFeed::new(Some(42));
        let mut b = PriceFeed::new(Some(42));
        for _ in 0..10 {
            let pa: Vec<Decimal> = a.tick().iter().map(|(_, p)| p).collect();
            let pb: Vec<Decimal> = b.tick().iter().map(|(_, p)| p).collect();
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn test_unknown_symbol_uses_default_volatility() {
        let snapshot = PriceSnapshot::empty().with_price("DOGE/USDT", d("100"));
        let mut feed = PriceFeed::with_snapshot(snapshot, Some(3));

        for _ in 0..20 {
            let old = feed.snapshot().get("DOGE/USDT").unwrap();
            let new = feed.tick().get("DOGE/USDT").unwrap();
            assert!((new - old).abs() <= old * instrument::DEFAULT_VOLATILITY);
        }
    }

    #[tokio::test]
    async fn test_task_broadcasts_snapshots() {
        let (task, _tx, mut rx) = FeedTask::spawn(PriceFeed::new(Some(5)), Duration::from_millis(10));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);

        task.stop().await;
    }
}
