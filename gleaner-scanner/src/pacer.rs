use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Gate awaited before every outbound request.
pub trait Pacer {
    fn wait(&self) -> impl Future<Output = ()> + Send;
}

/// Guarantees at least `delay` between the starts of two consecutive requests.
///
/// Slots are reserved under the lock and slept on outside it, so callers that
/// share one gate are spaced out in the order they arrived.
#[derive(Debug)]
pub struct FixedDelay {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Pacer for FixedDelay {
    async fn wait(&self) {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next_slot = Some(slot + self.delay);
            slot
        };
        sleep_until(slot).await;
    }
}

/// No pacing at all. Only meant for local targets such as test servers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unpaced;

impl Pacer for Unpaced {
    async fn wait(&self) {}
}
