use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Sleep;

/// Heartbeat events driving the election coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A follower observed a live leader.
    HeartbeatReceived,
    /// The follower timer expired without hearing from a leader.
    HeartbeatTimeout,
}

/// Generates a random election timeout within the configured range
pub fn random_election_timeout(min_ms: u64, max_ms: u64) -> Duration {
    let mut rng = rand::thread_rng();
    let timeout_ms = rng.gen_range(min_ms..=max_ms);
    Duration::from_millis(timeout_ms)
}

/// One-shot, cancelable follower timer plus the election-timeout wait.
///
/// Arming and canceling never suspend the caller; the armed timer is a
/// spawned task that signals [`Signal::HeartbeatTimeout`] on expiry.
pub struct ElectionTimer {
    signal_tx: mpsc::Sender<Signal>,
    follower_timeout: Option<JoinHandle<()>>,
}

impl ElectionTimer {
    pub fn new(signal_tx: mpsc::Sender<Signal>) -> Self {
        Self {
            signal_tx,
            follower_timeout: None,
        }
    }

    /// Arm the follower timer. Any previously armed timer keeps running;
    /// use [`restart_follower_timeout`](Self::restart_follower_timeout) to
    /// replace one.
    pub fn start_follower_timeout(&mut self, duration: Duration) {
        let tx = self.signal_tx.clone();
        self.follower_timeout = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // A dropped receiver means the coordinator is gone.
            let _ = tx.send(Signal::HeartbeatTimeout).await;
        }));
    }

    /// Cancel any armed follower timer and re-arm it.
    pub fn restart_follower_timeout(&mut self, duration: Duration) {
        self.clear_follower_timeout();
        self.start_follower_timeout(duration);
    }

    /// Cancel the follower timer. Safe to call when unarmed.
    pub fn clear_follower_timeout(&mut self) {
        if let Some(handle) = self.follower_timeout.take() {
            handle.abort();
        }
    }

    /// A suspension that completes after `duration`. Used as the race
    /// competitor against quorum resolution, not as an event source.
    pub fn wait_election_timeout(&self, duration: Duration) -> Sleep {
        tokio::time::sleep(duration)
    }
}

impl Drop for ElectionTimer {
    fn drop(&mut self) {
        self.clear_follower_timeout();
    }
}
