use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::test_session::TestSession;

/// Session shared between the test surface and its countdown task.
pub type SharedSession = Arc<Mutex<TestSession>>;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Countdown task that ticks an active session once per second.
///
/// The task ends on its own once the session leaves `Active`. It is also
/// cancelled by [`SessionTimer::stop`] and when the timer is dropped.
#[derive(Debug)]
pub struct SessionTimer {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    remaining: watch::Receiver<u32>,
}

impl SessionTimer {
    /// Spawn the countdown for an already started session.
    pub async fn spawn(session: SharedSession) -> Self {
        let initial = session.lock().await.remaining_seconds();
        let (tx, remaining) = watch::channel(initial);
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => {
                        tracing::debug!("session timer cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let mut guard = session.lock().await;
                        if !guard.is_active() {
                            break;
                        }
                        let left = guard.tick();
                        let still_active = guard.is_active();
                        drop(guard);

                        tracing::debug!(remaining = left, "session tick");
                        tx.send_replace(left);
                        if !still_active {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
            remaining,
        }
    }

    /// Receiver that observes the remaining seconds after every tick.
    #[must_use]
    pub fn remaining(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the countdown task to end.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "session timer task failed");
            }
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
