use std::{future, pin::Pin, time::Duration};

use tokio::time::{self, Sleep};

/// A single cancelable deadline.
///
/// Arming an already armed timer replaces the pending deadline, so there's at most one
/// outstanding expiry at any time.
#[derive(Debug, Default)]
pub struct Timer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Timer {
    /// Creates a new disarmed `Timer`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the timer to fire `after` from now.
    ///
    /// # Arguments
    /// * `after` - How long to wait before firing.
    pub fn arm(&mut self, after: Duration) {
        self.sleep = Some(Box::pin(time::sleep(after)));
    }

    /// Drops the pending deadline, if any.
    ///
    /// # Returns
    /// Whether there was a deadline to cancel.
    pub fn cancel(&mut self) -> bool {
        self.sleep.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Waits until the armed deadline passes, then disarms the timer.
    ///
    /// Never resolves while the timer is disarmed. Dropping the returned future before
    /// it resolves leaves the deadline armed.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_the_deadline() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_secs(1));

        let start = time::Instant::now();
        timer.fired().await;

        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_millis(10));
        assert!(timer.cancel());
        assert!(!timer.cancel());

        let res = time::timeout(Duration::from_secs(5), timer.fired()).await;
        assert!(res.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_deadline() {
        let mut timer = Timer::new();
        timer.arm(Duration::from_secs(10));
        timer.arm(Duration::from_secs(1));

        let res = time::timeout(Duration::from_secs(2), timer.fired()).await;
        assert!(res.is_ok());
    }
}
