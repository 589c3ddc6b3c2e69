//! Repeating tick schedule for the game loop
//!
//! The timer is a plain handle: arming and cancelling are synchronous and do
//! not need a runtime, the underlying tokio interval is only created the
//! first time [`TickTimer::tick`] is awaited after arming.

use std::future::pending;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug)]
pub struct TickTimer {
    period: Duration,
    armed: bool,
    interval: Option<Interval>,
    arm_count: u64,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            armed: false,
            interval: None,
            arm_count: 0,
        }
    }

    /// Start a fresh schedule, dropping any schedule already running
    pub fn arm(&mut self) {
        self.cancel();
        self.armed = true;
        self.arm_count += 1;
    }

    /// Stop the schedule. Cancelling an idle timer does nothing.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// How many schedules have been started over the timer's lifetime
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }

    /// Wait for the next tick. Never resolves while the timer is disarmed.
    ///
    /// Cancel safe: dropping the future loses no ticks.
    pub async fn tick(&mut self) {
        if !self.armed {
            return pending::<()>().await;
        }

        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    const PERIOD: Duration = Duration::from_millis(150);

    #[test]
    fn test_arm_and_cancel() {
        let mut timer = TickTimer::new(PERIOD);
        assert!(!timer.is_armed());

        timer.arm();
        assert!(timer.is_armed());
        assert_eq!(timer.arm_count(), 1);

        timer.cancel();
        timer.cancel();
        assert!(!timer.is_armed());
        assert_eq!(timer.arm_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_fires_each_period() {
        let mut timer = TickTimer::new(PERIOD);
        timer.arm();

        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), PERIOD);

        timer.tick().await;
        assert_eq!(start.elapsed(), PERIOD * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_timer_never_fires() {
        let mut timer = TickTimer::new(PERIOD);
        assert!(timeout(Duration::from_secs(5), timer.tick()).await.is_err());

        timer.arm();
        timer.cancel();
        assert!(timeout(Duration::from_secs(5), timer.tick()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_restarts_schedule() {
        let mut timer = TickTimer::new(PERIOD);
        timer.arm();
        timer.tick().await;

        advance(Duration::from_millis(100)).await;
        timer.arm();

        let rearmed_at = Instant::now();
        timer.tick().await;
        assert_eq!(rearmed_at.elapsed(), PERIOD);
        assert_eq!(timer.arm_count(), 2);
    }
}
