use {
    std::{future::Future, time::Duration},
    tokio::time::{Interval, MissedTickBehavior},
};

/// Paces the frame loop, one tick per displayed frame.
pub trait FrameClock: Send {
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fixed-rate stand-in for a display refresh callback.
///
/// Late ticks are skipped, not caught up.
#[derive(Debug)]
pub struct IntervalClock {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::from_fps(60)
    }
}

impl FrameClock for IntervalClock {
    async fn tick(&mut self) {
        // created lazily so the clock can be built outside a runtime
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fps() {
        assert_eq!(IntervalClock::from_fps(50).period(), Duration::from_millis(20));
        assert_eq!(IntervalClock::from_fps(0).period(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_spaced() {
        let mut clock = IntervalClock::new(Duration::from_millis(100));
        let started = tokio::time::Instant::now();
        clock.tick().await;
        clock.tick().await;
        clock.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }
}
