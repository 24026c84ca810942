use std::time::{Duration, Instant};

/// Repeating trigger that can be cancelled and re-armed.
///
/// Every `start` begins a fresh interval; an interval already in flight is
/// discarded, never carried over.
pub trait Scheduler {
    fn start(&mut self, period: Duration);
    fn stop(&mut self);
    /// Period of the running interval, `None` when stopped.
    fn period(&self) -> Option<Duration>;

    fn is_running(&self) -> bool {
        self.period().is_some()
    }
}

/// Wall-clock interval polled by the event loop.
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    period: Option<Duration>,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer so the first fire is one `period` after `now`.
    pub fn start_at(&mut self, period: Duration, now: Instant) {
        self.period = Some(period);
        self.next_due = Some(now + period);
    }

    /// Returns true when the interval elapsed at `now`, re-arming for one
    /// period after `now`. Missed intervals are not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let (Some(period), Some(due)) = (self.period, self.next_due) else {
            return false;
        };

        if now < due {
            return false;
        }

        self.next_due = Some(now + period);
        true
    }

    /// Time left until the next fire, if running.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

impl Scheduler for IntervalTimer {
    fn start(&mut self, period: Duration) {
        self.start_at(period, Instant::now());
    }

    fn stop(&mut self) {
        self.period = None;
        self.next_due = None;
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

/// Scheduler test double: records calls, never fires on its own.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    period: Option<Duration>,
    pub starts: u32,
    pub stops: u32,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for ManualTimer {
    fn start(&mut self, period: Duration) {
        self.period = Some(period);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.period = None;
        self.stops += 1;
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{IntervalTimer, ManualTimer, Scheduler};

    #[test]
    fn interval_fires_once_per_period() {
        let origin = Instant::now();
        let period = Duration::from_millis(100);
        let mut timer = IntervalTimer::new();
        timer.start_at(period, origin);

        assert!(!timer.poll(origin + Duration::from_millis(99)));
        assert!(timer.poll(origin + Duration::from_millis(100)));
        assert!(!timer.poll(origin + Duration::from_millis(150)));
        assert!(timer.poll(origin + Duration::from_millis(200)));
    }

    #[test]
    fn restart_discards_partial_interval() {
        let origin = Instant::now();
        let mut timer = IntervalTimer::new();
        timer.start_at(Duration::from_millis(150), origin);

        // 120 ms into a 150 ms interval, switch to 50 ms.
        let restart = origin + Duration::from_millis(120);
        timer.start_at(Duration::from_millis(50), restart);

        assert!(!timer.poll(origin + Duration::from_millis(150)));
        assert!(timer.poll(restart + Duration::from_millis(50)));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let origin = Instant::now();
        let mut timer = IntervalTimer::new();
        timer.start_at(Duration::from_millis(10), origin);
        timer.stop();

        assert!(!timer.poll(origin + Duration::from_secs(5)));
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(origin), None);
    }

    #[test]
    fn manual_timer_records_calls() {
        let mut timer = ManualTimer::new();
        timer.start(Duration::from_millis(75));
        timer.stop();

        assert_eq!((timer.starts, timer.stops), (1, 1));
        assert_eq!(timer.period(), None);
    }
}
