use std::time::Instant;

use crate::constants::TIMER_INTERVAL;
use crate::state::State;

/// A monotonic source of time for the TimerDriver
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Reads the host's monotonic clock
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// # Timer Driver
/// Decrements the delay and sound timers at 60Hz of wall-clock time,
/// independently of how many instructions run in between.
///
/// - `Idle` until first polled, at which point the poll time becomes the anchor
/// - `Running` ticks at most once per poll, when a whole TIMER_INTERVAL has
///   passed since the anchor, and then re-anchors on the poll time. Intervals
///   missed while the host was stalled are dropped rather than replayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerDriver {
    Idle,
    Running { anchor: Instant },
}

impl TimerDriver {
    pub fn new() -> Self {
        TimerDriver::Idle
    }

    /// Returns whether the timers are due a decrement at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match *self {
            TimerDriver::Idle => {
                *self = TimerDriver::Running { anchor: now };
                false
            }
            TimerDriver::Running { anchor } => {
                if now.saturating_duration_since(anchor) >= TIMER_INTERVAL {
                    *self = TimerDriver::Running { anchor: now };
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Polls at `now` and decrements both timers in `state` if they are due
    pub fn advance(&mut self, now: Instant, state: &mut State) -> bool {
        let due = self.poll(now);
        if due {
            state.delay_timer = state.delay_timer.saturating_sub(1);
            state.sound_timer = state.sound_timer.saturating_sub(1);
        }
        due
    }
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;

    /// A clock that only moves when told to
    #[derive(Clone)]
    pub(crate) struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            ManualClock(Rc::new(Cell::new(Instant::now())))
        }

        pub(crate) fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    const STEP: Duration = Duration::from_micros(16_600);

    #[test]
    fn test_first_poll_only_anchors() {
        let clock = ManualClock::new();
        let mut driver = TimerDriver::new();
        assert!(!driver.poll(clock.now()));
        assert_eq!(
            driver,
            TimerDriver::Running {
                anchor: clock.now()
            }
        );
    }

    #[test]
    fn test_one_decrement_per_interval() {
        let clock = ManualClock::new();
        let mut driver = TimerDriver::new();
        let mut state = State::new();
        state.delay_timer = 3;
        state.sound_timer = 2;

        driver.advance(clock.now(), &mut state);
        assert_eq!(state.delay_timer, 3);

        for expected in &[(2, 1), (1, 0), (0, 0), (0, 0)] {
            clock.advance(STEP);
            assert!(driver.advance(clock.now(), &mut state));
            assert_eq!((state.delay_timer, state.sound_timer), *expected);
        }
    }

    #[test]
    fn test_fast_polls_dont_tick() {
        let clock = ManualClock::new();
        let mut driver = TimerDriver::new();
        let mut state = State::new();
        state.delay_timer = 10;

        driver.advance(clock.now(), &mut state);
        for _ in 0..15 {
            clock.advance(Duration::from_millis(1));
            driver.advance(clock.now(), &mut state);
        }
        assert_eq!(state.delay_timer, 10);

        clock.advance(Duration::from_millis(2));
        driver.advance(clock.now(), &mut state);
        assert_eq!(state.delay_timer, 9);
    }

    #[test]
    fn test_stall_is_not_backfilled() {
        let clock = ManualClock::new();
        let mut driver = TimerDriver::new();
        let mut state = State::new();
        state.delay_timer = 100;

        driver.advance(clock.now(), &mut state);
        clock.advance(Duration::from_secs(1));
        driver.advance(clock.now(), &mut state);
        assert_eq!(state.delay_timer, 99);

        // re-anchored on the late poll, so the next tick is a full interval away
        clock.advance(STEP / 2);
        driver.advance(clock.now(), &mut state);
        assert_eq!(state.delay_timer, 99);
        clock.advance(STEP / 2);
        driver.advance(clock.now(), &mut state);
        assert_eq!(state.delay_timer, 98);
    }
}
