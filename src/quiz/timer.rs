/// Remaining-seconds threshold below which the advisory warning fires.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining time just crossed the low-time threshold. Fires at most once
    /// per activation.
    LowTime,
    /// Remaining time reached zero. The timer has stopped itself.
    Expired,
}

/// Countdown for the currently presented question. The tick is cooperative:
/// the owner calls [`QuestionTimer::tick`] once per second, which keeps the
/// component free of clocks and timers of its own.
#[derive(Debug, Default)]
pub struct QuestionTimer {
    remaining_secs: u32,
    running: bool,
    low_time_signalled: bool,
}

impl QuestionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops whatever was counting and begins a fresh countdown for the next
    /// question's allotment. This is the only way a countdown starts, so two
    /// live tickers can never decrement the same displayed value.
    pub fn restart(&mut self, allotment_secs: u32) {
        self.stop();
        self.remaining_secs = allotment_secs;
        self.low_time_signalled = false;
        self.running = allotment_secs > 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Advances the countdown by one second. Returns the signal that this
    /// second produced, if any. Ticking a stopped timer is a no-op.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            return Some(TimerEvent::Expired);
        }
        if self.remaining_secs == LOW_TIME_THRESHOLD_SECS && !self.low_time_signalled {
            self.low_time_signalled = true;
            return Some(TimerEvent::LowTime);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timer: &mut QuestionTimer, ticks: u32) -> Vec<TimerEvent> {
        (0..ticks).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn one_minute_countdown_signals_low_time_then_expiry() {
        let mut timer = QuestionTimer::new();
        timer.restart(60);

        let events = drain(&mut timer, 50);
        assert_eq!(timer.remaining_secs(), 10);
        assert_eq!(events, vec![TimerEvent::LowTime]);

        let events = drain(&mut timer, 10);
        assert_eq!(events, vec![TimerEvent::Expired]);
        assert!(!timer.is_running());
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut timer = QuestionTimer::new();
        timer.restart(3);
        let events = drain(&mut timer, 20);
        assert_eq!(
            events.iter().filter(|e| **e == TimerEvent::Expired).count(),
            1
        );
    }

    #[test]
    fn low_time_does_not_repeat_below_threshold() {
        let mut timer = QuestionTimer::new();
        timer.restart(15);
        let events = drain(&mut timer, 12);
        assert_eq!(
            events.iter().filter(|e| **e == TimerEvent::LowTime).count(),
            1
        );
    }

    #[test]
    fn short_allotment_skips_low_time_and_just_expires() {
        // An allotment at or below the threshold never crosses it.
        let mut timer = QuestionTimer::new();
        timer.restart(5);
        let events = drain(&mut timer, 5);
        assert_eq!(events, vec![TimerEvent::Expired]);
    }

    #[test]
    fn restart_resets_the_low_time_latch() {
        let mut timer = QuestionTimer::new();
        timer.restart(12);
        drain(&mut timer, 2); // remaining 10, LowTime consumed
        timer.restart(12);
        let events = drain(&mut timer, 2);
        assert_eq!(events, vec![TimerEvent::LowTime]);
    }

    #[test]
    fn stopped_timer_does_not_tick() {
        let mut timer = QuestionTimer::new();
        timer.restart(30);
        timer.tick();
        timer.stop();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining_secs(), 29);
    }

    #[test]
    fn allotments_do_not_carry_over() {
        let mut timer = QuestionTimer::new();
        timer.restart(60);
        drain(&mut timer, 40);
        timer.restart(120);
        assert_eq!(timer.remaining_secs(), 120);
    }
}
