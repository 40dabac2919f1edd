//! Countdown timer driven by an external once-per-second tick.

/// Default test length: 30 minutes.
pub const DEFAULT_DURATION_SECS: u32 = 1800;
/// Remaining time at or below which the display turns to a warning.
pub const DEFAULT_WARNING_SECS: u32 = 300;
/// Remaining time at or below which the display turns to danger.
pub const DEFAULT_DANGER_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub duration_secs: u32,
    pub warning_secs: u32,
    pub danger_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            warning_secs: DEFAULT_WARNING_SECS,
            danger_secs: DEFAULT_DANGER_SECS,
        }
    }
}

impl TimerConfig {
    #[must_use]
    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

/// Emitted by `Timer::tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining time dropped below zero. Emitted once per `start`.
    Expired,
}

/// Colour band of the countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerLevel {
    Normal,
    Warning,
    Danger,
}

/// Plain snapshot of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Seconds left; negative in overtime.
    pub remaining: i64,
    pub is_overtime: bool,
    pub running: bool,
}

#[derive(Debug, Clone)]
pub struct Timer {
    config: TimerConfig,
    duration: i64,
    remaining: i64,
    is_overtime: bool,
    running: bool,
}

impl Timer {
    #[must_use]
    pub fn new(config: TimerConfig) -> Self {
        let duration = i64::from(config.duration_secs);
        Self {
            config,
            duration,
            remaining: duration,
            is_overtime: false,
            running: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> TimerConfig {
        self.config
    }

    /// Reset to `duration_secs` and start counting.
    pub fn start(&mut self, duration_secs: u32) {
        self.duration = i64::from(duration_secs);
        self.remaining = self.duration;
        self.is_overtime = false;
        self.running = true;
    }

    /// Continue counting from the current value after a `stop`.
    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance one second. No-op while stopped.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        self.remaining -= 1;
        if self.remaining < 0 && !self.is_overtime {
            self.is_overtime = true;
            return Some(TimerEvent::Expired);
        }
        None
    }

    /// Seconds counted since `start`, overtime included.
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        u64::try_from(self.duration - self.remaining).unwrap_or(0)
    }

    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    #[must_use]
    pub fn is_overtime(&self) -> bool {
        self.is_overtime
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        TimerState {
            remaining: self.remaining,
            is_overtime: self.is_overtime,
            running: self.running,
        }
    }

    #[must_use]
    pub fn level(&self) -> TimerLevel {
        if self.remaining <= i64::from(self.config.danger_secs) {
            TimerLevel::Danger
        } else if self.remaining <= i64::from(self.config.warning_secs) {
            TimerLevel::Warning
        } else {
            TimerLevel::Normal
        }
    }

    /// `MM:SS`, prefixed with `-` in overtime.
    #[must_use]
    pub fn display(&self) -> String {
        format_countdown(self.remaining)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

#[must_use]
pub fn format_countdown(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let magnitude = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", magnitude / 60, magnitude % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_duration_reaches_zero_without_overtime() {
        let mut timer = Timer::default();
        timer.start(1800);

        for _ in 0..1800 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_overtime());

        assert_eq!(timer.tick(), Some(TimerEvent::Expired));
        assert!(timer.is_overtime());
        assert_eq!(timer.remaining(), -1);
    }

    #[test]
    fn expired_is_emitted_once_and_counting_continues() {
        let mut timer = Timer::default();
        timer.start(2);
        let events: Vec<_> = (0..6).filter_map(|_| timer.tick()).collect();
        assert_eq!(events, vec![TimerEvent::Expired]);
        assert_eq!(timer.remaining(), -4);
        assert_eq!(timer.elapsed(), 6);
        assert_eq!(timer.display(), "-00:04");
    }

    #[test]
    fn stopped_timer_ignores_ticks_until_resumed() {
        let mut timer = Timer::default();
        timer.start(10);
        timer.tick();
        timer.stop();
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining(), 9);
        assert!(!timer.state().running);

        timer.resume();
        timer.tick();
        assert_eq!(timer.remaining(), 8);
        assert_eq!(timer.elapsed(), 2);
    }

    #[test]
    fn restart_clears_overtime() {
        let mut timer = Timer::default();
        timer.start(0);
        assert_eq!(timer.tick(), Some(TimerEvent::Expired));
        timer.start(5);
        assert!(!timer.is_overtime());
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn level_follows_thresholds() {
        let mut timer = Timer::default();
        timer.start(301);
        assert_eq!(timer.level(), TimerLevel::Normal);
        timer.tick();
        assert_eq!(timer.level(), TimerLevel::Warning);

        timer.start(61);
        timer.tick();
        assert_eq!(timer.level(), TimerLevel::Danger);

        timer.start(0);
        timer.tick();
        assert_eq!(timer.level(), TimerLevel::Danger);
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(-125), "-02:05");
    }
}
