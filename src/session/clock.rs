use std::time::{Duration, Instant};

/// Wall-clock accounting for one session.
///
/// Two clocks: a monotonic session-wide seconds counter advanced by the
/// host's 1 Hz tick, and a per-question accumulator that resets on every
/// navigation into a different index. Both freeze while the host surface is
/// hidden, so a tab left open overnight never books hours against one
/// question.
///
/// Every method takes an explicit `now` so tests never sleep; the `*_now`
/// wrappers read `Instant::now()` for callers.
pub struct SessionClock {
    total_elapsed_seconds: u64,
    question_accumulated: Duration,
    question_started_at: Instant,
    visible: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            total_elapsed_seconds: 0,
            question_accumulated: Duration::ZERO,
            question_started_at: now,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Session-wide seconds. Monotonic, never reset.
    pub fn total_elapsed_seconds(&self) -> u64 {
        self.total_elapsed_seconds
    }

    /// Host-driven 1-second tick. Counts only while visible.
    pub fn tick(&mut self) {
        if self.visible {
            self.total_elapsed_seconds += 1;
        }
    }

    /// Visibility change from the host. Idempotent: repeated signals in the
    /// same direction are ignored.
    pub fn set_visible_at(&mut self, visible: bool, now: Instant) {
        if visible == self.visible {
            return;
        }
        if visible {
            self.question_started_at = now;
        } else {
            self.question_accumulated += now.saturating_duration_since(self.question_started_at);
        }
        self.visible = visible;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.set_visible_at(visible, Instant::now());
    }

    /// Restart the per-question clock on navigation into a new index.
    pub fn reset_question_at(&mut self, now: Instant) {
        self.question_accumulated = Duration::ZERO;
        self.question_started_at = now;
    }

    pub fn reset_question(&mut self) {
        self.reset_question_at(Instant::now());
    }

    /// Time attributable to the current question: the accumulator plus the
    /// live span only while visible. Hidden time never counts.
    pub fn question_elapsed_at(&self, now: Instant) -> Duration {
        let live = if self.visible {
            now.saturating_duration_since(self.question_started_at)
        } else {
            Duration::ZERO
        };
        self.question_accumulated + live
    }

    /// Whole seconds for the attempt's `time_spent_seconds` field.
    pub fn question_seconds_at(&self, now: Instant) -> u64 {
        let ms = self.question_elapsed_at(now).as_millis();
        ((ms + 500) / 1000) as u64
    }

    /// `mm:ss` for the shell's timer widget.
    pub fn format_elapsed(&self) -> String {
        format_seconds(self.total_elapsed_seconds)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_seconds(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
