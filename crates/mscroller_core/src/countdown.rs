/// Identifies one interval timer owned by the agent.
pub type TimerId = u64;

/// Spacing between countdown ticks and panel clock refreshes.
pub const TICK_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownPurpose {
    /// Navigate to `url` when the countdown runs out.
    NextChapter { url: String },
    /// Resume scrolling on a page reached through auto-advance.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(u32),
    Finished,
}

/// A visible countdown driven by a one-second interval timer.
///
/// The agent stores it in an `Option` and removes it when it finishes, so
/// the timer behind it is released exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    purpose: CountdownPurpose,
    remaining: u32,
    timer: TimerId,
}

impl Countdown {
    pub fn new(purpose: CountdownPurpose, seconds: u32, timer: TimerId) -> Self {
        Self {
            purpose,
            remaining: seconds,
            timer,
        }
    }

    pub fn purpose(&self) -> &CountdownPurpose {
        &self.purpose
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    pub fn tick(&mut self) -> CountdownTick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            CountdownTick::Remaining(self.remaining)
        } else {
            CountdownTick::Finished
        }
    }

    pub fn message(&self) -> String {
        match self.purpose {
            CountdownPurpose::NextChapter { .. } => format!("Next chapter in {}...", self.remaining),
            CountdownPurpose::Continue => format!("Continuing in {}...", self.remaining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_second_countdown_finishes_on_third_tick() {
        let mut countdown = Countdown::new(CountdownPurpose::Continue, 3, 7);
        assert_eq!(countdown.message(), "Continuing in 3...");
        assert_eq!(countdown.tick(), CountdownTick::Remaining(2));
        assert_eq!(countdown.tick(), CountdownTick::Remaining(1));
        assert_eq!(countdown.tick(), CountdownTick::Finished);
        assert_eq!(countdown.tick(), CountdownTick::Finished);
    }
}
