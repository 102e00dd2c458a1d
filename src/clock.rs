//! Wall-clock abstraction so progress timestamps are deterministic in tests

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for progress updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Real system time
    #[default]
    System,
    /// Frozen at a fixed instant (advanced manually)
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// A clock frozen at the given instant
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Current time according to this clock
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Self::Fixed(at) = self {
            *at += delta;
        }
    }
}
