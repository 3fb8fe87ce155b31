//! Time source for transactions.

use std::time::{SystemTime, UNIX_EPOCH};

use tproof_core::Timestamp;

/// Where a chain reads the current time from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock seconds since the Unix epoch.
    #[default]
    System,
    /// A fixed time that only moves when told to.
    Manual(Timestamp),
}

impl Clock {
    pub fn manual(start: Timestamp) -> Self {
        Clock::Manual(start)
    }

    pub fn now(&self) -> Timestamp {
        match self {
            Clock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as Timestamp)
                .unwrap_or(0),
            Clock::Manual(t) => *t,
        }
    }

    /// Move time forward by `secs`. A system clock is frozen at its current
    /// reading first.
    pub fn advance(&mut self, secs: u64) {
        let now = self.now();
        *self = Clock::Manual(now.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX)));
    }

    /// Jump to `at`, freezing a system clock.
    pub fn set(&mut self, at: Timestamp) {
        *self = Clock::Manual(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut clock = Clock::manual(100);
        assert_eq!(clock.now(), 100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_advance_freezes_system_clock() {
        let mut clock = Clock::System;
        let before = clock.now();
        assert!(before > 1_600_000_000);

        clock.advance(60);
        let Clock::Manual(at) = clock else {
            panic!("expected a manual clock");
        };
        assert!(at >= before + 60);
    }

    #[test]
    fn test_advance_saturates() {
        let mut clock = Clock::manual(i64::MAX - 1);
        clock.advance(u64::MAX);
        assert_eq!(clock.now(), i64::MAX);
    }
}
