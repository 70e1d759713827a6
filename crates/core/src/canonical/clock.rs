//! The single source of "current time" for every component that stamps output.

use chrono::{DateTime, Utc};
use tally_shared::config::RuntimeConfig;

/// Injectable clock.
///
/// Components never call `Utc::now()` directly; they hold a `Clock` so that
/// deterministic mode can freeze time for reproducible digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// A frozen instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Clock frozen at the Unix epoch.
    #[must_use]
    pub const fn deterministic() -> Self {
        Self::Fixed(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Resolves the clock from the runtime's deterministic-mode flag.
    ///
    /// This is the only place the flag is read.
    #[must_use]
    pub fn from_runtime(runtime: &RuntimeConfig) -> Self {
        if runtime.deterministic {
            Self::deterministic()
        } else {
            Self::System
        }
    }

    /// The current instant according to this clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(instant) => *instant,
        }
    }

    /// Returns true if time is frozen at the epoch.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        *self == Self::deterministic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deterministic_clock_returns_epoch() {
        let clock = Clock::deterministic();
        assert_eq!(clock.now().timestamp_millis(), 0);
        assert_eq!(clock.now(), clock.now());
        assert!(clock.is_deterministic());
    }

    #[test]
    fn test_from_runtime_flag() {
        let mut runtime = RuntimeConfig::default();
        assert_eq!(Clock::from_runtime(&runtime), Clock::System);

        runtime.deterministic = true;
        assert_eq!(Clock::from_runtime(&runtime), Clock::deterministic());
    }

    #[test]
    fn test_fixed_clock_is_not_deterministic_mode() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let clock = Clock::Fixed(instant);
        assert_eq!(clock.now(), instant);
        assert!(!clock.is_deterministic());
    }
}
