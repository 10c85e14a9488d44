// Copyright (c) 2024 Mike Tsao

//! Handles wall-clock time. Every [Instant] used for ramp and deadline math
//! comes from a monotonic source, so adjusting the system clock can't bend a
//! ramp or make a session outlive its deadline.

use core::{fmt::Debug, time::Duration};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use synonym::Synonym;

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of time.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }

    /// Converts to a [Duration]. Durations can't be negative, so negative and
    /// NaN values become zero, and values too large to represent saturate.
    pub fn to_duration(self) -> Duration {
        let seconds = self.0.max(0.0);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    /// Whether this value makes sense as a length of time.
    pub fn is_valid_duration(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}
impl From<f32> for Seconds {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<Seconds> for f32 {
    fn from(value: Seconds) -> Self {
        value.0 as f32
    }
}
impl From<Duration> for Seconds {
    fn from(value: Duration) -> Self {
        Self(value.as_secs_f64())
    }
}
impl From<Seconds> for Duration {
    fn from(value: Seconds) -> Self {
        value.to_duration()
    }
}

/// A source of monotonic time.
pub trait Clock: Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The [Clock] that production code uses.
#[derive(Debug, Default)]
pub struct MonotonicClock;
impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A [Clock] that moves only when told to. Tests use it to walk a stream
/// through session deadlines without waiting for them.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    now: Mutex<Instant>,
}
impl Default for ManualClock {
    fn default() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Mutex::new(origin),
        }
    }
}
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
impl ManualClock {
    /// The instant the clock was created at.
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }

    /// Sets the clock to the given amount of time after its origin. The clock
    /// refuses to go backward.
    pub fn set_elapsed(&self, elapsed: Seconds) {
        let mut now = self.now.lock();
        *now = (*now).max(self.origin + elapsed.to_duration());
    }

    /// How long the clock has run since its origin.
    pub fn elapsed(&self) -> Seconds {
        Seconds::from(self.now().duration_since(self.origin))
    }

    /// The instant at the given offset from the origin, regardless of where
    /// the clock currently is.
    pub fn at(&self, offset: Seconds) -> Instant {
        self.origin + offset.to_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_to_duration_never_goes_negative() {
        assert_eq!(Seconds(1.5).to_duration(), Duration::from_millis(1500));
        assert_eq!(Seconds(-3.0).to_duration(), Duration::ZERO);
        assert_eq!(Seconds(f64::NAN).to_duration(), Duration::ZERO);
        assert_eq!(Seconds(f64::INFINITY).to_duration(), Duration::MAX);

        assert!(Seconds(0.0).is_valid_duration());
        assert!(!Seconds(-0.1).is_valid_duration());
        assert!(!Seconds(f64::NAN).is_valid_duration());
    }

    #[test]
    fn manual_clock_moves_only_forward() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), clock.origin());

        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Seconds(2.0));

        clock.set_elapsed(Seconds(10.0));
        assert_eq!(clock.now(), clock.at(Seconds(10.0)));

        clock.set_elapsed(Seconds(5.0));
        assert_eq!(
            clock.now(),
            clock.at(Seconds(10.0)),
            "ManualClock should ignore requests to go back in time"
        );
    }
}
