// Copyright (c) 2024 Mike Tsao

use core::time::Duration;
use std::time::Instant;

/// A [Ramp] is a straight line between two breakpoints: it starts at
/// `start_value` at `start_time` and arrives at `end_value` at `end_time`.
/// Outside that interval it holds whichever end is nearer.
///
/// A stream of events becomes a continuous signal by repeatedly calling
/// [Ramp::chain()]. Each call starts a new segment from wherever the previous
/// one currently is, so the signal never jumps even if a segment is
/// interrupted before it finishes.
///
/// Values aren't range-checked here. Keeping them within what the hardware
/// accepts is the producer's job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    start_time: Instant,
    end_time: Instant,
    start_value: f32,
    end_value: f32,
}
impl Ramp {
    /// Where a segment ends if its duration can't be added to an [Instant].
    /// Over a century the ramp is effectively flat.
    pub const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

    /// Creates a zero-length [Ramp] sitting at zero.
    pub fn new_at(when: Instant) -> Self {
        Self {
            start_time: when,
            end_time: when,
            start_value: 0.0,
            end_value: 0.0,
        }
    }

    /// Returns the value of the ramp at `when`.
    pub fn value_at(&self, when: Instant) -> f32 {
        if when >= self.end_time {
            return self.end_value;
        }
        if when <= self.start_time {
            return self.start_value;
        }
        let elapsed = (when - self.start_time).as_secs_f64();
        let total = self.duration().as_secs_f64();
        let fraction = (elapsed / total) as f32;
        self.start_value + (self.end_value - self.start_value) * fraction
    }

    /// Starts a new segment at `now` that begins at the ramp's current value
    /// and reaches `end_value` after `duration`. Any segment still in flight is
    /// abandoned where it stands.
    pub fn chain(&mut self, now: Instant, duration: Duration, end_value: f32) {
        self.start_value = self.value_at(now);
        self.start_time = now;
        self.end_time = now
            .checked_add(duration)
            .or_else(|| now.checked_add(Self::FAR_FUTURE))
            .unwrap_or(now);
        self.end_value = end_value;
    }

    /// The length of the current segment.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// How much of the current segment is left at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.end_time.saturating_duration_since(now)
    }

    /// Re-anchors the ramp at `now` without changing where it's headed. The
    /// trajectory is unchanged, so a ramp that's handed over to a new session
    /// picks up exactly where the old session left it.
    pub fn split(&mut self, now: Instant) {
        self.start_value = self.value_at(now);
        self.start_time = now;
        if self.end_time < now {
            self.end_time = now;
        }
    }

    #[allow(missing_docs)]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    #[allow(missing_docs)]
    pub fn end_time(&self) -> Instant {
        self.end_time
    }

    #[allow(missing_docs)]
    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    #[allow(missing_docs)]
    pub fn end_value(&self) -> f32 {
        self.end_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use more_asserts::{assert_ge, assert_le};

    fn secs(origin: Instant, seconds: f64) -> Instant {
        origin + Duration::from_secs_f64(seconds)
    }

    #[test]
    fn empty_ramp_is_zero_everywhere() {
        let origin = Instant::now();
        let ramp = Ramp::new_at(origin);
        assert_eq!(ramp.duration(), Duration::ZERO);
        assert_eq!(ramp.value_at(origin), 0.0);
        assert_eq!(ramp.value_at(secs(origin, 100.0)), 0.0);
    }

    #[test]
    fn chain_from_rest_hits_midpoint() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(10), 0.8);

        assert!(approx_eq!(
            f32,
            ramp.value_at(secs(origin, 5.0)),
            0.4,
            epsilon = 1e-6
        ));
        assert_eq!(ramp.value_at(origin), 0.0);
        assert_eq!(ramp.value_at(secs(origin, 10.0)), 0.8);
    }

    #[test]
    fn values_clamp_outside_the_segment() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(secs(origin, 1.0), Duration::from_secs(2), 1.0);

        assert_eq!(ramp.value_at(origin), 0.0, "before start holds start_value");
        assert_eq!(ramp.value_at(secs(origin, 50.0)), 1.0, "after end holds end_value");
    }

    #[test]
    fn chain_always_yields_requested_duration_and_target() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        let steps = [(0.0, 3.0, 0.2), (1.0, 0.5, 0.9), (1.2, 10.0, -0.4), (7.5, 0.0, 0.6)];
        for (now, duration, value) in steps {
            let now = secs(origin, now);
            let duration = Duration::from_secs_f64(duration);
            ramp.chain(now, duration, value);
            assert_eq!(ramp.duration(), duration);
            assert_eq!(ramp.value_at(now + duration), value);
        }
    }

    #[test]
    fn chain_starts_where_the_interrupted_segment_was() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(10), 1.0);

        let interruption = secs(origin, 2.5);
        let current = ramp.value_at(interruption);
        ramp.chain(interruption, Duration::from_secs(1), 0.0);

        assert_eq!(ramp.start_value(), current);
        assert!(approx_eq!(f32, current, 0.25, epsilon = 1e-6));
        assert_eq!(ramp.value_at(interruption), current);
    }

    #[test]
    fn zero_duration_jumps_immediately() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(secs(origin, 1.0), Duration::ZERO, 0.7);

        assert_eq!(ramp.duration(), Duration::ZERO);
        assert_eq!(ramp.value_at(secs(origin, 1.0)), 0.7);
        assert_eq!(ramp.value_at(secs(origin, 2.0)), 0.7);
    }

    #[test]
    fn value_is_monotonic_in_the_direction_of_travel() {
        let origin = Instant::now();
        for target in [1.0f32, -1.0] {
            let mut ramp = Ramp::new_at(origin);
            ramp.chain(origin, Duration::from_secs(1), target);

            let mut previous = ramp.value_at(origin);
            for i in 1..=100 {
                let value = ramp.value_at(secs(origin, i as f64 / 100.0));
                if target > 0.0 {
                    assert_ge!(value, previous);
                } else {
                    assert_le!(value, previous);
                }
                previous = value;
            }
            assert_eq!(previous, target);
        }
    }

    #[test]
    fn split_preserves_trajectory() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(4), 2.0);
        let end_time = ramp.end_time();

        let split_at = secs(origin, 1.0);
        let before = ramp.value_at(split_at);
        let later = ramp.value_at(secs(origin, 3.0));
        ramp.split(split_at);

        assert_eq!(ramp.start_time(), split_at);
        assert_eq!(ramp.start_value(), before);
        assert_eq!(ramp.value_at(split_at), before);
        assert_eq!(ramp.end_time(), end_time);
        assert_eq!(ramp.end_value(), 2.0);
        assert!(approx_eq!(
            f32,
            ramp.value_at(secs(origin, 3.0)),
            later,
            epsilon = 1e-6
        ));
    }

    #[test]
    fn split_after_end_keeps_end_value() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(1), 0.5);

        let late = secs(origin, 5.0);
        ramp.split(late);
        assert_eq!(ramp.start_value(), 0.5);
        assert_eq!(ramp.end_value(), 0.5);
        assert_eq!(ramp.duration(), Duration::ZERO);
        assert_eq!(ramp.value_at(late), 0.5);
    }

    #[test]
    fn unrepresentable_duration_saturates_instead_of_jumping() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::MAX, 1.0);

        assert_ge!(ramp.duration(), Ramp::FAR_FUTURE);
        assert_eq!(ramp.value_at(origin), 0.0);
        assert_le!(ramp.value_at(secs(origin, 60.0)), 1e-6);
        assert_eq!(ramp.end_value(), 1.0);
    }

    #[test]
    fn remaining_counts_down() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(3), 1.0);
        assert_eq!(ramp.remaining(origin), Duration::from_secs(3));
        assert_eq!(ramp.remaining(secs(origin, 2.0)), Duration::from_secs(1));
        assert_eq!(ramp.remaining(secs(origin, 9.0)), Duration::ZERO);
    }
}
