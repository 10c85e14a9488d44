// Copyright (c) 2024 Mike Tsao

use crate::{elements::Ramp, types::Emphasis};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// The continuous parameters a haptic session can be steered with.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ParameterId {
    /// Driven by amplitude events.
    Intensity,
    /// Driven by frequency events.
    Sharpness,
}
impl ParameterId {
    /// Converts a producer-side value into what the device expects. Perceived
    /// vibration strength grows with the square of the intensity control, so
    /// amplitudes go through a square root. Sharpness passes straight through.
    pub fn device_value(&self, value: f32) -> f32 {
        match self {
            ParameterId::Intensity => value.max(0.0).sqrt(),
            ParameterId::Sharpness => value,
        }
    }
}

/// One breakpoint of a [ParameterCurve], `offset` after the curve starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    #[allow(missing_docs)]
    pub offset: Duration,
    #[allow(missing_docs)]
    pub value: f32,
}
impl ControlPoint {
    #[allow(missing_docs)]
    pub fn new_with(offset: Duration, value: f32) -> Self {
        Self { offset, value }
    }
}

/// A piecewise-linear trajectory for one parameter, relative to the moment
/// the session receives it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterCurve {
    #[allow(missing_docs)]
    pub parameter: ParameterId,
    #[allow(missing_docs)]
    pub points: Vec<ControlPoint>,
}
impl ParameterCurve {
    #[allow(missing_docs)]
    pub fn new_with(parameter: ParameterId, points: Vec<ControlPoint>) -> Self {
        Self { parameter, points }
    }

    /// Builds the curve for whatever part of `ramp` is still ahead of `now`.
    /// A ramp that has already arrived becomes a single point at its target.
    pub fn from_ramp(parameter: ParameterId, ramp: &Ramp, now: Instant) -> Self {
        let remaining = ramp.remaining(now);
        let end = ControlPoint::new_with(remaining, parameter.device_value(ramp.end_value()));
        let points = if remaining.is_zero() {
            vec![end]
        } else {
            vec![
                ControlPoint::new_with(Duration::ZERO, parameter.device_value(ramp.value_at(now))),
                end,
            ]
        };
        Self { parameter, points }
    }

    /// How long the curve takes to play out.
    pub fn duration(&self) -> Duration {
        self.points
            .last()
            .map(|point| point.offset)
            .unwrap_or_default()
    }

    /// The value at the start of the curve.
    pub fn first_value(&self) -> Option<f32> {
        self.points.first().map(|point| point.value)
    }

    /// The value the curve settles on.
    pub fn last_value(&self) -> Option<f32> {
        self.points.last().map(|point| point.value)
    }
}

/// Everything a new session needs at creation: how long its continuous
/// carrier runs, and the curves that put it in the right place from the first
/// instant.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionPattern {
    #[allow(missing_docs)]
    pub duration: Duration,
    #[allow(missing_docs)]
    pub curves: Vec<ParameterCurve>,
}
impl SessionPattern {
    /// The seeded curve for the given parameter, if there is one.
    pub fn curve(&self, parameter: ParameterId) -> Option<&ParameterCurve> {
        self.curves.iter().find(|curve| curve.parameter == parameter)
    }
}

/// A short, sharp accent played alongside the continuous signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transient {
    #[allow(missing_docs)]
    pub intensity: f32,
    #[allow(missing_docs)]
    pub sharpness: f32,
}
impl From<Emphasis> for Transient {
    fn from(value: Emphasis) -> Self {
        Self {
            intensity: ParameterId::Intensity.device_value(value.amplitude),
            sharpness: ParameterId::Sharpness.device_value(value.frequency),
        }
    }
}

/// Why an engine stopped on its own.
#[derive(Clone, Copy, Debug, Display, Eq, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum StopReason {
    /// Another part of the system took over the audio session.
    AudioSessionInterrupt,
    /// The host suspended the application, for example by sending it to the
    /// background.
    ApplicationSuspended,
    /// The engine went idle for too long.
    IdleTimeout,
    /// The platform's haptic server failed.
    SystemError,
    /// The engine was torn down underneath us.
    EngineDestroyed,
    /// Anything the platform reports that isn't listed above.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn intensity_is_perceptually_mapped() {
        assert_eq!(ParameterId::Intensity.device_value(0.25), 0.5);
        assert_eq!(ParameterId::Intensity.device_value(-1.0), 0.0);
        assert_eq!(ParameterId::Sharpness.device_value(0.25), 0.25);

        let names: Vec<&'static str> = ParameterId::iter().map(|p| p.into()).collect();
        assert_eq!(names, vec!["intensity", "sharpness"]);
    }

    #[test]
    fn curve_from_ramp_covers_what_is_left() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::from_secs(4), 1.0);

        let now = origin + Duration::from_secs(1);
        let curve = ParameterCurve::from_ramp(ParameterId::Sharpness, &ramp, now);
        assert_eq!(curve.points.len(), 2);
        assert_eq!(curve.duration(), Duration::from_secs(3));
        assert!(approx_eq!(
            f32,
            curve.first_value().unwrap(),
            0.25,
            epsilon = 1e-6
        ));
        assert_eq!(curve.last_value(), Some(1.0));
    }

    #[test]
    fn finished_ramp_becomes_single_point() {
        let origin = Instant::now();
        let mut ramp = Ramp::new_at(origin);
        ramp.chain(origin, Duration::ZERO, 0.25);

        let curve = ParameterCurve::from_ramp(ParameterId::Intensity, &ramp, origin);
        assert_eq!(
            curve.points,
            vec![ControlPoint::new_with(Duration::ZERO, 0.5)]
        );
        assert_eq!(curve.duration(), Duration::ZERO);
    }

    #[test]
    fn transient_from_emphasis() {
        let transient = Transient::from(Emphasis {
            amplitude: 0.81,
            frequency: 0.2,
        });
        assert!(approx_eq!(f32, transient.intensity, 0.9, epsilon = 1e-6));
        assert_eq!(transient.sharpness, 0.2);
        assert_eq!(StopReason::ApplicationSuspended.to_string(), "application-suspended");
    }
}
