// Copyright (c) 2024 Mike Tsao

//! The events that an upstream clip decoder streams into a
//! [StreamingDriver](crate::traits::StreamingDriver). Each one says where a
//! parameter should be, and how long it should take to get there.

use crate::{hardware::ParameterId, types::Seconds};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// An accent played at the start of an amplitude event, on top of the
/// continuous signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Emphasis {
    /// Strength of the accent, 0.0..=1.0.
    pub amplitude: f32,
    /// Sharpness of the accent, 0.0..=1.0.
    pub frequency: f32,
}

/// A change in amplitude from wherever it currently is to `amplitude`, spread
/// over `duration` seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AmplitudeEvent {
    /// Start of the event as an offset in seconds from the start of the clip.
    pub time: f32,
    /// Length of the change, in seconds.
    pub duration: f32,
    /// The amplitude at the end of the change.
    pub amplitude: f32,
    /// Optional accent at the start of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
}
#[allow(missing_docs)]
impl AmplitudeEvent {
    pub fn new_with(time: f32, duration: f32, amplitude: f32) -> Self {
        Self {
            time,
            duration,
            amplitude,
            emphasis: None,
        }
    }

    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = Some(emphasis);
        self
    }
}

/// Same as [AmplitudeEvent], but for frequency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyEvent {
    /// Start of the event as an offset in seconds from the start of the clip.
    pub time: f32,
    /// Length of the change, in seconds.
    pub duration: f32,
    /// The frequency at the end of the change.
    pub frequency: f32,
}
#[allow(missing_docs)]
impl FrequencyEvent {
    pub fn new_with(time: f32, duration: f32, frequency: f32) -> Self {
        Self {
            time,
            duration,
            frequency,
        }
    }
}

/// Either kind of streamed event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamEvent {
    #[allow(missing_docs)]
    Amplitude(AmplitudeEvent),
    #[allow(missing_docs)]
    Frequency(FrequencyEvent),
}
impl StreamEvent {
    /// The hardware parameter this event drives.
    pub fn parameter(&self) -> ParameterId {
        match self {
            StreamEvent::Amplitude(_) => ParameterId::Intensity,
            StreamEvent::Frequency(_) => ParameterId::Sharpness,
        }
    }

    /// The clip offset the producer scheduled this event for.
    pub fn time(&self) -> f32 {
        match self {
            StreamEvent::Amplitude(event) => event.time,
            StreamEvent::Frequency(event) => event.time,
        }
    }

    /// The duration exactly as the producer sent it.
    pub fn raw_duration(&self) -> f32 {
        match self {
            StreamEvent::Amplitude(event) => event.duration,
            StreamEvent::Frequency(event) => event.duration,
        }
    }

    /// The duration as a [Duration]. Anything that isn't a finite,
    /// non-negative number of seconds becomes zero.
    pub fn duration(&self) -> Duration {
        let seconds = Seconds::from(self.raw_duration());
        if seconds.is_valid_duration() {
            seconds.to_duration()
        } else {
            Duration::ZERO
        }
    }

    /// The target value at the end of the event.
    pub fn value(&self) -> f32 {
        match self {
            StreamEvent::Amplitude(event) => event.amplitude,
            StreamEvent::Frequency(event) => event.frequency,
        }
    }

    /// The accent to play with this event, if any.
    pub fn emphasis(&self) -> Option<Emphasis> {
        match self {
            StreamEvent::Amplitude(event) => event.emphasis,
            StreamEvent::Frequency(_) => None,
        }
    }
}
impl From<AmplitudeEvent> for StreamEvent {
    fn from(value: AmplitudeEvent) -> Self {
        StreamEvent::Amplitude(value)
    }
}
impl From<FrequencyEvent> for StreamEvent {
    fn from(value: FrequencyEvent) -> Self {
        StreamEvent::Frequency(value)
    }
}
