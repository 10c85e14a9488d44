// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        AmplitudeEvent, Clock, Emphasis, FrequencyEvent, ManualClock, MonotonicClock, Seconds,
        StreamEvent,
    };
}

pub use {
    channels::{BoundedCrossbeamChannel, CrossbeamChannel},
    events::{AmplitudeEvent, Emphasis, FrequencyEvent, StreamEvent},
    time::{Clock, ManualClock, MonotonicClock, Seconds},
};

mod channels;
mod events;
mod time;
