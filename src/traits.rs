// Copyright (c) 2024 Mike Tsao

//! The seams of the system: what the upstream producer calls, what the
//! hardware engine has to provide, and how background services talk.

use crate::{
    error::HapticError,
    hardware::{ParameterCurve, SessionPattern, StopReason, Transient},
    types::{AmplitudeEvent, FrequencyEvent},
};
use crossbeam::channel::{Receiver, Sender};
use std::sync::Arc;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{HapticEngine, HapticSession, ProvidesService, StreamingDriver};
}

/// Invoked by a [HapticEngine] when it stops on its own.
pub type StoppedHandler = Box<dyn Fn(StopReason) + Send + Sync>;

/// Invoked on the control thread when playback stops for external reasons.
pub type StopCallback = Arc<dyn Fn() + Send + Sync>;

/// The capabilities the upstream core needs from whatever renders its event
/// stream. [Driver](crate::streaming::Driver) renders to real hardware;
/// [MockDriver](crate::streaming::MockDriver) just remembers what it was told.
///
/// Event handlers are called from the producer thread, the rest from the
/// control thread, so every method takes `&self`.
pub trait StreamingDriver: Send + Sync {
    /// Ramps the amplitude from wherever it is now to the event's amplitude
    /// over the event's duration.
    fn handle_amplitude_event(&self, event: AmplitudeEvent) -> Result<(), HapticError>;

    /// Same as [StreamingDriver::handle_amplitude_event()], but for frequency.
    fn handle_frequency_event(&self, event: FrequencyEvent) -> Result<(), HapticError>;

    /// Registers the callback to run when playback stops for external
    /// reasons, replacing any earlier one.
    fn set_stop_callback(&self, callback: StopCallback);

    /// Rebuilds everything underneath the driver. Calling it twice in a row is
    /// harmless.
    fn reset(&self) -> Result<(), HapticError>;
}

/// A platform haptic engine. It can create sessions, each of which plays for
/// a limited time before going dormant.
///
/// Implementations must never call the [StoppedHandler] synchronously from
/// inside one of their own methods. The handler takes the same lock that
/// guards calls into the engine.
pub trait HapticEngine: Send + Sync + 'static {
    /// A single playback session.
    type Session: HapticSession;

    /// Starts the engine.
    fn start(&self) -> anyhow::Result<()>;

    /// Stops the engine. Sessions created from it stop with it.
    fn stop(&self) -> anyhow::Result<()>;

    /// Registers the handler for stops the engine didn't get asked for.
    fn set_stopped_handler(&self, handler: StoppedHandler);

    /// Creates a session that begins with the given pattern. The session isn't
    /// playing until [HapticSession::start()] is called.
    fn create_session(&self, pattern: &SessionPattern) -> anyhow::Result<Self::Session>;

    /// Plays a one-off accent.
    fn play_transient(&self, transient: Transient) -> anyhow::Result<()>;
}

/// One playback session of a [HapticEngine].
pub trait HapticSession: Send {
    /// Begins playback immediately.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Replaces the given parameter's trajectory, starting now.
    fn send_curve(&mut self, curve: &ParameterCurve) -> anyhow::Result<()>;

    /// Stops playback. Returns once the session is silent.
    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Service methods.
///
/// A service is something that usually runs in its own thread as a daemon and
/// that communicates with clients by crossbeam channels. It accepts Inputs and
/// produces Events.
pub trait ProvidesService<I: core::fmt::Debug, E: core::fmt::Debug> {
    /// The sender side of the Input channel. Use this to send commands to the
    /// service.
    fn sender(&self) -> &Sender<I>;

    /// A convenience method to send Inputs to the service.
    fn send_input(&self, input: I) {
        if let Err(e) = self.sender().try_send(input) {
            log::warn!("While sending: {e:?}");
        }
    }

    /// The receiver side of the Event channel. Integrate this into a listener
    /// loop to respond to events.
    fn receiver(&self) -> &Receiver<E>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_driver_is_object_safe() {
        fn takes_driver(_driver: &dyn StreamingDriver) {}
        let driver = crate::streaming::MockDriver::default();
        takes_driver(&driver);
    }
}
