// Copyright (c) 2024 Mike Tsao

use crate::{
    hardware::StopReason,
    traits::{ProvidesService, StopCallback},
    types::{BoundedCrossbeamChannel, CrossbeamChannel},
};
use crossbeam::channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How many unread [ControlServiceEvent]s are kept before new ones are
/// dropped.
pub const CONTROL_EVENT_BACKLOG: usize = 16;

#[allow(missing_docs)]
pub enum ControlServiceInput {
    /// The engine stopped for the given reason. Run the callback that was
    /// registered when the stop happened, if there was one.
    EngineStopped(StopReason, Option<StopCallback>),
    Quit,
}
impl core::fmt::Debug for ControlServiceInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControlServiceInput::EngineStopped(reason, callback) => f
                .debug_tuple("EngineStopped")
                .field(reason)
                .field(&callback.as_ref().map(|_| "(callback)"))
                .finish(),
            ControlServiceInput::Quit => f.write_str("Quit"),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, PartialEq)]
pub enum ControlServiceEvent {
    /// The stop callback was run (or there wasn't one to run).
    StopDispatched(StopReason),
    /// The stop callback panicked.
    CallbackPanicked(StopReason),
    Quit,
}

/// Runs stop callbacks on a thread of its own, so that neither the engine's
/// notification thread nor the producer's thread ever runs client code.
///
/// Events are reported for whoever listens. Once [CONTROL_EVENT_BACKLOG] of
/// them are waiting unread, later ones are discarded.
#[derive(Debug)]
pub struct ControlService {
    inputs: CrossbeamChannel<ControlServiceInput>,
    events: BoundedCrossbeamChannel<ControlServiceEvent>,
}
impl ProvidesService<ControlServiceInput, ControlServiceEvent> for ControlService {
    fn sender(&self) -> &Sender<ControlServiceInput> {
        &self.inputs.sender
    }

    fn receiver(&self) -> &Receiver<ControlServiceEvent> {
        &self.events.receiver
    }
}
impl Default for ControlService {
    fn default() -> Self {
        let r = Self {
            inputs: Default::default(),
            events: BoundedCrossbeamChannel::new_with(CONTROL_EVENT_BACKLOG),
        };
        r.spawn_thread();
        r
    }
}
impl ControlService {
    fn spawn_thread(&self) {
        let receiver = self.inputs.receiver.clone();
        let sender = self.events.sender.clone();
        std::thread::spawn(move || {
            ControlServiceDaemon { receiver, sender }.execute();
        });
    }
}
impl Drop for ControlService {
    fn drop(&mut self) {
        self.send_input(ControlServiceInput::Quit);
    }
}

struct ControlServiceDaemon {
    receiver: Receiver<ControlServiceInput>,
    sender: Sender<ControlServiceEvent>,
}
impl ControlServiceDaemon {
    fn execute(&mut self) {
        while let Ok(input) = self.receiver.recv() {
            match input {
                ControlServiceInput::EngineStopped(reason, callback) => {
                    let event = Self::dispatch(reason, callback);
                    self.report(event);
                }
                ControlServiceInput::Quit => {
                    self.report(ControlServiceEvent::Quit);
                    break;
                }
            }
        }
    }

    // Nobody is obliged to read events, so a full queue isn't an error.
    fn report(&self, event: ControlServiceEvent) {
        if let Err(e) = self.sender.try_send(event) {
            log::debug!("Discarding control event: {e:?}");
        }
    }

    fn dispatch(reason: StopReason, callback: Option<StopCallback>) -> ControlServiceEvent {
        let Some(callback) = callback else {
            log::info!("Haptic playback stopped ({reason}); no stop callback registered");
            return ControlServiceEvent::StopDispatched(reason);
        };
        log::info!("Haptic playback stopped ({reason}); notifying client");
        match catch_unwind(AssertUnwindSafe(|| callback())) {
            Ok(()) => ControlServiceEvent::StopDispatched(reason),
            Err(_) => {
                log::error!("Stop callback panicked");
                ControlServiceEvent::CallbackPanicked(reason)
            }
        }
    }
}
