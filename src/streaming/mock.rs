// Copyright (c) 2024 Mike Tsao

use crate::{
    error::HapticError,
    traits::{StopCallback, StreamingDriver},
    types::{AmplitudeEvent, FrequencyEvent, StreamEvent},
};
use parking_lot::Mutex;

#[derive(Default)]
struct MockDriverState {
    events: Vec<StreamEvent>,
    stop_callback: Option<StopCallback>,
    reset_count: usize,
}

/// A [StreamingDriver] that doesn't render anything. It remembers the events
/// it was given so that an upstream core can be tested without hardware.
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockDriverState>,
}
impl core::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockDriver")
            .field("events", &state.events)
            .field("has_stop_callback", &state.stop_callback.is_some())
            .field("reset_count", &state.reset_count)
            .finish()
    }
}
impl MockDriver {
    /// Every event received since the last reset, in order.
    pub fn events(&self) -> Vec<StreamEvent> {
        self.state.lock().events.clone()
    }

    #[allow(missing_docs)]
    pub fn reset_count(&self) -> usize {
        self.state.lock().reset_count
    }

    /// Runs the registered stop callback, as a real driver would when its
    /// engine stops. Returns false if there isn't one.
    pub fn simulate_stop(&self) -> bool {
        let callback = self.state.lock().stop_callback.clone();
        if let Some(callback) = callback {
            callback();
            true
        } else {
            false
        }
    }
}
impl StreamingDriver for MockDriver {
    fn handle_amplitude_event(&self, event: AmplitudeEvent) -> Result<(), HapticError> {
        self.state.lock().events.push(event.into());
        Ok(())
    }

    fn handle_frequency_event(&self, event: FrequencyEvent) -> Result<(), HapticError> {
        self.state.lock().events.push(event.into());
        Ok(())
    }

    fn set_stop_callback(&self, callback: StopCallback) {
        self.state.lock().stop_callback = Some(callback);
    }

    fn reset(&self) -> Result<(), HapticError> {
        let mut state = self.state.lock();
        state.events.clear();
        state.reset_count += 1;
        Ok(())
    }
}
