// Copyright (c) 2024 Mike Tsao

//! Turning a stream of events into uninterrupted playback on hardware whose
//! sessions expire.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Driver, DriverStatus, MockDriver, PlayerSnapshot, StreamPlayer};
}

pub use {
    control::{ControlService, ControlServiceEvent, ControlServiceInput, CONTROL_EVENT_BACKLOG},
    driver::{Driver, DriverStatus, EngineFactory},
    mock::MockDriver,
    player::{PlayerSnapshot, StreamPlayer},
};

mod control;
mod driver;
mod mock;
mod player;
