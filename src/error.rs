// Copyright (c) 2024 Mike Tsao

//! Errors reported while streaming.

use thiserror::Error;

/// What can go wrong while streaming. Each variant keeps the hardware layer's
/// own error as its source.
///
/// A stop reported by the engine isn't an error. It arrives through the stop
/// callback instead.
#[derive(Debug, Error)]
pub enum HapticError {
    /// The engine couldn't be created or started. The driver that reported it
    /// is unusable until a successful reset.
    #[error("haptic engine failed to initialize")]
    EngineInitialization(#[source] anyhow::Error),

    /// No replacement session could be created. Events keep failing with
    /// this error until a later rotation succeeds.
    #[error("couldn't create a replacement haptic session")]
    SessionRotation(#[source] anyhow::Error),

    /// The session rejected a single curve. The session itself is unaffected.
    #[error("haptic session rejected an event")]
    EventSubmission(#[source] anyhow::Error),
}
