// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! haptic-stream plays a live stream of amplitude and frequency events on a
//! haptic engine whose playback sessions go dormant after a fixed time.
//!
//! * [Ramp] turns a stream of targets into a continuous signal.
//! * [StreamPlayer] keeps an intensity ramp and a sharpness ramp playing on a
//! session, and replaces the session shortly before it would go dormant
//! without a jump in either signal.
//! * [Driver] wraps a [StreamPlayer] with the engine's lifecycle: it survives
//! the engine stopping on its own, tells the client through a stop callback,
//! and rebuilds everything on [reset()](traits::StreamingDriver::reset).
//!
//! Upstream code talks only to the [StreamingDriver](traits::StreamingDriver)
//! trait, so it can be handed a
//! [MockDriver](streaming::MockDriver) in tests.

/// A collection of imports that are useful to users of this crate. `use
/// haptic_stream::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        elements::prelude::*, error::HapticError, hardware::prelude::*, streaming::prelude::*,
        traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    elements::Ramp,
    error::HapticError,
    streaming::{Driver, StreamPlayer},
    version::app_version,
};

pub mod elements;
pub mod error;
pub mod hardware;
pub mod streaming;
pub mod traits;
pub mod types;
pub mod util;

mod version;
