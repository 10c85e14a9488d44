// Copyright (c) 2024 Mike Tsao

//! The vocabulary shared with a platform haptic engine, plus a [MockEngine]
//! that stands in for one.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ControlPoint, MockEngine, MockEngineEvent, MockEngineHandle, ParameterCurve, ParameterId,
        SessionPattern, StopReason, Transient,
    };
}

pub use {
    curve::{ControlPoint, ParameterCurve, ParameterId, SessionPattern, StopReason, Transient},
    mock::{MockEngine, MockEngineEvent, MockEngineHandle, MockSession},
};

mod curve;
mod mock;
