// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::settings::{Lookahead, StreamingSettings, StreamingSettingsBuilder};
}

pub use settings::{
    Lookahead, StreamingSettings, StreamingSettingsBuilder, StreamingSettingsBuilderError,
};

mod settings;
