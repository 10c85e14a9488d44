// Copyright (c) 2024 Mike Tsao

//! Provides version information about this crate. Based on the crate version,
//! or a version-control identifier if this is a development build.

// https://stackoverflow.com/a/65972328/344467
/// A string that's useful for logging which build of the streaming core is
/// driving the hardware.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .unwrap_or(option_env!("GIT_REV_PARSE").unwrap_or(env!("CARGO_PKG_VERSION")))
}
