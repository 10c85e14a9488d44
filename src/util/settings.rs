// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::types::Seconds;
use anyhow::anyhow;
use core::time::Duration;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How far ahead of an event a session has to stay awake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lookahead {
    /// Rotate only once the deadline has actually arrived.
    #[default]
    Immediate,
    /// Rotate when the deadline is less than this far away.
    Fixed(Seconds),
    /// Rotate when the deadline would fall inside the event's own ramp, so a
    /// long segment is never cut short by dormancy.
    EventDuration,
}
impl Lookahead {
    /// The lookahead for an event of the given duration.
    pub fn for_event(&self, event_duration: Duration) -> Duration {
        match self {
            Lookahead::Immediate => Duration::ZERO,
            Lookahead::Fixed(seconds) => seconds.to_duration(),
            Lookahead::EventDuration => event_duration,
        }
    }
}

/// Timing of the session-rotation policy.
///
/// The defaults match the platform engine this crate was written against,
/// whose pattern players go dormant 30 seconds after starting.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize, Builder)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct StreamingSettings {
    /// How long a session plays before it involuntarily goes dormant.
    #[derivative(Default(value = "Seconds(30.0)"))]
    #[builder(default = "Seconds(30.0)")]
    session_lifetime: Seconds,

    /// How long before dormancy a session gets replaced.
    #[derivative(Default(value = "Seconds(1.0)"))]
    #[builder(default = "Seconds(1.0)")]
    safety_margin: Seconds,

    /// See [Lookahead].
    #[builder(default)]
    lookahead: Lookahead,
}
impl StreamingSettingsBuilder {
    /// Builds the item.
    pub fn build(&self) -> Result<StreamingSettings, StreamingSettingsBuilderError> {
        let settings = self.build_from_builder()?;
        settings
            .validate()
            .map_err(|e| StreamingSettingsBuilderError::ValidationError(e.to_string()))?;
        Ok(settings)
    }
}
impl StreamingSettings {
    /// Parses and validates settings from JSON. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to JSON.
    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Confirms that a session could actually be rotated before it goes
    /// dormant with these settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.session_lifetime.is_valid_duration() || self.session_lifetime.0 == 0.0 {
            return Err(anyhow!(
                "session lifetime must be positive (got {})",
                self.session_lifetime
            ));
        }
        if Duration::try_from_secs_f64(self.session_lifetime.0).is_err() {
            return Err(anyhow!(
                "session lifetime is too long (got {})",
                self.session_lifetime
            ));
        }
        if !self.safety_margin.is_valid_duration() {
            return Err(anyhow!(
                "safety margin can't be negative (got {})",
                self.safety_margin
            ));
        }
        if self.safety_margin.0 >= self.session_lifetime.0 {
            return Err(anyhow!(
                "safety margin ({}) must be shorter than the session lifetime ({})",
                self.safety_margin,
                self.session_lifetime
            ));
        }
        if let Lookahead::Fixed(seconds) = self.lookahead {
            if !seconds.is_valid_duration() {
                return Err(anyhow!("fixed lookahead can't be negative (got {seconds})"));
            }
        }
        Ok(())
    }

    /// How long a session plays before it involuntarily goes dormant.
    pub fn session_lifetime(&self) -> Seconds {
        self.session_lifetime
    }

    /// How long before dormancy a session gets replaced.
    pub fn safety_margin(&self) -> Seconds {
        self.safety_margin
    }

    #[allow(missing_docs)]
    pub fn lookahead(&self) -> Lookahead {
        self.lookahead
    }

    /// How long after a session starts it should be rotated out.
    pub fn rotation_interval(&self) -> Duration {
        self.session_lifetime
            .to_duration()
            .saturating_sub(self.safety_margin.to_duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = StreamingSettings::default();
        assert_eq!(settings.session_lifetime(), Seconds(30.0));
        assert_eq!(settings.safety_margin(), Seconds(1.0));
        assert_eq!(settings.lookahead(), Lookahead::Immediate);
        assert_eq!(settings.rotation_interval(), Duration::from_secs(29));
        assert!(settings.validate().is_ok());

        assert_eq!(
            StreamingSettingsBuilder::default().build().unwrap(),
            settings,
            "builder defaults should match Default"
        );
    }

    #[test]
    fn builder_validates() {
        assert!(StreamingSettingsBuilder::default()
            .session_lifetime(Seconds(10.0))
            .safety_margin(Seconds(0.5))
            .lookahead(Lookahead::Fixed(Seconds(0.25)))
            .build()
            .is_ok());
        assert!(StreamingSettingsBuilder::default()
            .session_lifetime(Seconds(1.0))
            .safety_margin(Seconds(1.0))
            .build()
            .is_err());
        assert!(StreamingSettingsBuilder::default()
            .session_lifetime(Seconds(0.0))
            .build()
            .is_err());
        assert!(StreamingSettingsBuilder::default()
            .lookahead(Lookahead::Fixed(Seconds(-1.0)))
            .build()
            .is_err());
    }

    #[test]
    fn json_round_trip_uses_kebab_case() {
        let settings = StreamingSettings::from_json_str(
            r#"{"session-lifetime": 20.0, "lookahead": "event-duration"}"#,
        )
        .unwrap();
        assert_eq!(settings.session_lifetime(), Seconds(20.0));
        assert_eq!(settings.safety_margin(), Seconds(1.0));
        assert_eq!(settings.lookahead(), Lookahead::EventDuration);

        let json = settings.to_json_string().unwrap();
        assert!(json.contains("safety-margin"));
        assert_eq!(StreamingSettings::from_json_str(&json).unwrap(), settings);

        assert!(StreamingSettings::from_json_str(r#"{"safety-margin": 45.0}"#).is_err());
        assert!(StreamingSettings::from_json_str(r#"{"session-lifetime": 1e20}"#).is_err());
        assert!(StreamingSettings::from_json_str("not json").is_err());
    }

    #[test]
    fn lookahead_policies() {
        let event = Duration::from_secs(5);
        assert_eq!(Lookahead::Immediate.for_event(event), Duration::ZERO);
        assert_eq!(
            Lookahead::Fixed(Seconds(0.5)).for_event(event),
            Duration::from_millis(500)
        );
        assert_eq!(Lookahead::EventDuration.for_event(event), event);
    }
}
