// Copyright (c) 2024 Mike Tsao

use crate::{
    elements::Ramp,
    error::HapticError,
    hardware::{ParameterCurve, ParameterId, SessionPattern},
    traits::{HapticEngine, HapticSession},
    types::{Seconds, StreamEvent},
    util::StreamingSettings,
};
use anyhow::anyhow;
use core::{fmt::Debug, time::Duration};
use std::{sync::Arc, time::Instant};

/// A point-in-time copy of a [StreamPlayer]'s state, for inspection without
/// holding on to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    #[allow(missing_docs)]
    pub intensity: Ramp,
    #[allow(missing_docs)]
    pub sharpness: Ramp,
    #[allow(missing_docs)]
    pub has_active_session: bool,
    #[allow(missing_docs)]
    pub sleep_deadline: Option<Instant>,
    #[allow(missing_docs)]
    pub rotation_count: usize,
}

/// [StreamPlayer] turns a stream of events into one continuous intensity
/// trajectory and one continuous sharpness trajectory, and keeps them playing
/// on a hardware session.
///
/// Sessions go dormant a fixed time after they start. Rather than wait for
/// that, the player rotates: shortly before the deadline it stops the current
/// session and starts a new one seeded with the ramps exactly as they stand,
/// so playback carries on without a gap or a jump.
pub struct StreamPlayer<E: HapticEngine> {
    engine: Arc<E>,
    session: Option<E::Session>,

    // The moment the current session must be replaced. None if there's no
    // session.
    sleep_deadline: Option<Instant>,

    intensity: Ramp,
    sharpness: Ramp,

    origin: Instant,
    settings: StreamingSettings,
    rotation_count: usize,
}
impl<E: HapticEngine> Debug for StreamPlayer<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamPlayer")
            .field("session", &self.session.as_ref().map(|_| "(skipped)"))
            .field("sleep_deadline", &self.sleep_deadline)
            .field("intensity", &self.intensity)
            .field("sharpness", &self.sharpness)
            .field("rotation_count", &self.rotation_count)
            .finish()
    }
}
impl<E: HapticEngine> StreamPlayer<E> {
    /// Creates a player on the given engine. No session exists until the first
    /// event arrives.
    pub fn new_with(engine: Arc<E>, settings: StreamingSettings, now: Instant) -> Self {
        Self {
            engine,
            session: None,
            sleep_deadline: None,
            intensity: Ramp::new_at(now),
            sharpness: Ramp::new_at(now),
            origin: now,
            settings,
            rotation_count: 0,
        }
    }

    /// Makes sure a session will still be awake `lookahead` from `now`,
    /// rotating to a fresh one if it won't be (or if there isn't one).
    ///
    /// On failure the player is left without a session. The next call tries
    /// again.
    pub fn ensure_awake(&mut self, now: Instant, lookahead: Duration) -> Result<(), HapticError> {
        let needs_session = match (self.session.as_ref(), self.sleep_deadline) {
            (Some(_), Some(deadline)) => now
                .checked_add(lookahead)
                .map_or(true, |horizon| horizon >= deadline),
            _ => true,
        };
        if needs_session {
            self.rotate(now)
        } else {
            Ok(())
        }
    }

    /// Moves the ramps to a new session.
    fn rotate(&mut self, now: Instant) -> Result<(), HapticError> {
        let deadline = now
            .checked_add(self.settings.rotation_interval())
            .ok_or_else(|| {
                log::error!("Session lifetime is too long to schedule a rotation");
                HapticError::SessionRotation(anyhow!(
                    "session lifetime {} can't be represented",
                    self.settings.session_lifetime()
                ))
            })?;

        self.intensity.split(now);
        self.sharpness.split(now);

        // The old session must be silent before the new one starts, or two
        // sessions would drive the actuator at once.
        let is_rotation = self.stop_session();

        let pattern = SessionPattern {
            duration: self.settings.session_lifetime().to_duration(),
            curves: vec![
                ParameterCurve::from_ramp(ParameterId::Intensity, &self.intensity, now),
                ParameterCurve::from_ramp(ParameterId::Sharpness, &self.sharpness, now),
            ],
        };
        let session = self
            .engine
            .create_session(&pattern)
            .and_then(|mut session| {
                session.start()?;
                Ok(session)
            })
            .map_err(|e| {
                log::error!("Couldn't start a new haptic session: {e:#}");
                HapticError::SessionRotation(e)
            })?;

        self.session = Some(session);
        self.sleep_deadline = Some(deadline);
        if is_rotation {
            self.rotation_count += 1;
            log::debug!(
                "Rotated haptic session #{} at intensity {:.3}, sharpness {:.3}",
                self.rotation_count,
                self.intensity.start_value(),
                self.sharpness.start_value()
            );
        } else {
            log::debug!("Started haptic session");
        }
        Ok(())
    }

    /// Stops and releases the current session. Returns whether there was one.
    fn stop_session(&mut self) -> bool {
        self.sleep_deadline = None;
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.stop() {
                log::warn!("Releasing haptic session that failed to stop: {e:#}");
            }
            true
        } else {
            false
        }
    }

    /// Ramps `parameter` from its current value to `value` over `duration`,
    /// starting `now`.
    ///
    /// Rotation, if due, happens first, so the new segment is never split
    /// across two sessions. The intensity and sharpness ramps are independent.
    /// A rejected curve leaves the session in place.
    pub fn play_event(
        &mut self,
        parameter: ParameterId,
        now: Instant,
        duration: Duration,
        value: f32,
    ) -> Result<(), HapticError> {
        let lookahead = self.settings.lookahead().for_event(duration);
        self.ensure_awake(now, lookahead)?;

        let ramp = self.ramp_mut(parameter);
        ramp.chain(now, duration, value);
        let curve = ParameterCurve::from_ramp(parameter, ramp, now);

        let Some(session) = self.session.as_mut() else {
            return Err(HapticError::SessionRotation(anyhow!(
                "no active haptic session"
            )));
        };
        session
            .send_curve(&curve)
            .map_err(HapticError::EventSubmission)
    }

    /// Plays a streamed event, including its emphasis if it has one.
    pub fn play(&mut self, now: Instant, event: &StreamEvent) -> Result<(), HapticError> {
        if !Seconds::from(event.raw_duration()).is_valid_duration() {
            log::warn!(
                "Event at {} has unusable duration {}; treating it as instantaneous",
                event.time(),
                event.raw_duration()
            );
        }
        self.play_event(event.parameter(), now, event.duration(), event.value())?;
        if let Some(emphasis) = event.emphasis() {
            self.engine
                .play_transient(emphasis.into())
                .map_err(HapticError::EventSubmission)?;
        }
        Ok(())
    }

    /// Forgets the current session without stopping it, and returns both ramps
    /// to rest. Meant for when the engine underneath is being restarted, which
    /// takes its sessions with it.
    pub fn reset(&mut self) {
        self.session = None;
        self.sleep_deadline = None;
        self.intensity = Ramp::new_at(self.origin);
        self.sharpness = Ramp::new_at(self.origin);
    }

    fn ramp_mut(&mut self, parameter: ParameterId) -> &mut Ramp {
        match parameter {
            ParameterId::Intensity => &mut self.intensity,
            ParameterId::Sharpness => &mut self.sharpness,
        }
    }

    #[allow(missing_docs)]
    pub fn intensity(&self) -> &Ramp {
        &self.intensity
    }

    #[allow(missing_docs)]
    pub fn sharpness(&self) -> &Ramp {
        &self.sharpness
    }

    /// How many times a live session has been replaced.
    pub fn rotation_count(&self) -> usize {
        self.rotation_count
    }

    #[allow(missing_docs)]
    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    /// When the current session is due to be replaced.
    pub fn sleep_deadline(&self) -> Option<Instant> {
        self.sleep_deadline
    }

    #[allow(missing_docs)]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            intensity: self.intensity,
            sharpness: self.sharpness,
            has_active_session: self.has_active_session(),
            sleep_deadline: self.sleep_deadline,
            rotation_count: self.rotation_count,
        }
    }
}
