// Copyright (c) 2024 Mike Tsao

use super::{
    control::{ControlService, ControlServiceEvent, ControlServiceInput},
    player::{PlayerSnapshot, StreamPlayer},
};
use crate::{
    error::HapticError,
    hardware::StopReason,
    traits::{HapticEngine, ProvidesService, StopCallback, StreamingDriver},
    types::{AmplitudeEvent, Clock, FrequencyEvent, MonotonicClock, Seconds, StreamEvent},
    util::{Lookahead, StreamingSettings},
};
use crossbeam::channel::{Receiver, Sender};
use delegate::delegate;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use strum_macros::{Display, IntoStaticStr};

/// Creates a fresh engine each time the [Driver] needs one.
pub type EngineFactory<E> = Box<dyn Fn() -> anyhow::Result<E> + Send + Sync>;

/// Whether a [Driver] is playing events or ignoring them.
#[derive(Clone, Copy, Debug, Display, Eq, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum DriverStatus {
    /// Events are rendered.
    Running,
    /// The engine stopped. Events succeed without doing anything until the
    /// next [Driver::reset()].
    Stopped,
}

// Everything the producer and control threads both touch. It's one unit
// because the status decides whether the player may be used at all.
struct DriverShared<E: HapticEngine> {
    status: DriverStatus,
    engine: Option<Arc<E>>,
    player: Option<StreamPlayer<E>>,

    // Bumped by every reset, so that a stop reported by an engine we've since
    // replaced can be told apart from one reported by the current engine.
    generation: u64,

    // Read at the moment a stop episode begins, so a callback registered
    // afterward only applies to later episodes.
    stop_callback: Option<StopCallback>,
}

/// [Driver] renders a stream of events on a [HapticEngine], and survives the
/// engine stopping underneath it.
///
/// The producer thread calls the event handlers. The control thread calls
/// [Driver::reset()] and [Driver::set_stop_callback()]. When the engine stops
/// on its own, the driver goes quiet and the stop callback runs on the
/// driver's control service thread.
pub struct Driver<E: HapticEngine> {
    factory: EngineFactory<E>,
    settings: StreamingSettings,
    clock: Arc<dyn Clock>,

    shared: Arc<Mutex<DriverShared<E>>>,
    control: ControlService,
}
impl<E: HapticEngine> core::fmt::Debug for Driver<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("Driver")
            .field("status", &shared.status)
            .field("generation", &shared.generation)
            .field("player", &shared.player)
            .field("settings", &self.settings)
            .finish()
    }
}
impl<E: HapticEngine> Driver<E> {
    /// Creates and starts an engine, then a player on it.
    pub fn new_with(
        factory: impl Fn() -> anyhow::Result<E> + Send + Sync + 'static,
        settings: StreamingSettings,
    ) -> Result<Self, HapticError> {
        Self::new_with_clock(factory, settings, Arc::new(MonotonicClock))
    }

    /// Same as [Driver::new_with()], but telling time with the given [Clock].
    pub fn new_with_clock(
        factory: impl Fn() -> anyhow::Result<E> + Send + Sync + 'static,
        settings: StreamingSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HapticError> {
        log::info!("Starting haptic driver {}", crate::app_version());
        let r = Self {
            factory: Box::new(factory),
            settings,
            clock,
            shared: Arc::new(Mutex::new(DriverShared {
                status: DriverStatus::Stopped,
                engine: None,
                player: None,
                generation: 0,
                stop_callback: None,
            })),
            control: ControlService::default(),
        };
        r.reset()?;
        Ok(r)
    }

    delegate! {
        to self.settings {
            /// How long a session plays before it goes dormant.
            pub fn session_lifetime(&self) -> Seconds;
            /// How long before dormancy a session gets replaced.
            pub fn safety_margin(&self) -> Seconds;
            #[allow(missing_docs)]
            pub fn lookahead(&self) -> Lookahead;
        }
    }

    #[allow(missing_docs)]
    pub fn status(&self) -> DriverStatus {
        self.shared.lock().status
    }

    /// A copy of the player's state, or None if a failed reset left the driver
    /// without one.
    pub fn player_snapshot(&self) -> Option<PlayerSnapshot> {
        self.shared
            .lock()
            .player
            .as_ref()
            .map(|player| player.snapshot())
    }

    /// Reports each stop the control service dispatches.
    pub fn control_events(&self) -> &Receiver<ControlServiceEvent> {
        self.control.receiver()
    }

    fn handle_event(&self, event: StreamEvent) -> Result<(), HapticError> {
        let mut shared = self.shared.lock();
        if shared.status == DriverStatus::Stopped {
            return Ok(());
        }
        let now = self.clock.now();
        match shared.player.as_mut() {
            Some(player) => player.play(now, &event),
            None => Ok(()),
        }
    }

    // Produces an engine that is started and wired to report stops for the
    // given generation.
    fn start_engine(&self, generation: u64) -> anyhow::Result<Arc<E>> {
        let engine = (self.factory)()?;
        engine.set_stopped_handler(Self::stopped_handler(
            Arc::downgrade(&self.shared),
            generation,
            self.control.sender().clone(),
        ));
        engine.start()?;
        Ok(Arc::new(engine))
    }

    fn stopped_handler(
        shared: Weak<Mutex<DriverShared<E>>>,
        generation: u64,
        control: Sender<ControlServiceInput>,
    ) -> Box<dyn Fn(StopReason) + Send + Sync> {
        Box::new(move |reason| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let episode_callback = {
                let mut shared = shared.lock();
                if shared.generation != generation {
                    log::debug!("Ignoring stop ({reason}) from a replaced engine");
                    return;
                }
                if shared.status != DriverStatus::Running {
                    return;
                }
                shared.status = DriverStatus::Stopped;
                shared.stop_callback.clone()
            };
            log::info!("Haptic engine stopped: {reason}");
            if let Err(e) =
                control.try_send(ControlServiceInput::EngineStopped(reason, episode_callback))
            {
                log::warn!("Couldn't dispatch engine stop: {e:?}");
            }
        })
    }
}
impl<E: HapticEngine> StreamingDriver for Driver<E> {
    fn handle_amplitude_event(&self, event: AmplitudeEvent) -> Result<(), HapticError> {
        self.handle_event(event.into())
    }

    fn handle_frequency_event(&self, event: FrequencyEvent) -> Result<(), HapticError> {
        self.handle_event(event.into())
    }

    fn set_stop_callback(&self, callback: StopCallback) {
        self.shared.lock().stop_callback = Some(callback);
    }

    fn reset(&self) -> Result<(), HapticError> {
        let mut shared = self.shared.lock();
        shared.generation += 1;
        shared.status = DriverStatus::Stopped;

        // The old engine takes its sessions down with it, so the player's
        // session is released rather than stopped.
        if let Some(mut player) = shared.player.take() {
            player.reset();
        }
        if let Some(engine) = shared.engine.take() {
            if let Err(e) = engine.stop() {
                log::warn!("Previous haptic engine failed to stop: {e:#}");
            }
        }

        let engine = self.start_engine(shared.generation).map_err(|e| {
            log::error!("Couldn't start haptic engine: {e:#}");
            HapticError::EngineInitialization(e)
        })?;
        shared.player = Some(StreamPlayer::new_with(
            Arc::clone(&engine),
            self.settings.clone(),
            self.clock.now(),
        ));
        shared.engine = Some(engine);
        shared.status = DriverStatus::Running;
        log::info!("Haptic driver running (generation {})", shared.generation);
        Ok(())
    }
}
impl<E: HapticEngine> Drop for Driver<E> {
    fn drop(&mut self) {
        let mut shared = self.shared.lock();
        shared.status = DriverStatus::Stopped;
        shared.player = None;
        if let Some(engine) = shared.engine.take() {
            if let Err(e) = engine.stop() {
                log::warn!("Haptic engine failed to stop: {e:#}");
            }
        }
    }
}
