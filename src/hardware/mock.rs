// Copyright (c) 2024 Mike Tsao

use super::{ParameterCurve, SessionPattern, StopReason, Transient};
use crate::traits::{HapticEngine, HapticSession, StoppedHandler};
use anyhow::anyhow;
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything a [MockEngine] was asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum MockEngineEvent {
    /// Engine number `.0` was created by the factory.
    EngineCreated(usize),
    #[allow(missing_docs)]
    EngineStarted(usize),
    #[allow(missing_docs)]
    EngineStopped(usize),
    #[allow(missing_docs)]
    SessionCreated {
        session: usize,
        pattern: SessionPattern,
    },
    #[allow(missing_docs)]
    SessionStarted(usize),
    #[allow(missing_docs)]
    CurveSent {
        session: usize,
        curve: ParameterCurve,
    },
    #[allow(missing_docs)]
    SessionStopped(usize),
    /// The session was released while still playing.
    SessionDropped(usize),
    #[allow(missing_docs)]
    TransientPlayed(Transient),
}

type SharedStoppedHandler = Arc<dyn Fn(StopReason) + Send + Sync>;

#[derive(Default)]
struct MockEngineState {
    events: Vec<MockEngineEvent>,
    engine_count: usize,
    session_count: usize,
    live_sessions: usize,
    max_live_sessions: usize,
    handlers: Vec<Option<SharedStoppedHandler>>,

    engine_creation_failures: usize,
    session_creation_failures: usize,
    reject_curves: bool,
}
impl core::fmt::Debug for MockEngineState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockEngineState")
            .field("events", &self.events.len())
            .field("engine_count", &self.engine_count)
            .field("session_count", &self.session_count)
            .field("live_sessions", &self.live_sessions)
            .finish()
    }
}

/// The test's end of a family of [MockEngine]s. Every engine the handle's
/// factory creates reports to it, so a test can inspect what happened across
/// resets, inject failures, and fake stop notifications.
#[derive(Clone, Debug, Default)]
pub struct MockEngineHandle(Arc<Mutex<MockEngineState>>);
impl MockEngineHandle {
    /// Returns a factory suitable for [Driver](crate::streaming::Driver).
    pub fn factory(&self) -> impl Fn() -> anyhow::Result<MockEngine> + Send + Sync + 'static {
        let handle = self.clone();
        move || handle.create_engine()
    }

    /// Creates an engine directly.
    pub fn create_engine(&self) -> anyhow::Result<MockEngine> {
        let mut state = self.0.lock();
        if state.engine_creation_failures > 0 {
            state.engine_creation_failures -= 1;
            return Err(anyhow!("haptics hardware is unavailable"));
        }
        let id = state.engine_count;
        state.engine_count += 1;
        state.handlers.push(None);
        state.events.push(MockEngineEvent::EngineCreated(id));
        Ok(MockEngine {
            id,
            handle: self.clone(),
        })
    }

    /// Makes the next `count` engine creations fail.
    pub fn fail_engine_creation(&self, count: usize) {
        self.0.lock().engine_creation_failures = count;
    }

    /// Makes the next `count` session creations fail.
    pub fn fail_session_creation(&self, count: usize) {
        self.0.lock().session_creation_failures = count;
    }

    /// Makes sessions reject (or accept again) every curve.
    pub fn reject_curves(&self, reject: bool) {
        self.0.lock().reject_curves = reject;
    }

    /// Simulates the most recently created engine stopping on its own.
    /// Returns false if that engine has no handler.
    pub fn notify_stopped(&self, reason: StopReason) -> bool {
        let latest = self.0.lock().engine_count.checked_sub(1);
        latest.is_some_and(|engine| self.notify_stopped_for(engine, reason))
    }

    /// Simulates the given engine stopping on its own.
    pub fn notify_stopped_for(&self, engine: usize, reason: StopReason) -> bool {
        // Don't hold our lock while the handler runs.
        let handler = self.0.lock().handlers.get(engine).cloned().flatten();
        if let Some(handler) = handler {
            handler(reason);
            true
        } else {
            false
        }
    }

    /// A copy of everything recorded so far.
    pub fn events(&self) -> Vec<MockEngineEvent> {
        self.0.lock().events.clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear_events(&self) {
        self.0.lock().events.clear();
    }

    #[allow(missing_docs)]
    pub fn engine_count(&self) -> usize {
        self.0.lock().engine_count
    }

    #[allow(missing_docs)]
    pub fn session_count(&self) -> usize {
        self.0.lock().session_count
    }

    /// Sessions that have been started and not yet stopped or released.
    pub fn live_sessions(&self) -> usize {
        self.0.lock().live_sessions
    }

    /// The most sessions that were ever playing at the same time.
    pub fn max_live_sessions(&self) -> usize {
        self.0.lock().max_live_sessions
    }

    /// Every pattern used to create a session, in order.
    pub fn session_patterns(&self) -> Vec<SessionPattern> {
        self.0
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MockEngineEvent::SessionCreated { pattern, .. } => Some(pattern.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every curve sent to a running session, in order.
    pub fn sent_curves(&self) -> Vec<(usize, ParameterCurve)> {
        self.0
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MockEngineEvent::CurveSent { session, curve } => Some((*session, curve.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: MockEngineEvent) {
        self.0.lock().events.push(event);
    }
}

/// A [HapticEngine] that records every call to its [MockEngineHandle]
/// instead of touching hardware.
#[derive(Debug)]
pub struct MockEngine {
    id: usize,
    handle: MockEngineHandle,
}
impl MockEngine {
    /// Which engine this is, counting from zero across the handle's factory.
    pub fn id(&self) -> usize {
        self.id
    }
}
impl HapticEngine for MockEngine {
    type Session = MockSession;

    fn start(&self) -> anyhow::Result<()> {
        self.handle.record(MockEngineEvent::EngineStarted(self.id));
        Ok(())
    }

    fn stop(&self) -> anyhow::Result<()> {
        self.handle.record(MockEngineEvent::EngineStopped(self.id));
        Ok(())
    }

    fn set_stopped_handler(&self, handler: StoppedHandler) {
        if let Some(slot) = self.handle.0.lock().handlers.get_mut(self.id) {
            *slot = Some(Arc::from(handler));
        }
    }

    fn create_session(&self, pattern: &SessionPattern) -> anyhow::Result<Self::Session> {
        let mut state = self.handle.0.lock();
        if state.session_creation_failures > 0 {
            state.session_creation_failures -= 1;
            return Err(anyhow!("engine refused to create a pattern player"));
        }
        let id = state.session_count;
        state.session_count += 1;
        state.events.push(MockEngineEvent::SessionCreated {
            session: id,
            pattern: pattern.clone(),
        });
        Ok(MockSession {
            id,
            handle: self.handle.clone(),
            is_live: false,
        })
    }

    fn play_transient(&self, transient: Transient) -> anyhow::Result<()> {
        self.handle
            .record(MockEngineEvent::TransientPlayed(transient));
        Ok(())
    }
}

/// The [HapticSession] that [MockEngine] creates.
#[derive(Debug)]
pub struct MockSession {
    id: usize,
    handle: MockEngineHandle,
    is_live: bool,
}
impl MockSession {
    #[allow(missing_docs)]
    pub fn id(&self) -> usize {
        self.id
    }
}
impl HapticSession for MockSession {
    fn start(&mut self) -> anyhow::Result<()> {
        if !self.is_live {
            let mut state = self.handle.0.lock();
            state.live_sessions += 1;
            state.max_live_sessions = state.max_live_sessions.max(state.live_sessions);
            state.events.push(MockEngineEvent::SessionStarted(self.id));
            self.is_live = true;
        }
        Ok(())
    }

    fn send_curve(&mut self, curve: &ParameterCurve) -> anyhow::Result<()> {
        let mut state = self.handle.0.lock();
        if !self.is_live {
            return Err(anyhow!("session {} isn't playing", self.id));
        }
        if state.reject_curves {
            return Err(anyhow!("session {} rejected the parameter curve", self.id));
        }
        state.events.push(MockEngineEvent::CurveSent {
            session: self.id,
            curve: curve.clone(),
        });
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        let mut state = self.handle.0.lock();
        if self.is_live {
            state.live_sessions -= 1;
            self.is_live = false;
        }
        state.events.push(MockEngineEvent::SessionStopped(self.id));
        Ok(())
    }
}
impl Drop for MockSession {
    fn drop(&mut self) {
        if self.is_live {
            let mut state = self.handle.0.lock();
            state.live_sessions -= 1;
            state.events.push(MockEngineEvent::SessionDropped(self.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{ControlPoint, ParameterId};
    use core::time::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pattern() -> SessionPattern {
        SessionPattern {
            duration: Duration::from_secs(30),
            curves: Vec::default(),
        }
    }

    #[test]
    fn records_session_lifecycle() {
        let handle = MockEngineHandle::default();
        let engine = handle.create_engine().unwrap();
        engine.start().unwrap();

        let mut session = engine.create_session(&pattern()).unwrap();
        let curve = ParameterCurve::new_with(
            ParameterId::Intensity,
            vec![ControlPoint::new_with(Duration::ZERO, 1.0)],
        );
        assert!(
            session.send_curve(&curve).is_err(),
            "unstarted sessions shouldn't accept curves"
        );

        session.start().unwrap();
        assert_eq!(handle.live_sessions(), 1);
        session.send_curve(&curve).unwrap();
        session.stop().unwrap();
        assert_eq!(handle.live_sessions(), 0);
        drop(session);

        assert_eq!(
            handle.events(),
            vec![
                MockEngineEvent::EngineCreated(0),
                MockEngineEvent::EngineStarted(0),
                MockEngineEvent::SessionCreated {
                    session: 0,
                    pattern: pattern()
                },
                MockEngineEvent::SessionStarted(0),
                MockEngineEvent::CurveSent { session: 0, curve },
                MockEngineEvent::SessionStopped(0),
            ]
        );
    }

    #[test]
    fn dropping_a_live_session_is_recorded() {
        let handle = MockEngineHandle::default();
        let engine = handle.create_engine().unwrap();
        let mut first = engine.create_session(&pattern()).unwrap();
        first.start().unwrap();
        let mut second = engine.create_session(&pattern()).unwrap();
        second.start().unwrap();
        assert_eq!(handle.max_live_sessions(), 2);

        drop(first);
        assert_eq!(handle.live_sessions(), 1);
        assert!(handle.events().contains(&MockEngineEvent::SessionDropped(0)));
    }

    #[test]
    fn injected_failures_run_out() {
        let handle = MockEngineHandle::default();
        handle.fail_engine_creation(1);
        assert!(handle.create_engine().is_err());
        let engine = handle.create_engine().unwrap();

        handle.fail_session_creation(2);
        assert!(engine.create_session(&pattern()).is_err());
        assert!(engine.create_session(&pattern()).is_err());
        assert!(engine.create_session(&pattern()).is_ok());
    }

    #[test]
    fn stop_notifications_reach_the_right_engine() {
        let handle = MockEngineHandle::default();
        let first = handle.create_engine().unwrap();
        let second = handle.create_engine().unwrap();
        assert!(!handle.notify_stopped(StopReason::IdleTimeout));

        let first_count = Arc::new(AtomicUsize::default());
        let second_count = Arc::new(AtomicUsize::default());
        let c = Arc::clone(&first_count);
        first.set_stopped_handler(Box::new(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        }));
        let c = Arc::clone(&second_count);
        second.set_stopped_handler(Box::new(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        }));

        assert!(handle.notify_stopped(StopReason::ApplicationSuspended));
        assert!(handle.notify_stopped_for(0, StopReason::SystemError));
        assert_eq!(first_count.load(Ordering::Relaxed), 1);
        assert_eq!(second_count.load(Ordering::Relaxed), 1);
    }
}
