use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use rand::{rngs::StdRng, SeedableRng};
use shared::{
    domain::{AssignedControl, ControlId, DeviceId},
    protocol::{ClientMessage, ServerEvent, SessionStatus},
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    catalog::ControlCatalog,
    pool::ControlPool,
    registry::SessionRegistry,
    task::{Submission, Task, TaskEngine, SUCCESS_MESSAGE},
};

/// Outbound half of a device connection. The connection's writer task drains the receiver.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub controls_per_device: usize,
    pub reward: u64,
    pub cooldown: Duration,
    /// Fixed seed for reproducible sessions; `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            controls_per_device: 6,
            reward: 10,
            cooldown: Duration::from_secs(2),
            rng_seed: None,
        }
    }
}

/// Handed to the transport when a device connects. `events` starts with the `init` frame.
#[derive(Debug)]
pub struct DeviceSession {
    pub device_id: DeviceId,
    pub controls: Vec<AssignedControl>,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

struct SessionState {
    registry: SessionRegistry<Outbox>,
    engine: TaskEngine,
    rng: StdRng,
    cooldown: Option<JoinHandle<()>>,
    // bumped on start/stop so a cooldown scheduled in an earlier session never fires
    epoch: u64,
}

impl SessionState {
    fn broadcast(&self, event: &ServerEvent) {
        for device in self.registry.iter() {
            if device.connection().send(event.clone()).is_err() {
                debug!(device_id = %device.id, "dropping event for closed connection");
            }
        }
    }

    fn issue_task(&mut self) -> bool {
        let Self {
            registry,
            engine,
            rng,
            ..
        } = self;
        let Some(event) = engine.generate(registry, rng).map(Task::announcement) else {
            return false;
        };
        self.broadcast(&event);
        true
    }

    /// Restarts the task loop when an active session has nothing live and nothing pending.
    fn resume_if_idle(&mut self) {
        if self.engine.is_active() && self.engine.current().is_none() && self.cooldown.is_none() {
            self.issue_task();
        }
    }

    fn cancel_cooldown(&mut self) {
        if let Some(pending) = self.cooldown.take() {
            pending.abort();
        }
    }

    fn snapshot(&self) -> SessionStatus {
        SessionStatus {
            game_active: self.engine.is_active(),
            score: self.engine.score(),
            device_count: self.registry.len(),
            task: self.engine.current().map(Task::view),
        }
    }
}

struct Inner {
    config: GameConfig,
    state: Mutex<SessionState>,
    status: watch::Sender<SessionStatus>,
}

/// Cloneable handle to the one game session.
///
/// Every operation takes the state lock, mutates, queues outbound frames and releases the lock
/// before returning; nothing awaits while holding it. Methods that can complete a task spawn the
/// cooldown timer and must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(config: GameConfig, catalog: ControlCatalog) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = SessionState {
            registry: SessionRegistry::new(ControlPool::new(catalog), config.controls_per_device),
            engine: TaskEngine::new(config.reward),
            rng,
            cooldown: None,
            epoch: 0,
        };
        let (status, _) = watch::channel(state.snapshot());

        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(state),
                status,
            }),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) -> SessionStatus {
        let status = state.snapshot();
        self.inner.status.send_replace(status.clone());
        status
    }

    pub fn connect(&self) -> DeviceSession {
        let (outbox, events) = mpsc::unbounded_channel();
        let mut state = self.lock();

        let SessionState { registry, rng, .. } = &mut *state;
        let device = registry.register(outbox, rng);
        let device_id = device.id;
        let controls = device.controls.clone();
        let _ = device.connection().send(ServerEvent::Init {
            device_id,
            controls: controls.clone(),
        });
        info!(%device_id, devices = registry.len(), "device connected");

        state.resume_if_idle();
        self.publish(&state);
        DeviceSession {
            device_id,
            controls,
            events,
        }
    }

    pub fn disconnect(&self, device_id: DeviceId) {
        let mut state = self.lock();
        if state.registry.unregister(device_id).is_none() {
            return;
        }
        info!(%device_id, devices = state.registry.len(), "device disconnected");

        if state.engine.invalidate_if_targets(device_id) {
            info!(%device_id, "live task invalidated");
            state.resume_if_idle();
        }
        self.publish(&state);
    }

    /// Decodes one text frame from `device_id`. Malformed frames are dropped.
    pub fn handle_text(&self, device_id: DeviceId, text: &str) -> Option<Submission> {
        match ClientMessage::decode(text) {
            Ok(message) => self.handle_message(device_id, message),
            Err(error) => {
                debug!(%device_id, %error, "ignoring malformed frame");
                None
            }
        }
    }

    pub fn handle_message(&self, device_id: DeviceId, message: ClientMessage) -> Option<Submission> {
        match message {
            ClientMessage::ControlChange { control_id, value } => {
                Some(self.submit_change(device_id, &control_id, value))
            }
            ClientMessage::Ignored => {
                debug!(%device_id, "ignoring unknown message type");
                None
            }
        }
    }

    pub fn submit_change(&self, device_id: DeviceId, control_id: &ControlId, value: i64) -> Submission {
        let mut state = self.lock();
        if let Some(control) = state
            .registry
            .get_mut(device_id)
            .and_then(|device| device.control_mut(control_id))
        {
            control.position = value.clamp(control.min_value, control.max_value);
        }

        let submission = state.engine.submit(device_id, control_id, value);
        if submission.matched {
            state.broadcast(&ServerEvent::Success {
                message: SUCCESS_MESSAGE.to_string(),
                score: submission.score,
            });
            self.schedule_next_task(&mut state);
        }
        self.publish(&state);
        submission
    }

    fn schedule_next_task(&self, state: &mut SessionState) {
        state.cancel_cooldown();
        let epoch = state.epoch;
        let delay = self.inner.config.cooldown;
        let coordinator = self.clone();
        state.cooldown = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.finish_cooldown(epoch);
        }));
    }

    fn finish_cooldown(&self, epoch: u64) {
        let mut state = self.lock();
        if state.epoch != epoch {
            return;
        }
        state.cooldown = None;
        state.issue_task();
        self.publish(&state);
    }

    pub fn start_session(&self) -> SessionStatus {
        let mut state = self.lock();
        state.cancel_cooldown();
        state.epoch += 1;
        state.engine.start();
        info!(devices = state.registry.len(), "session started");

        state.broadcast(&ServerEvent::SessionState {
            active: true,
            score: 0,
        });
        state.issue_task();
        self.publish(&state)
    }

    pub fn stop_session(&self) -> SessionStatus {
        let mut state = self.lock();
        state.cancel_cooldown();
        state.epoch += 1;
        state.engine.stop();
        info!(score = state.engine.score(), "session stopped");

        state.broadcast(&ServerEvent::SessionState {
            active: false,
            score: state.engine.score(),
        });
        self.publish(&state)
    }

    /// Issues a task now if the session is active and someone is connected.
    pub fn generate_task(&self) -> bool {
        let mut state = self.lock();
        let issued = state.issue_task();
        self.publish(&state);
        issued
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    pub fn current_task(&self) -> Option<Task> {
        self.lock().engine.current().cloned()
    }

    pub fn device_controls(&self, device_id: DeviceId) -> Option<Vec<AssignedControl>> {
        self.lock()
            .registry
            .get(device_id)
            .map(|device| device.controls.clone())
    }

    pub fn is_cooling_down(&self) -> bool {
        self.lock().cooldown.is_some()
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
