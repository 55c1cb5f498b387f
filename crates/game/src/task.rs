use rand::{seq::IndexedRandom, Rng};
use shared::{
    domain::{AssignedControl, ControlId, ControlKind, DeviceId},
    protocol::{ServerEvent, TaskView},
};
use tracing::info;

use crate::registry::SessionRegistry;

pub const SUCCESS_MESSAGE: &str = "SUPER! Problem gelöst! ⭐";

const PROBLEMS: &[&str] = &[
    "WARNUNG: Sauerstoff niedrig!",
    "ALARM: Energiekern überhitzt!",
    "ACHTUNG: Schilde schwach!",
    "GEFAHR: Antrieb ausgefallen!",
    "WARNUNG: Sensoren offline!",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub target_device: DeviceId,
    pub target_control: ControlId,
    pub target_value: i64,
    pub problem: String,
    pub instruction: String,
}

impl Task {
    pub fn matches(&self, device_id: DeviceId, control_id: &ControlId, value: i64) -> bool {
        self.target_device == device_id
            && self.target_control == *control_id
            && self.target_value == value
    }

    pub fn view(&self) -> TaskView {
        TaskView {
            problem: self.problem.clone(),
            instruction: self.instruction.clone(),
            target_device: self.target_device,
        }
    }

    pub fn announcement(&self) -> ServerEvent {
        ServerEvent::NewTask {
            problem: self.problem.clone(),
            instruction: self.instruction.clone(),
            target_device: self.target_device,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub matched: bool,
    pub score: u64,
}

/// Owns the single live task and the score.
#[derive(Debug)]
pub struct TaskEngine {
    game_active: bool,
    score: u64,
    reward: u64,
    current: Option<Task>,
}

impl TaskEngine {
    pub fn new(reward: u64) -> Self {
        Self {
            game_active: false,
            score: 0,
            reward,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    pub fn start(&mut self) {
        self.game_active = true;
        self.score = 0;
        self.current = None;
    }

    pub fn stop(&mut self) {
        self.game_active = false;
        self.current = None;
    }

    /// Issues a task against a random control of a random connected device.
    ///
    /// Returns `None` without touching the live task when the session is stopped or nobody is
    /// connected. Callers run this against current state, never a snapshot taken earlier.
    pub fn generate<C, R: Rng + ?Sized>(
        &mut self,
        registry: &SessionRegistry<C>,
        rng: &mut R,
    ) -> Option<&Task> {
        if !self.game_active {
            return None;
        }
        let device = registry.choose(rng)?;
        let control = device.controls.choose(rng)?;

        let target_value = target_value(control, rng);
        let task = Task {
            target_device: device.id,
            target_control: control.id.clone(),
            target_value,
            problem: PROBLEMS.choose(rng).copied().unwrap_or_default().to_string(),
            instruction: instruction(device.id, control, target_value),
        };
        info!(
            target_device = %task.target_device,
            target_control = %task.target_control,
            target_value,
            "task issued"
        );
        self.current = Some(task);
        self.current.as_ref()
    }

    /// Scores only the exact `(device, control, value)` triple of the live task. Near misses
    /// leave the task in place and are indistinguishable from any other miss.
    pub fn submit(&mut self, device_id: DeviceId, control_id: &ControlId, value: i64) -> Submission {
        let matched = self
            .current
            .as_ref()
            .is_some_and(|task| task.matches(device_id, control_id, value));
        if matched {
            self.score += self.reward;
            self.current = None;
            info!(%device_id, %control_id, score = self.score, "task solved");
        }
        Submission {
            matched,
            score: self.score,
        }
    }

    pub fn invalidate_if_targets(&mut self, device_id: DeviceId) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|task| task.target_device == device_id)
        {
            self.current = None;
            return true;
        }
        false
    }
}

pub fn target_value<R: Rng + ?Sized>(control: &AssignedControl, rng: &mut R) -> i64 {
    let (min, max) = (control.min_value, control.max_value);
    match control.kind {
        ControlKind::Slider | ControlKind::Dial | ControlKind::Switch => rng.random_range(min..=max),
        ControlKind::Toggle => {
            if rng.random_bool(0.5) {
                max
            } else {
                min
            }
        }
        // the resting value is never a valid push-button target
        ControlKind::PushButton if max > min => rng.random_range(min + 1..=max),
        ControlKind::PushButton => max,
    }
}

fn type_label(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Switch | ControlKind::Toggle => "Schalter",
        ControlKind::Slider => "Regler",
        ControlKind::PushButton => "Knopf",
        ControlKind::Dial => "Drehregler",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn instruction(device_id: DeviceId, control: &AssignedControl, target_value: i64) -> String {
    let device = device_id.to_string().to_uppercase();
    let color = capitalize(&control.color);
    let label = &control.label;

    match control.kind {
        ControlKind::Slider | ControlKind::Dial => format!(
            "{device}: Stelle den {color} {} '{label}' auf Stufe {target_value}.",
            type_label(control.kind)
        ),
        ControlKind::Toggle => {
            let state = if target_value == control.max_value {
                "AN"
            } else {
                "AUS"
            };
            format!("{device}: Schalte '{label}' ({color}) auf {state}.")
        }
        ControlKind::Switch => {
            format!("{device}: Schalte '{label}' ({color}) auf Position {target_value}.")
        }
        ControlKind::PushButton => {
            format!("{device}: Drücke '{label}' ({color}) bis Anzeige {target_value} leuchtet.")
        }
    }
}

#[cfg(test)]
#[path = "tests/task_tests.rs"]
mod tests;
