//! Session — терминальные фазы игры и отложенный рестарт
//!
//! Захват или победа переводят phase из Running в терминальную; все
//! gameplay-системы гейтятся на is_running(), так что конец игры
//! синхронно отменяет их «continuation'ы». Переживает конец игры только
//! обратный отсчёт рестарта.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::AudioCue;
use crate::components::MovementCommand;
use crate::SimulationSet;

/// Фаза сессии. Caught и Won терминальные — первый переход побеждает.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Running,
    Caught,
    Won,
}

/// Команда scene-control коллаборатору (перезагрузка уровня — opaque
/// действие engine-слоя)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    RestartLevel,
}

/// Задержки рестарта после конца игры
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    /// После захвата (секунды)
    pub capture_restart_delay: f32,
    /// После победы (секунды)
    pub success_restart_delay: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture_restart_delay: 1.0,
            success_restart_delay: 3.0,
        }
    }
}

/// Состояние сессии
#[derive(Resource, Debug, Clone)]
pub struct SessionState {
    phase: SessionPhase,
    /// Единственный continuation, переживающий конец игры
    restart_timer: Option<f32>,
    /// Halt уже выполнен (стоп движению, StopAll cue)
    halted: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Running,
            restart_timer: None,
            halted: false,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn player_caught(&self) -> bool {
        self.phase == SessionPhase::Caught
    }

    /// Перевод в терминальную фазу; повторные вызовы — no-op
    pub fn end(&mut self, phase: SessionPhase) {
        if self.is_running() && phase != SessionPhase::Running {
            self.phase = phase;
        }
    }
}

/// Система: halt всего gameplay на tick'е конца игры
///
/// Ровно один раз: стоп движению всех акторов, StopAll аудио-cue,
/// взводим таймер рестарта по причине конца.
pub fn halt_on_game_end(
    config: Res<SessionConfig>,
    mut session: ResMut<SessionState>,
    mut commands_query: Query<&mut MovementCommand>,
    mut cues: EventWriter<AudioCue>,
) {
    if session.is_running() || session.halted {
        return;
    }

    session.halted = true;

    for mut command in commands_query.iter_mut() {
        if *command != MovementCommand::Stop {
            *command = MovementCommand::Stop;
        }
    }

    cues.write(AudioCue::StopAll);

    let delay = if session.player_caught() {
        config.capture_restart_delay
    } else {
        config.success_restart_delay
    };
    session.restart_timer = Some(delay);
    crate::logger::log_info(&format!(
        "Session: game ended ({:?}), restart in {:.1}s",
        session.phase, delay
    ));
}

/// Система: обратный отсчёт рестарта → SceneCommand::RestartLevel
pub fn tick_restart_countdown(
    time: Res<Time<Fixed>>,
    mut session: ResMut<SessionState>,
    mut scene_commands: EventWriter<SceneCommand>,
) {
    let Some(timer) = session.restart_timer else {
        return;
    };

    let timer = timer - time.delta_secs();
    if timer <= 0.0 {
        // Таймер снят — команда уходит ровно один раз
        session.restart_timer = None;
        crate::logger::log_info("Session: restarting level");
        scene_commands.write(SceneCommand::RestartLevel);
    } else {
        session.restart_timer = Some(timer);
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionState>()
            .init_resource::<SessionConfig>()
            .add_event::<SceneCommand>()
            .add_systems(
                FixedUpdate,
                (halt_on_game_end, tick_restart_countdown)
                    .chain()
                    .in_set(SimulationSet::Session),
            );
    }
}
