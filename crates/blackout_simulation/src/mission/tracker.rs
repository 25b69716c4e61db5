//! Mission tracker — агрегат прогресса генераторов + условие победы
//!
//! Явный resource вместо singleton-менеджера: конструируется билдером
//! приложения и передаётся системам через DI, глобального состояния нет.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Player, Pose};
use crate::session::{SessionPhase, SessionState};

use super::{
    ExtractionReady, GeneratorActivated, GeneratorProgressChanged, MissionCompleted, ShowMessage,
};

/// Сколько секунд висит подсказка «все генераторы запущены»
const EXTRACTION_HINT_DURATION: f32 = 5.0;

/// Состояние миссии
///
/// Инварианты:
/// - activated_count ≤ total_generators (лишние activation'ы клампятся)
/// - all_activated монотонный: раз поднялся — не опускается
/// - completed терминальный и означает, что all_activated и
///   player_in_extraction_zone были истинны в одном tick'е
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    total_generators: usize,
    activated_count: usize,
    all_activated: bool,
    player_in_extraction_zone: bool,
    completed: bool,
}

impl Default for MissionState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MissionState {
    pub fn new(total_generators: usize) -> Self {
        Self {
            total_generators,
            activated_count: 0,
            all_activated: false,
            player_in_extraction_zone: false,
            completed: false,
        }
    }

    pub fn total_generators(&self) -> usize {
        self.total_generators
    }

    pub fn activated_count(&self) -> usize {
        self.activated_count
    }

    pub fn all_activated(&self) -> bool {
        self.all_activated
    }

    pub fn player_in_extraction_zone(&self) -> bool {
        self.player_in_extraction_zone
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

/// Зона эвакуации (лифт)
#[derive(Resource, Debug, Clone, Copy)]
pub struct ExtractionZone {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for ExtractionZone {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 2.0,
        }
    }
}

/// Система: учёт GeneratorActivated событий
///
/// Инкремент с клампом на total; на достижении total — one-shot
/// ExtractionReady + подсказка на HUD.
pub fn register_generator_activations(
    mut activations: EventReader<GeneratorActivated>,
    mut mission: ResMut<MissionState>,
    mut progress: EventWriter<GeneratorProgressChanged>,
    mut ready: EventWriter<ExtractionReady>,
    mut messages: EventWriter<ShowMessage>,
) {
    for activation in activations.read() {
        if mission.activated_count >= mission.total_generators {
            // Лишний activation счётчик не портит
            crate::logger::log_warning(&format!(
                "Mission: extra generator activation from {:?} ignored ({}/{})",
                activation.generator, mission.activated_count, mission.total_generators
            ));
            continue;
        }

        mission.activated_count += 1;
        crate::logger::log_info(&format!(
            "Mission: generator progress {}/{}",
            mission.activated_count, mission.total_generators
        ));
        progress.write(GeneratorProgressChanged {
            activated: mission.activated_count,
            total: mission.total_generators,
        });

        if mission.activated_count == mission.total_generators && !mission.all_activated {
            mission.all_activated = true;
            crate::logger::log_info("🎉 Mission: all generators activated, head to the elevator");
            ready.write(ExtractionReady);
            messages.write(ShowMessage {
                text: "All generators activated!\nHead to the elevator to escape!".to_string(),
                duration: EXTRACTION_HINT_DURATION,
            });
        }
    }
}

/// Система: в зоне ли игрок (каждый tick, edge-triggered лог)
pub fn update_extraction_zone(
    zone: Res<ExtractionZone>,
    session: Res<SessionState>,
    players: Query<&Pose, With<Player>>,
    mut mission: ResMut<MissionState>,
) {
    if !session.is_running() {
        return;
    }

    let Some(pose) = players.iter().next() else {
        return;
    };

    let was_inside = mission.player_in_extraction_zone;
    let inside = pose.position.distance(zone.center) <= zone.radius;

    if inside != was_inside {
        mission.player_in_extraction_zone = inside;
        if inside {
            if mission.all_activated {
                crate::logger::log_info("Mission: player entered the elevator, extraction ready");
            } else {
                crate::logger::log(&format!(
                    "Mission: player entered the elevator, {} generators remaining",
                    mission.total_generators - mission.activated_count
                ));
            }
        } else {
            crate::logger::log("Mission: player left the elevator zone");
        }
    }
}

/// Система: условие победы
///
/// Запускается ПОСЛЕ update_extraction_zone в том же tick'е (иначе
/// победа опоздает на tick). Срабатывает ровно один раз.
pub fn evaluate_win(
    mut mission: ResMut<MissionState>,
    mut session: ResMut<SessionState>,
    mut completed: EventWriter<MissionCompleted>,
) {
    if mission.completed || !session.is_running() {
        return;
    }

    if mission.all_activated && mission.player_in_extraction_zone {
        mission.completed = true;
        crate::logger::log_info("🎉 Mission complete: player escaped!");
        completed.write(MissionCompleted);
        // Стоп всем врагам + отложенный рестарт — через session-гейт
        session.end(SessionPhase::Won);
    }
}
