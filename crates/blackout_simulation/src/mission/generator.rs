//! Generator — hold-to-activate мини-игра
//!
//! Lifecycle: Idle → Activating → Activated (терминальный, монотонный).
//! Отпустил раньше времени — прогресс сгорает и фаза откатывается в
//! Idle; Activated назад не откатывается никогда.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::NoiseEvent;
use crate::components::Pose;
use crate::session::SessionState;

use super::{GeneratorActivated, GeneratorCue, GeneratorCueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum GeneratorPhase {
    Idle,
    Activating,
    /// Терминальная фаза — выбор/отпускание дальше игнорируются
    Activated,
}

/// Генератор на уровне
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[require(Pose, SelectableState)]
pub struct Generator {
    pub phase: GeneratorPhase,
    /// Прогресс запуска, 0..=1
    pub progress: f32,
    /// Сколько секунд держать до полного запуска
    pub activation_time: f32,
    /// Радиус шума при завершении запуска (уходит в NoiseEvent)
    pub completion_noise_radius: f32,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            phase: GeneratorPhase::Idle,
            progress: 0.0,
            activation_time: 16.0,
            completion_noise_radius: 15.0,
        }
    }
}

impl Generator {
    pub fn is_activated(&self) -> bool {
        self.phase == GeneratorPhase::Activated
    }
}

/// Capability-интерфейс интерактивного объекта
///
/// Пишется interaction-слоем (XR grab/hover), читается симуляцией.
/// Явная замена runtime-поиску «Interactable» по имени типа.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SelectableState {
    pub is_selected: bool,
    pub is_hovered: bool,
}

/// Система: прогресс запуска генераторов
///
/// Держим select → прогресс растёт; отпустили — сброс в ноль.
/// На Activating→Activated ровно один GeneratorActivated + шум на всю
/// округу (радиус completion_noise_radius).
pub fn advance_generators(
    time: Res<Time<Fixed>>,
    session: Res<SessionState>,
    mut generators: Query<(Entity, &mut Generator, &SelectableState, &Pose)>,
    mut activations: EventWriter<GeneratorActivated>,
    mut noises: EventWriter<NoiseEvent>,
    mut cues: EventWriter<GeneratorCue>,
) {
    if !session.is_running() {
        return;
    }

    let delta = time.delta_secs();

    for (entity, mut generator, selectable, pose) in generators.iter_mut() {
        match (generator.phase, selectable.is_selected) {
            // Терминальная фаза — никаких реакций на select
            (GeneratorPhase::Activated, _) => {}

            (GeneratorPhase::Idle, true) => {
                generator.phase = GeneratorPhase::Activating;
                cues.write(GeneratorCue {
                    generator: entity,
                    kind: GeneratorCueKind::Startup,
                });
                crate::logger::log(&format!("Generator {:?}: activation started", entity));
            }

            (GeneratorPhase::Idle, false) => {}

            (GeneratorPhase::Activating, false) => {
                // Бросили раньше времени — прогресс сгорает
                generator.phase = GeneratorPhase::Idle;
                generator.progress = 0.0;
                cues.write(GeneratorCue {
                    generator: entity,
                    kind: GeneratorCueKind::Fault,
                });
                crate::logger::log(&format!("Generator {:?}: activation aborted", entity));
            }

            (GeneratorPhase::Activating, true) => {
                generator.progress =
                    (generator.progress + delta / generator.activation_time).clamp(0.0, 1.0);

                if generator.progress >= 1.0 {
                    generator.phase = GeneratorPhase::Activated;
                    cues.write(GeneratorCue {
                        generator: entity,
                        kind: GeneratorCueKind::Running,
                    });
                    activations.write(GeneratorActivated { generator: entity });
                    // Запустившийся генератор громыхает на всю округу
                    noises.write(NoiseEvent {
                        position: pose.position,
                        loudness_radius: generator.completion_noise_radius,
                    });
                    crate::logger::log_info(&format!(
                        "Generator {:?}: activation complete",
                        entity
                    ));
                }
            }
        }
    }
}
