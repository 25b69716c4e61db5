//! AI reaction systems (шумовая шина → investigation).

use bevy::prelude::*;

use crate::ai::{EnemyState, EnemyStateChanged, NoiseEvent, PerceptionMemory};
use crate::components::{Enemy, Pose};
use crate::session::SessionState;

use super::fsm::transition;

/// Система: реакция врагов на NoiseEvent
///
/// Доставка синхронная, в том же tick'е, каждому живому врагу:
/// - Skip: враг в Chasing (сосредоточен на игроке) или игра закончена
/// - Иначе: latch investigation-цели + ЖЁСТКИЙ override текущего state
///   (Waiting и Searching прерываются немедленно, не «флаг до
///   следующего tick'а»)
///
/// Затухание по loudness_radius посчитано и залогировано, но доставку
/// не ограничивает — реагируют все враги на уровне.
pub fn react_to_noise(
    session: Res<SessionState>,
    mut noises: EventReader<NoiseEvent>,
    mut enemies: Query<(Entity, &Pose, &mut EnemyState, &mut PerceptionMemory), With<Enemy>>,
    mut changes: EventWriter<EnemyStateChanged>,
) {
    for noise in noises.read() {
        if !session.is_running() {
            continue;
        }

        for (entity, pose, mut state, mut memory) in enemies.iter_mut() {
            if matches!(*state, EnemyState::Chasing { .. }) {
                crate::logger::log(&format!(
                    "🔊 {:?} ignores noise at {:?} (busy chasing)",
                    entity, noise.position
                ));
                continue;
            }

            let distance = pose.distance_to(noise.position);
            crate::logger::log(&format!(
                "🔊 {:?} heard noise at {:?}, distance {:.1}m (radius {:.1}m) → investigating",
                entity, noise.position, distance, noise.loudness_radius
            ));

            memory.pending_investigation = Some(noise.position);
            transition(
                entity,
                &mut state,
                EnemyState::Investigating {
                    target: noise.position,
                },
                &mut changes,
            );
        }
    }
}
