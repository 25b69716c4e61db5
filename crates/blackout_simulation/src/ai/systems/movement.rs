//! AI movement systems.

use bevy::prelude::*;

use crate::ai::{AudioCue, EnemyConfig, EnemyState, EnemyStateChanged, PatrolRoute};
use crate::components::{Enemy, MovementCommand, MovementSpeed, Player};
use crate::session::SessionState;

/// Система: конвертация EnemyState → MovementCommand + MovementSpeed
///
/// Команда и скорость пишутся только при изменении — иначе
/// Changed<MovementCommand> спамит engine-слой каждый tick.
pub fn enemy_movement_from_state(
    session: Res<SessionState>,
    players: Query<Entity, With<Player>>,
    mut enemies: Query<
        (
            &EnemyState,
            &EnemyConfig,
            &PatrolRoute,
            &mut MovementCommand,
            &mut MovementSpeed,
        ),
        With<Enemy>,
    >,
) {
    if !session.is_running() {
        return;
    }

    let player = players.iter().next();

    for (state, config, route, mut command, mut speed) in enemies.iter_mut() {
        let (next_command, next_speed) = match state {
            EnemyState::Patrolling => match route.current_waypoint() {
                Some(waypoint) => (
                    MovementCommand::MoveToPosition { target: waypoint },
                    config.patrol_speed,
                ),
                // Пустой маршрут — стоим
                None => (MovementCommand::Idle, config.patrol_speed),
            },

            EnemyState::Waiting { .. } => (MovementCommand::Idle, config.patrol_speed),

            EnemyState::Chasing { .. } => match player {
                // Живая позиция игрока каждый tick, без кэша пути
                Some(target) => (MovementCommand::FollowEntity { target }, config.chase_speed),
                None => (MovementCommand::Idle, config.chase_speed),
            },

            EnemyState::Searching {
                anchor, leg_target, ..
            } => (
                MovementCommand::MoveToPosition {
                    target: leg_target.unwrap_or(*anchor),
                },
                config.search_speed,
            ),

            EnemyState::Investigating { target } => (
                MovementCommand::MoveToPosition { target: *target },
                config.investigation_speed,
            ),
        };

        if *command != next_command {
            *command = next_command;
        }
        let next_speed = MovementSpeed { speed: next_speed };
        if *speed != next_speed {
            *speed = next_speed;
        }
    }
}

/// Система: footstep-cue по смене state
///
/// Pitch берётся из state (patrol 1.0, chase 1.5, search 1.2,
/// investigation 1.1); Waiting глушит шаги. Сам playback — в адаптере.
pub fn emit_footstep_cues(
    mut changes: EventReader<EnemyStateChanged>,
    mut cues: EventWriter<AudioCue>,
) {
    for change in changes.read() {
        match change.to.footstep_pitch() {
            Some(pitch) => {
                cues.write(AudioCue::Footsteps {
                    entity: change.entity,
                    pitch,
                });
            }
            None => {
                cues.write(AudioCue::FootstepsStopped {
                    entity: change.entity,
                });
            }
        }
    }
}
