//! FSM AI systems (perception, state transitions, capture).

use bevy::prelude::*;

use crate::ai::{
    EnemyConfig, EnemyState, EnemyStateChanged, PatrolRoute, PerceptionMemory, PlayerCaught,
};
use crate::components::{Enemy, NavFeedback, Player, Pose};
use crate::navigation::WalkableWorld;
use crate::perception::{can_hear, can_see, Detection, DetectionKind, OcclusionWorld};
use crate::session::{SessionPhase, SessionState};
use crate::SimulationRng;

/// Смена state с логом и нотификацией презентации.
/// Событие уходит только при смене варианта; обновление данных внутри
/// того же варианта (новая точка поиска) проходит тихо.
pub(crate) fn transition(
    entity: Entity,
    state: &mut EnemyState,
    next: EnemyState,
    changes: &mut EventWriter<EnemyStateChanged>,
) {
    let from = state.kind();
    let to = next.kind();
    *state = next;

    if from != to {
        crate::logger::log(&format!("AI: {:?} {:?} → {:?}", entity, from, to));
        changes.write(EnemyStateChanged { entity, from, to });
    }
}

/// Perception за один tick: сначала зрение, слух только если зрение
/// не сработало — и только в своём независимом радиусе.
fn perceive(
    pose: &Pose,
    player: Entity,
    player_position: Vec3,
    config: &EnemyConfig,
    occlusion: &OcclusionWorld,
) -> Option<Detection> {
    if !config.enable_detection {
        return None;
    }

    // enable_line_of_sight выключен ИЛИ backend не подключен —
    // occlusion-проверки нет, решают угол и дистанция
    let los = config
        .enable_line_of_sight
        .then(|| occlusion.backend())
        .flatten();

    if can_see(
        pose,
        player_position,
        player,
        config.view_angle,
        config.detection_distance,
        los,
    ) {
        return Some(Detection {
            kind: DetectionKind::Visual,
            position: player_position,
        });
    }

    if config.enable_hearing && can_hear(pose, player_position, config.hearing_distance) {
        return Some(Detection {
            kind: DetectionKind::Hearing,
            position: player_position,
        });
    }

    None
}

/// Таймер активного state (перед проверками переходов)
fn advance_timers(state: &mut EnemyState, delta: f32) {
    match state {
        EnemyState::Waiting { remaining } => *remaining -= delta,
        EnemyState::Chasing {
            lost_timer: Some(timer),
        } => *timer -= delta,
        EnemyState::Searching { elapsed, .. } => *elapsed += delta,
        _ => {}
    }
}

/// Случайная точка прочёсывания вокруг anchor'а, валидированная через
/// walkable-сэмплер engine-слоя. None = retry при следующем arrival.
fn sample_search_leg(
    anchor: Vec3,
    radius: f32,
    walkable: &WalkableWorld,
    rng: &mut SimulationRng,
) -> Option<Vec3> {
    use rand::Rng;

    let backend = walkable.backend()?;

    let angle = rng.rng.gen::<f32>() * std::f32::consts::TAU;
    let distance = rng.rng.gen::<f32>() * radius;
    let candidate = anchor + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

    backend.sample_point(candidate, radius)
}

/// Система: FSM врагов — perception, приоритетный interrupt, тела states
///
/// Порядок внутри tick'а:
/// 1. Таймер активного state
/// 2. Perception (зрение, потом слух)
/// 3. Обнаружение прерывает ЛЮБОЙ state → Chasing в этом же tick'е
/// 4. Потеря при Chasing — debounce lost_player_delay → Searching
/// 5. Тело текущего state (arrival-логика, таймауты)
pub fn tick_enemy_fsm(
    time: Res<Time<Fixed>>,
    session: Res<SessionState>,
    occlusion: Res<OcclusionWorld>,
    walkable: Res<WalkableWorld>,
    mut rng: ResMut<SimulationRng>,
    players: Query<(Entity, &Pose), With<Player>>,
    mut enemies: Query<
        (
            Entity,
            &Pose,
            &EnemyConfig,
            &NavFeedback,
            &mut EnemyState,
            &mut PerceptionMemory,
            &mut PatrolRoute,
        ),
        With<Enemy>,
    >,
    mut changes: EventWriter<EnemyStateChanged>,
    mut warned_no_player: Local<bool>,
    mut warned_no_walkable: Local<bool>,
) {
    if !session.is_running() {
        return;
    }

    let delta = time.delta_secs();
    let player = players.iter().next();

    if player.is_none() && !*warned_no_player {
        // Без игрока деградируем до чистого патруля, не падаем
        crate::logger::log_warning("AI: player entity not found, detection disabled");
        *warned_no_player = true;
    }

    for (entity, pose, config, nav, mut state, mut memory, mut route) in enemies.iter_mut() {
        advance_timers(&mut state, delta);

        // --- Perception ---
        let detection = player
            .and_then(|(player_entity, player_pose)| {
                perceive(pose, player_entity, player_pose.position, config, &occlusion)
            });

        if let Some(detection) = detection {
            memory.last_known_player_position = Some(detection.position);

            if let EnemyState::Chasing { lost_timer } = &mut *state {
                // Игрок снова виден — debounce сбрасываем
                *lost_timer = None;
            } else {
                // Обнаружение прерывает всё остальное немедленно
                crate::logger::log(&format!(
                    "👁️ {:?} detected player ({:?}), interrupting {:?}",
                    entity,
                    detection.kind,
                    state.kind()
                ));
                transition(
                    entity,
                    &mut state,
                    EnemyState::Chasing { lost_timer: None },
                    &mut changes,
                );
            }
        } else {
            // --- Delayed loss (только в Chasing) ---
            let lost_expired = match &mut *state {
                EnemyState::Chasing { lost_timer } => match lost_timer {
                    None => {
                        *lost_timer = Some(config.lost_player_delay);
                        crate::logger::log(&format!(
                            "👻 {:?} lost the player, search starts in {:.1}s",
                            entity, config.lost_player_delay
                        ));
                        false
                    }
                    Some(timer) => *timer <= 0.0,
                },
                _ => false,
            };

            if lost_expired {
                let anchor = memory.last_known_player_position.unwrap_or(pose.position);
                crate::logger::log(&format!(
                    "🔦 {:?} still undetected, searching around {:?}",
                    entity, anchor
                ));
                transition(
                    entity,
                    &mut state,
                    EnemyState::Searching {
                        elapsed: 0.0,
                        anchor,
                        leg_target: None,
                    },
                    &mut changes,
                );
            }
        }

        // --- Тело текущего state ---
        let next = match &*state {
            EnemyState::Patrolling => {
                if let Some(target) = memory.pending_investigation {
                    // Страховка: запрос обычно переводит жёстким override'ом
                    // сразу в react_to_noise, но мог прийти во время chase
                    Some(EnemyState::Investigating { target })
                } else if route.current_waypoint().is_some() {
                    nav.arrived_within(config.patrol_arrival_radius)
                        .then(|| EnemyState::Waiting {
                            remaining: config.wait_time,
                        })
                } else {
                    if route.report_empty_once() {
                        crate::logger::log_warning(&format!(
                            "AI: {:?} has no patrol waypoints, standing still",
                            entity
                        ));
                    }
                    None
                }
            }

            EnemyState::Waiting { remaining } => {
                if *remaining <= 0.0 {
                    route.advance();
                    Some(EnemyState::Patrolling)
                } else {
                    None
                }
            }

            // Преследование живой позиции — движение выставляет
            // enemy_movement_from_state, таймеры обработаны выше
            EnemyState::Chasing { .. } => None,

            EnemyState::Searching {
                elapsed, anchor, ..
            } => {
                if *elapsed >= config.search_timeout {
                    route.seek_nearest(pose.position);
                    crate::logger::log(&format!(
                        "AI: {:?} search timed out, returning to nearest waypoint",
                        entity
                    ));
                    Some(EnemyState::Patrolling)
                } else if nav.arrived_within(config.search_arrival_radius) {
                    if walkable.0.is_none() && !*warned_no_walkable {
                        crate::logger::log_warning(
                            "AI: walkable-area sampler not installed, search stays on anchor",
                        );
                        *warned_no_walkable = true;
                    }

                    match sample_search_leg(*anchor, config.search_radius, &walkable, &mut rng) {
                        Some(point) => Some(EnemyState::Searching {
                            elapsed: *elapsed,
                            anchor: *anchor,
                            leg_target: Some(point),
                        }),
                        // Sample не удался — retry при следующем arrival
                        None => None,
                    }
                } else {
                    None
                }
            }

            EnemyState::Investigating { target } => {
                if nav.arrived_within(config.investigation_arrival_radius) {
                    let anchor = *target;
                    memory.pending_investigation = None;
                    memory.last_known_player_position = Some(anchor);
                    crate::logger::log(&format!(
                        "AI: {:?} reached investigation point, searching around it",
                        entity
                    ));
                    Some(EnemyState::Searching {
                        elapsed: 0.0,
                        anchor,
                        leg_target: None,
                    })
                } else {
                    None
                }
            }
        };

        if let Some(next) = next {
            transition(entity, &mut state, next, &mut changes);
        }
    }
}

/// Система: захват игрока
///
/// Каждый tick, независимо от state: дистанция ≤ capture_distance И
/// (LOS отключён ИЛИ полный визуальный тест проходит) → PlayerCaught.
/// Ровно один захват на сессию — дальше phase-гейт делает систему no-op.
pub fn check_player_captured(
    mut session: ResMut<SessionState>,
    occlusion: Res<OcclusionWorld>,
    players: Query<(Entity, &Pose), With<Player>>,
    enemies: Query<(Entity, &Pose, &EnemyConfig), With<Enemy>>,
    mut caught_events: EventWriter<PlayerCaught>,
) {
    if !session.is_running() {
        return;
    }

    let Some((player_entity, player_pose)) = players.iter().next() else {
        return;
    };

    for (entity, pose, config) in enemies.iter() {
        let distance = pose.distance_to(player_pose.position);
        if distance > config.capture_distance {
            continue;
        }

        let los = config
            .enable_line_of_sight
            .then(|| occlusion.backend())
            .flatten();
        let sees = !config.enable_line_of_sight
            || can_see(
                pose,
                player_pose.position,
                player_entity,
                config.view_angle,
                config.detection_distance,
                los,
            );
        if !sees {
            continue;
        }

        crate::logger::log_info(&format!(
            "🚨 {:?} caught the player at {:.2}m",
            entity, distance
        ));
        caught_events.write(PlayerCaught { by: entity });
        session.end(SessionPhase::Caught);
        break;
    }
}
