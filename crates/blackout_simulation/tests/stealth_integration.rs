//! Stealth integration tests
//!
//! Headless прогоны полного FSM врага: патруль, обнаружение,
//! debounce потери, investigation, захват, детерминизм.
//!
//! Навигацию исполняет тестовый интегратор drive_navigation —
//! в проде это делает engine-слой.

use bevy::prelude::*;
use blackout_simulation::*;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Квадратный маршрут 8x8 вокруг origin
fn square_route() -> PatrolRoute {
    PatrolRoute::new(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(8.0, 0.0, 0.0),
        Vec3::new(8.0, 0.0, 8.0),
        Vec3::new(0.0, 0.0, 8.0),
    ])
}

/// Test: патруль держит инварианты state machine
///
/// 900 тиков (15 сек): состояние всегда одно из пяти, враг успевает и
/// патрулировать, и стоять на waypoint'ах; игрока не видит — Chasing
/// не появляется.
#[test]
fn test_patrol_cycle_holds_invariants() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(50.0, 0.0, 50.0));

    let mut seen_kinds = Vec::new();
    for _ in 0..900 {
        app.update();

        let state = app.world().get::<EnemyState>(enemy).unwrap();
        let kind = state.kind();
        assert!(
            matches!(
                kind,
                EnemyStateKind::Patrolling
                    | EnemyStateKind::Waiting
                    | EnemyStateKind::Chasing
                    | EnemyStateKind::Searching
                    | EnemyStateKind::Investigating
            ),
            "Unexpected state kind {:?}",
            kind
        );
        assert_ne!(kind, EnemyStateKind::Chasing, "Player is 70m away");

        if seen_kinds.last() != Some(&kind) {
            seen_kinds.push(kind);
        }
    }

    // Полный патрульный цикл: и шли, и стояли
    assert!(seen_kinds.contains(&EnemyStateKind::Patrolling));
    assert!(seen_kinds.contains(&EnemyStateKind::Waiting));
}

/// Test: обнаружение прерывает патруль в том же tick'е
#[test]
fn test_detection_interrupts_patrol_same_tick() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    // Игрок прямо по курсу на 3м: fov 60°, детекция 4м
    spawn_player(&mut app, Vec3::new(0.0, 0.0, 3.0));

    app.update();

    let state = app.world().get::<EnemyState>(enemy).unwrap();
    assert_eq!(state.kind(), EnemyStateKind::Chasing);
}

/// Test: обнаружение прерывает и Waiting
#[test]
fn test_detection_interrupts_waiting() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    let player = spawn_player(&mut app, Vec3::new(50.0, 0.0, 50.0));

    *app.world_mut().get_mut::<EnemyState>(enemy).unwrap() =
        EnemyState::Waiting { remaining: 10.0 };

    // Игрок появился перед носом
    app.world_mut().get_mut::<Pose>(player).unwrap().position = Vec3::new(0.0, 0.0, 2.0);
    app.update();

    let state = app.world().get::<EnemyState>(enemy).unwrap();
    assert_eq!(state.kind(), EnemyStateKind::Chasing);
}

/// Test: окно debounce при потере игрока
///
/// lost_player_delay = 2.0s при 60Hz: Searching не раньше чем через
/// 120 тиков после потери и не позже 120 + пара тиков на float-округление.
#[test]
fn test_lost_player_debounce_window() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    let player = spawn_player(&mut app, Vec3::new(0.0, 0.0, 3.0));

    app.update();
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Chasing
    );

    // Игрок исчез из всех радиусов восприятия
    app.world_mut().get_mut::<Pose>(player).unwrap().position = Vec3::new(0.0, 0.0, -200.0);

    let mut search_tick = None;
    for tick in 1..=150 {
        app.update();
        let kind = app.world().get::<EnemyState>(enemy).unwrap().kind();
        if kind == EnemyStateKind::Searching {
            search_tick = Some(tick);
            break;
        }
        assert_eq!(kind, EnemyStateKind::Chasing, "tick {}", tick);
    }

    let search_tick = search_tick.expect("enemy never started searching");
    // ≥ 2.0s (120 тиков) и строго меньше 2.0s + пара тиков
    assert!(
        (120..=123).contains(&search_tick),
        "Searching began at tick {} after losing the player",
        search_tick
    );
}

/// Test: повторное обнаружение сбрасывает debounce
#[test]
fn test_redetection_resets_loss_timer() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    let player = spawn_player(&mut app, Vec3::new(0.0, 0.0, 3.0));

    app.update();

    // Потеряли на 1.5s (90 тиков < 120) — ещё Chasing
    app.world_mut().get_mut::<Pose>(player).unwrap().position = Vec3::new(0.0, 0.0, -200.0);
    for _ in 0..90 {
        app.update();
    }
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Chasing
    );

    // Игрок мелькнул — таймер сброшен
    let enemy_position = app.world().get::<Pose>(enemy).unwrap().position;
    let enemy_forward = app.world().get::<Pose>(enemy).unwrap().forward;
    app.world_mut().get_mut::<Pose>(player).unwrap().position =
        enemy_position + enemy_forward * 2.0;
    app.update();

    // Снова потеряли: полные 2 секунды отсчитываются заново
    app.world_mut().get_mut::<Pose>(player).unwrap().position = Vec3::new(0.0, 0.0, -200.0);
    for _ in 0..110 {
        app.update();
    }
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Chasing,
        "loss timer must restart from redetection"
    );
}

/// Test: NoiseEvent при Chasing — no-op
#[test]
fn test_investigate_request_noop_while_chasing() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(0.0, 0.0, 3.0));

    app.update();
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Chasing
    );

    app.world_mut().send_event(NoiseEvent {
        position: Vec3::new(30.0, 0.0, 30.0),
        loudness_radius: 15.0,
    });
    app.update();

    // State не изменился, цель не защёлкнулась
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Chasing
    );
    let memory = app.world().get::<PerceptionMemory>(enemy).unwrap();
    assert!(memory.pending_investigation.is_none());
}

/// Test: NoiseEvent жёстко прерывает Searching
#[test]
fn test_investigate_request_overrides_searching() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(50.0, 0.0, 50.0));

    *app.world_mut().get_mut::<EnemyState>(enemy).unwrap() = EnemyState::Searching {
        elapsed: 1.0,
        anchor: Vec3::new(5.0, 0.0, 5.0),
        leg_target: None,
    };

    let noise_position = Vec3::new(-10.0, 0.0, -10.0);
    app.world_mut().send_event(NoiseEvent {
        position: noise_position,
        loudness_radius: 15.0,
    });
    app.update();

    // Немедленный переход, не «флаг до следующего tick'а»
    let state = app.world().get::<EnemyState>(enemy).unwrap();
    assert_eq!(
        *state,
        EnemyState::Investigating {
            target: noise_position
        }
    );
    let memory = app.world().get::<PerceptionMemory>(enemy).unwrap();
    assert_eq!(memory.pending_investigation, Some(noise_position));
}

/// Test: по прибытии на точку investigation — Searching вокруг неё
#[test]
fn test_investigation_arrival_becomes_search() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(50.0, 0.0, 50.0));

    let noise_position = Vec3::new(4.0, 0.0, 0.0);
    app.world_mut().send_event(NoiseEvent {
        position: noise_position,
        loudness_radius: 15.0,
    });
    app.update();
    assert_eq!(
        app.world().get::<EnemyState>(enemy).unwrap().kind(),
        EnemyStateKind::Investigating
    );

    // investigation_arrival_radius 2.0, скорость 2.5 — доходим за ~1 сек
    let mut reached_search = false;
    for _ in 0..120 {
        app.update();
        if let EnemyState::Searching { anchor, .. } =
            app.world().get::<EnemyState>(enemy).unwrap()
        {
            assert_eq!(*anchor, noise_position, "search anchors on the noise point");
            reached_search = true;
            break;
        }
    }
    assert!(reached_search, "investigation never transitioned to search");

    let memory = app.world().get::<PerceptionMemory>(enemy).unwrap();
    assert!(
        memory.pending_investigation.is_none(),
        "latch must clear on arrival"
    );
}

/// Test: захват — ровно один раз, с рестартом через 1s
#[test]
fn test_capture_fires_once_and_schedules_restart() {
    let mut app = create_stealth_app(42);
    spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    // Игрок перед носом: 1.0м ≤ capture 1.2м, в конусе зрения
    spawn_player(&mut app, Vec3::new(0.0, 0.0, 1.0));

    app.update();

    let session = app.world().resource::<SessionState>();
    assert!(session.player_caught());
    assert_eq!(count_of::<PlayerCaught>(&app), 1);

    // Условие захвата держится много тиков — событие не повторяется
    for _ in 0..100 {
        app.update();
    }
    assert_eq!(count_of::<PlayerCaught>(&app), 1);
    // Рестарт запрошен ровно один раз (delay 1.0s = 60 тиков)
    assert_eq!(count_of::<SceneCommand>(&app), 1);
}

/// Test: захват со спины не проходит (нужен визуальный контакт)
#[test]
fn test_capture_requires_line_of_sight() {
    let mut app = create_stealth_app(42);
    spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    // Вплотную, но СЗАДИ — угол не в конусе
    let player = spawn_player(&mut app, Vec3::new(0.0, 0.0, -1.0));

    app.update();
    assert!(app.world().resource::<SessionState>().is_running());

    // Стена между врагом и игроком тоже спасает
    app.insert_resource(OcclusionWorld(Some(Box::new(AlwaysBlocked))));
    app.world_mut().get_mut::<Pose>(player).unwrap().position = Vec3::new(0.0, 0.0, 1.0);
    app.update();
    assert!(app.world().resource::<SessionState>().is_running());

    // Стена исчезла — захват
    app.insert_resource(OcclusionWorld(Some(Box::new(AlwaysClear))));
    app.update();
    assert!(app.world().resource::<SessionState>().player_caught());
}

/// Test: конец игры останавливает врага
#[test]
fn test_game_end_halts_enemy() {
    let mut app = create_stealth_app(42);
    let enemy = spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(0.0, 0.0, 1.0));

    app.update(); // захват

    assert_eq!(
        *app.world().get::<MovementCommand>(enemy).unwrap(),
        MovementCommand::Stop
    );

    // FSM заморожен: state не меняется после конца игры
    let frozen = app.world().get::<EnemyState>(enemy).unwrap().clone();
    for _ in 0..200 {
        app.update();
    }
    assert_eq!(*app.world().get::<EnemyState>(enemy).unwrap(), frozen);
}

/// Test: детерминизм — одинаковый seed, одинаковый сценарий, идентичный мир
#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICKS: usize = 400;

    let snapshot1 = run_scenario_and_snapshot(SEED, TICKS);
    let snapshot2 = run_scenario_and_snapshot(SEED, TICKS);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

// --- Helpers ---

/// App с SimulationPlugin + тестовым исполнителем навигации и
/// walkable-сэмплером «плоский пол»
fn create_stealth_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(WalkableWorld(Some(Box::new(FlatGround))))
        .add_systems(FixedUpdate, drive_navigation.in_set(SimulationSet::Ingest))
        .add_systems(
            FixedUpdate,
            (record::<PlayerCaught>, record::<SceneCommand>).after(SimulationSet::Session),
        );
    app.init_resource::<EventCount<PlayerCaught>>();
    app.init_resource::<EventCount<SceneCommand>>();
    app
}

fn spawn_enemy(app: &mut App, position: Vec3, forward: Vec3, route: PatrolRoute) -> Entity {
    app.world_mut()
        .spawn((Enemy, Pose::new(position, forward), route))
        .id()
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Player, Pose::new(position, Vec3::NEG_Z)))
        .id()
}

/// Walkable-стаб: весь мир проходим, точка снапится на y=0
struct FlatGround;

impl WalkableArea for FlatGround {
    fn sample_point(&self, center: Vec3, _radius: f32) -> Option<Vec3> {
        Some(Vec3::new(center.x, 0.0, center.z))
    }
}

/// Occlusion-стаб: всегда стена
struct AlwaysBlocked;

impl OcclusionQuery for AlwaysBlocked {
    fn cast(&self, from: Vec3, _to: Vec3) -> Option<RayContact> {
        Some(RayContact::Hit {
            entity: None,
            position: from,
        })
    }
}

/// Occlusion-стаб: всегда чисто
struct AlwaysClear;

impl OcclusionQuery for AlwaysClear {
    fn cast(&self, _from: Vec3, _to: Vec3) -> Option<RayContact> {
        Some(RayContact::Clear)
    }
}

/// Счётчик событий типа T (события переживают максимум два tick'а,
/// поэтому считаем системой, а не курсором постфактум)
#[derive(Resource)]
struct EventCount<T: Event> {
    count: usize,
    _marker: PhantomData<T>,
}

impl<T: Event> Default for EventCount<T> {
    fn default() -> Self {
        Self {
            count: 0,
            _marker: PhantomData,
        }
    }
}

fn record<T: Event>(mut reader: EventReader<T>, mut counter: ResMut<EventCount<T>>) {
    counter.count += reader.read().count();
}

fn count_of<T: Event>(app: &App) -> usize {
    app.world().resource::<EventCount<T>>().count
}

/// Тестовый исполнитель MovementCommand: двигает Pose к цели со
/// скоростью MovementSpeed, пишет NavFeedback (роль engine-слоя)
fn drive_navigation(
    time: Res<Time<Fixed>>,
    mut set: ParamSet<(
        Query<(Entity, &Pose)>,
        Query<(&MovementCommand, &MovementSpeed, &mut Pose, &mut NavFeedback)>,
    )>,
) {
    let positions: HashMap<Entity, Vec3> = set
        .p0()
        .iter()
        .map(|(entity, pose)| (entity, pose.position))
        .collect();
    let delta = time.delta_secs();

    for (command, speed, mut pose, mut nav) in set.p1().iter_mut() {
        let target = match command {
            MovementCommand::Idle | MovementCommand::Stop => {
                nav.remaining_distance = None;
                nav.path_pending = false;
                continue;
            }
            MovementCommand::MoveToPosition { target } => *target,
            MovementCommand::FollowEntity { target } => match positions.get(target) {
                Some(position) => *position,
                None => continue,
            },
        };

        let to_target = target - pose.position;
        let distance = to_target.length();
        if distance > 1e-3 {
            let direction = to_target / distance;
            pose.forward = direction;
            pose.position += direction * (speed.speed * delta).min(distance);
        }

        nav.path_pending = false;
        nav.remaining_distance = Some(target.distance(pose.position));
    }
}

/// Полный сценарий: патруль → шум на tick'е 100 → investigation →
/// поиск. Снимаем snapshot state'ов и поз.
fn run_scenario_and_snapshot(seed: u64, ticks: usize) -> Vec<u8> {
    let mut app = create_stealth_app(seed);
    spawn_enemy(&mut app, Vec3::ZERO, Vec3::Z, square_route());
    spawn_player(&mut app, Vec3::new(50.0, 0.0, 50.0));

    for tick in 0..ticks {
        if tick == 100 {
            app.world_mut().send_event(NoiseEvent {
                position: Vec3::new(6.0, 0.0, 2.0),
                loudness_radius: 15.0,
            });
        }
        app.update();
    }

    let mut snapshot = world_snapshot::<EnemyState>(app.world_mut());
    snapshot.extend(world_snapshot::<Pose>(app.world_mut()));
    snapshot
}
