//! Headless симуляция BLACKOUT
//!
//! Запускает Bevy App без рендера: враг патрулирует квадрат, игрок
//! стоит в стороне, на tick'е 300 в мире громыхает. Навигацию исполняет
//! встроенный интегратор (в проде это делает engine-слой).

use bevy::prelude::*;
use blackout_simulation::*;
use std::collections::HashMap;

fn main() {
    let seed = 42;
    println!("Starting BLACKOUT headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .add_systems(
            FixedUpdate,
            drive_navigation.in_set(SimulationSet::Ingest),
        );

    // Враг с квадратным маршрутом патруля
    app.world_mut().spawn((
        Enemy,
        Pose::new(Vec3::ZERO, Vec3::Z),
        PatrolRoute::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(8.0, 0.0, 0.0),
            Vec3::new(8.0, 0.0, 8.0),
            Vec3::new(0.0, 0.0, 8.0),
        ]),
    ));

    // Игрок вне зоны видимости
    app.world_mut().spawn((
        Player,
        Pose::new(Vec3::new(20.0, 0.0, 20.0), Vec3::NEG_Z),
    ));

    for tick in 0..1000 {
        if tick == 300 {
            // Что-то громыхнуло рядом с врагом
            app.world_mut().send_event(NoiseEvent {
                position: Vec3::new(4.0, 0.0, 4.0),
                loudness_radius: 15.0,
            });
        }

        app.update();

        if tick % 100 == 0 {
            let mut states = app.world_mut().query::<&EnemyState>();
            for state in states.iter(app.world()) {
                println!("Tick {}: enemy state {:?}", tick, state.kind());
            }
        }
    }

    println!("Simulation complete!");
}

/// Простейший исполнитель MovementCommand (замена engine-слоя):
/// двигает Pose к цели со скоростью MovementSpeed и пишет NavFeedback.
fn drive_navigation(
    time: Res<Time<Fixed>>,
    mut set: ParamSet<(
        Query<(Entity, &Pose)>,
        Query<(&MovementCommand, &MovementSpeed, &mut Pose, &mut NavFeedback)>,
    )>,
) {
    // Позиции всех акторов до интеграции (для FollowEntity)
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
