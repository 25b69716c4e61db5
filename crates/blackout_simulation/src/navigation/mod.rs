//! Navigation — интерфейсы к pathfinding'у engine-слоя
//!
//! Engine authoritative для transforms и исполнения пути: симуляция
//! пишет MovementCommand, обратно получает PoseUpdate events и
//! NavFeedback. Здесь — приём pose-апдейтов и walkable-сэмплер.

use bevy::prelude::*;

use crate::components::Pose;
use crate::SimulationSet;

/// Event: engine-слой сообщает новую позицию/ориентацию актора
///
/// Отправляется после spawn-коррекции (placement на navmesh) и после
/// каждого фактического перемещения.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    pub entity: Entity,
    pub position: Vec3,
    pub forward: Vec3,
}

/// Walkable-area коллаборатор: снап точки на проходимую поверхность
///
/// None из sample_point = рядом нет walkable-поверхности; вызывающий
/// повторит попытку на следующем arrival, не ошибка.
pub trait WalkableArea: Send + Sync {
    fn sample_point(&self, center: Vec3, radius: f32) -> Option<Vec3>;
}

/// Resource-слот для walkable backend'а (None = сэмплер не подключен)
#[derive(Resource, Default)]
pub struct WalkableWorld(pub Option<Box<dyn WalkableArea>>);

impl WalkableWorld {
    pub fn backend(&self) -> Option<&dyn WalkableArea> {
        self.0.as_deref()
    }
}

/// Система: применение PoseUpdate → Pose
///
/// Events по despawned entity просто пропускаем (engine мог отправить
/// апдейт в том же tick'е что и удаление).
pub fn apply_pose_updates(
    mut updates: EventReader<PoseUpdate>,
    mut poses: Query<&mut Pose>,
) {
    for update in updates.read() {
        let Ok(mut pose) = poses.get_mut(update.entity) else {
            continue;
        };

        pose.position = update.position;
        let forward = update.forward.normalize_or_zero();
        if forward != Vec3::ZERO {
            pose.forward = forward;
        }
    }
}

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WalkableWorld>()
            .add_event::<PoseUpdate>()
            .add_systems(
                FixedUpdate,
                apply_pose_updates.in_set(SimulationSet::Ingest),
            );
    }
}
