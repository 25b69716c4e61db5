//! Movement компоненты: команды перемещения, скорость, nav feedback

use bevy::prelude::*;

/// Команда движения для актора (выполняется навигацией engine-слоя)
///
/// Архитектура:
/// - ECS система пишет MovementCommand (high-level intent)
/// - Engine-слой читает и конвертирует в pathfinding target
/// - Обратная связь приходит через NavFeedback + PoseUpdate
#[derive(Component, Debug, Clone, PartialEq)]
pub enum MovementCommand {
    /// Стоять на месте (не трогать pathfinding target)
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveToPosition { target: Vec3 },
    /// Следовать за entity (engine обновляет target каждый frame)
    FollowEntity { target: Entity },
    /// Остановиться немедленно (сбросить velocity)
    Stop,
}

impl Default for MovementCommand {
    fn default() -> Self {
        Self::Idle
    }
}

/// Скорость движения актора (метры/сек)
///
/// AI выставляет per-state значение из EnemyConfig, engine применяет.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 2.0 } // 2 m/s — базовая скорость ходьбы
    }
}

/// Обратная связь навигации (пишет engine-слой каждый tick)
///
/// remaining_distance == None значит путь ещё не посчитан — arrival
/// в этом tick'е не срабатывает, проверка повторится на следующем.
/// Engine обязан сбрасывать поля при смене MovementCommand, иначе
/// stale дистанция даст ложный arrival.
#[derive(Component, Debug, Clone, Default)]
pub struct NavFeedback {
    pub remaining_distance: Option<f32>,
    pub path_pending: bool,
}

impl NavFeedback {
    /// Дошли ли до текущего target (в пределах radius)
    pub fn arrived_within(&self, radius: f32) -> bool {
        !self.path_pending && self.remaining_distance.is_some_and(|d| d < radius)
    }
}
