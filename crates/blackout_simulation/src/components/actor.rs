//! Базовые маркеры акторов: Enemy, Player

use bevy::prelude::*;

use crate::ai::{EnemyConfig, EnemyState, PatrolRoute, PerceptionMemory};
use crate::components::{MovementCommand, MovementSpeed, NavFeedback, Pose};

/// Враг — преследующий агент уровня
///
/// Через Required Components автоматически тянет за собой весь AI-набор:
/// pose, state machine, конфиг, память восприятия, маршрут, навигацию.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    Pose,
    MovementCommand,
    MovementSpeed,
    NavFeedback,
    EnemyState,
    EnemyConfig,
    PerceptionMemory,
    PatrolRoute
)]
pub struct Enemy;

/// Игрок (XR rig). Позицией владеет engine-слой, сюда приходит зеркало.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Pose)]
pub struct Player;
