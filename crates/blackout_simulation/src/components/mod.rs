//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: маркеры акторов (Enemy, Player)
//! - movement: навигация и перемещение (MovementCommand, MovementSpeed, NavFeedback)
//! - world: позиционирование в мире (Pose)
//!
//! AI-специфичные компоненты (EnemyState, EnemyConfig, PatrolRoute,
//! PerceptionMemory) живут в crate::ai::components.

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
