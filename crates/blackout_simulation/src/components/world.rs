//! World positioning компоненты: Pose

use bevy::prelude::*;

/// Зеркало engine-owned transform (позиция + направление взгляда)
///
/// Engine authoritative для физики/рендера; симуляция получает апдейты
/// через PoseUpdate events и принимает решения по этой копии.
/// Forward хранится явно (XZ-плоскость), не кватернионом — perception
/// нужен только угол до цели.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Pose {
    pub position: Vec3,
    /// Нормализованное направление взгляда
    pub forward: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
        }
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}
