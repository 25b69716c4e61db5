//! Perception — чистая геометрия обнаружения (FOV, слух, line-of-sight)
//!
//! Никакого mutable state: функции детерминированы по входам, occlusion
//! raycast делегируется engine-слою через trait OcclusionQuery.

use bevy::prelude::*;

use crate::components::Pose;

/// Высота глаз наблюдателя для LOS-луча
pub const OBSERVER_EYE_HEIGHT: f32 = 1.5;
/// Высота цели (грудь), чтобы луч не цеплял пол
pub const TARGET_EYE_HEIGHT: f32 = 1.0;

/// Каким каналом обнаружен игрок
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    /// Угол + дистанция + line of sight
    Visual,
    /// Дистанция + цель сзади; препятствия не мешают
    Hearing,
}

/// Результат perception за один tick — эфемерный, нигде не хранится
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub kind: DetectionKind,
    pub position: Vec3,
}

/// Результат raycast'а engine-слоя
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayContact {
    /// Луч дошёл до конца без коллизий
    Clear,
    /// Луч во что-то упёрся
    Hit {
        /// Entity коллайдера, если engine смог его сопоставить
        entity: Option<Entity>,
        position: Vec3,
    },
}

/// Occlusion-коллаборатор (physics world живёт в engine-слое)
///
/// None из cast() = запрос не выполнился (мир не готов, нода удалена);
/// трактуется вызывающим как "не видно в этом tick", не как ошибка.
pub trait OcclusionQuery: Send + Sync {
    fn cast(&self, from: Vec3, to: Vec3) -> Option<RayContact>;
}

/// Resource-слот для occlusion backend'а
///
/// None = occlusion отключён: видимость решают только угол и дистанция.
#[derive(Resource, Default)]
pub struct OcclusionWorld(pub Option<Box<dyn OcclusionQuery>>);

impl OcclusionWorld {
    pub fn backend(&self) -> Option<&dyn OcclusionQuery> {
        self.0.as_deref()
    }
}

/// Line-of-sight между двумя точками (eye-to-eye)
///
/// - `Some(true)` — LOS чистый, либо первый hit это сама цель
/// - `Some(false)` — луч упёрся в препятствие
/// - `None` — backend не смог выполнить запрос
pub fn line_of_sight(
    occlusion: &dyn OcclusionQuery,
    from: Vec3,
    to: Vec3,
    target: Entity,
) -> Option<bool> {
    let ray_from = from + Vec3::Y * OBSERVER_EYE_HEIGHT;
    let ray_to = to + Vec3::Y * TARGET_EYE_HEIGHT;

    match occlusion.cast(ray_from, ray_to)? {
        RayContact::Clear => Some(true),
        // Hit по самой цели = прямая видимость
        RayContact::Hit { entity, .. } => Some(entity == Some(target)),
    }
}

/// Видит ли наблюдатель цель: угол ≤ fov/2, дистанция ≤ max, LOS чистый
///
/// occlusion == None — LOS-проверка отключена целиком.
/// Неудавшийся raycast (None из line_of_sight) = не видно в этом tick.
pub fn can_see(
    pose: &Pose,
    target_position: Vec3,
    target: Entity,
    view_angle_deg: f32,
    max_distance: f32,
    occlusion: Option<&dyn OcclusionQuery>,
) -> bool {
    let to_target = target_position - pose.position;
    let distance = to_target.length();
    if distance > max_distance {
        return false;
    }

    // Вплотную (нулевой вектор) считаем видимым, угол не определён
    if distance > f32::EPSILON {
        let angle = pose.forward.angle_between(to_target).to_degrees();
        if angle > view_angle_deg / 2.0 {
            return false;
        }
    }

    match occlusion {
        None => true,
        Some(backend) => {
            line_of_sight(backend, pose.position, target_position, target) == Some(true)
        }
    }
}

/// Слышит ли наблюдатель цель: дистанция ≤ max и цель СЗАДИ (угол > 90°)
///
/// Препятствия слух не блокируют — occlusion-проверки нет.
pub fn can_hear(pose: &Pose, target_position: Vec3, max_distance: f32) -> bool {
    let to_target = target_position - pose.position;
    let distance = to_target.length();
    if distance > max_distance || distance <= f32::EPSILON {
        return false;
    }

    pose.forward.angle_between(to_target).to_degrees() > 90.0
}
