//! AI events — звуковая шина и нотификации презентации
//!
//! NoiseEvent идёт внутрь симуляции (генераторы, engine-слой);
//! остальное — fire-and-forget наружу, адаптеры презентации читают
//! и никогда не блокируют tick.

use bevy::prelude::*;

use super::EnemyStateKind;

/// Звук в мире: «в точке X что-то громыхнуло»
///
/// Доставляется каждому живому врагу синхронно в том же tick'е,
/// без очереди и приоритетов — каждый враг сам решает, реагировать ли
/// (см. react_to_noise).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NoiseEvent {
    pub position: Vec3,
    /// Радиус слышимости. Считается и логируется, но доставку НЕ
    /// ограничивает: реагируют все враги на уровне.
    pub loudness_radius: f32,
}

/// Враг сменил state (для HUD/аудио адаптеров)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateChanged {
    pub entity: Entity,
    pub from: EnemyStateKind,
    pub to: EnemyStateKind,
}

/// Игрок пойман. Ровно один на сессию — первый захват закрывает игру.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCaught {
    pub by: Entity,
}

/// Аудио-cue решения ядра: ЧТО и КОГДА запускать/останавливать.
/// Громкость, spatialization и сами клипы — забота адаптера.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    /// Шаги врага с pitch'ем текущего state
    Footsteps { entity: Entity, pitch: f32 },
    /// Враг остановился — шаги глушим
    FootstepsStopped { entity: Entity },
    /// Сердцебиение игрока (edge-triggered по danger-дистанции)
    Heartbeat { active: bool },
    /// Конец игры: заглушить все gameplay-cue
    StopAll,
}
