//! AI decision-making module
//!
//! Пяти-state FSM врага (Patrolling/Waiting/Chasing/Searching/
//! Investigating) + шумовая шина. Perception-геометрия живёт отдельно
//! в crate::perception.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::*;

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. react_to_noise — шумовая шина → investigation override
/// 2. tick_enemy_fsm — perception + state transitions
/// 3. enemy_movement_from_state — state → MovementCommand
/// 4. emit_footstep_cues — аудио-cue по сменам state
/// 5. check_player_captured — захват игрока
pub struct EnemyAiPlugin;

impl Plugin for EnemyAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NoiseEvent>()
            .add_event::<EnemyStateChanged>()
            .add_event::<PlayerCaught>()
            .add_event::<AudioCue>()
            .add_systems(
                FixedUpdate,
                (
                    systems::react_to_noise,
                    systems::tick_enemy_fsm,
                    systems::enemy_movement_from_state,
                    systems::emit_footstep_cues,
                    systems::check_player_captured,
                )
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(SimulationSet::EnemyAi),
            );
    }
}
