//! Mission module — генераторы и прогресс до победы
//!
//! GeneratorAgent публикует активацию в tracker и в шумовую шину;
//! tracker сводит всё в условие победы.

use bevy::prelude::*;

pub mod events;
pub mod generator;
pub mod tracker;

pub use events::*;
pub use generator::*;
pub use tracker::*;

use crate::SimulationSet;

/// Mission Plugin
///
/// Порядок в tick'е фиксированный:
/// 1. advance_generators — прогресс запуска, activation edge
/// 2. register_generator_activations — учёт + one-shot ready
/// 3. update_extraction_zone — в зоне ли игрок
/// 4. evaluate_win — победа (строго после zone-проверки, без лага)
pub struct MissionPlugin;

impl Plugin for MissionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MissionState>()
            .init_resource::<ExtractionZone>()
            .add_event::<GeneratorActivated>()
            .add_event::<GeneratorProgressChanged>()
            .add_event::<ExtractionReady>()
            .add_event::<MissionCompleted>()
            .add_event::<ShowMessage>()
            .add_event::<GeneratorCue>()
            .add_systems(
                FixedUpdate,
                (
                    advance_generators,
                    register_generator_activations,
                    update_extraction_zone,
                    evaluate_win,
                )
                    .chain()
                    .in_set(SimulationSet::Mission),
            );
    }
}
