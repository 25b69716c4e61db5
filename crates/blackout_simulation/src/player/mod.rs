//! Player module — danger-сигнал (сердцебиение)

use bevy::prelude::*;

pub mod heartbeat;

pub use heartbeat::*;

use crate::SimulationSet;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DangerConfig>()
            .init_resource::<DangerSignal>()
            .add_systems(
                FixedUpdate,
                update_danger_signal.in_set(SimulationSet::Signals),
            );
    }
}
