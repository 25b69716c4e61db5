//! Danger-сигнал: сердцебиение при близком враге
//!
//! Ядро решает только КОГДА включать/выключать cue; громкость, fade и
//! сами клипы — забота аудио-адаптера.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::AudioCue;
use crate::components::{Enemy, Player, Pose};
use crate::session::SessionState;

#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DangerConfig {
    /// Дистанция до ближайшего врага, с которой начинается паника (метры)
    pub danger_distance: f32,
}

impl Default for DangerConfig {
    fn default() -> Self {
        Self {
            danger_distance: 8.0,
        }
    }
}

/// Текущее danger-состояние игрока (edge-трекинг для cue)
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DangerSignal {
    pub in_danger: bool,
}

/// Система: edge-triggered heartbeat cue по дистанции до ближайшего врага
pub fn update_danger_signal(
    config: Res<DangerConfig>,
    session: Res<SessionState>,
    mut signal: ResMut<DangerSignal>,
    players: Query<&Pose, With<Player>>,
    enemies: Query<&Pose, With<Enemy>>,
    mut cues: EventWriter<AudioCue>,
) {
    if !session.is_running() {
        return;
    }

    let Some(player_pose) = players.iter().next() else {
        return;
    };

    let nearest = enemies
        .iter()
        .map(|pose| pose.distance_to(player_pose.position))
        .min_by(|a, b| a.total_cmp(b));

    let in_danger = nearest.is_some_and(|distance| distance <= config.danger_distance);

    if in_danger != signal.in_danger {
        signal.in_danger = in_danger;
        if in_danger {
            crate::logger::log("💓 Player in danger range, heartbeat on");
        } else {
            crate::logger::log("Player out of danger range, heartbeat off");
        }
        cues.write(AudioCue::Heartbeat { active: in_danger });
    }
}
