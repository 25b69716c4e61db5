//! BLACKOUT Simulation Core
//!
//! ECS-ядро stealth/horror VR игры (strategic layer).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (AI врага, прогресс миссии, правила игры)
//! - Engine-слой = tactical layer (физика, рендер, pathfinding, XR input)
//!
//! Границы между слоями узкие: внутрь идут PoseUpdate/SelectableState и
//! trait-коллабораторы (occlusion raycast, walkable sampling), наружу —
//! MovementCommand и fire-and-forget события презентации.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod components;
pub mod logger;
pub mod mission;
pub mod navigation;
pub mod perception;
pub mod player;
pub mod session;

// Re-export базовых типов для удобства
pub use ai::{
    AudioCue, EnemyAiPlugin, EnemyConfig, EnemyState, EnemyStateChanged, EnemyStateKind,
    NoiseEvent, PatrolRoute, PerceptionMemory, PlayerCaught,
};
pub use components::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use mission::{
    ExtractionReady, ExtractionZone, Generator, GeneratorActivated, GeneratorCue,
    GeneratorCueKind, GeneratorPhase, GeneratorProgressChanged, MissionCompleted, MissionPlugin,
    MissionState, SelectableState, ShowMessage,
};
pub use navigation::{NavigationPlugin, PoseUpdate, WalkableArea, WalkableWorld};
pub use perception::{
    can_hear, can_see, Detection, DetectionKind, OcclusionQuery, OcclusionWorld, RayContact,
};
pub use player::{DangerConfig, DangerSignal, PlayerPlugin};
pub use session::{SceneCommand, SessionConfig, SessionPhase, SessionPlugin, SessionState};

/// Порядок доменов внутри одного fixed tick'а
///
/// Mission идёт ДО EnemyAi: шум запустившегося генератора должен дойти
/// до врагов в том же tick'е (шина синхронная). Внутри EnemyAi свой
/// chain: реакция на шум → FSM → движение → cue → захват. Session
/// последним — halt срабатывает в том же tick'е, что захват/победа.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Приём апдейтов от engine-слоя (PoseUpdate → Pose)
    Ingest,
    /// Генераторы, учёт, зона эвакуации, победа
    Mission,
    /// Шумовая шина, FSM врагов, движение, захват
    EnemyAi,
    /// Производные сигналы (heartbeat)
    Signals,
    /// Конец игры, отложенный рестарт
    Session,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG; init_resource не перетирает seed,
            // выставленный create_headless_app
            .init_resource::<SimulationRng>()
            .init_resource::<OcclusionWorld>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Ingest,
                    SimulationSet::Mission,
                    SimulationSet::EnemyAi,
                    SimulationSet::Signals,
                    SimulationSet::Session,
                )
                    .chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((
                NavigationPlugin,
                MissionPlugin,
                EnemyAiPlugin,
                PlayerPlugin,
                SessionPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct SimulationRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl SimulationRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for SimulationRng {
    fn default() -> Self {
        Self::new(42) // Default seed для прогонов без явного сида
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Time идёт вручную: каждый app.update() == ровно один fixed tick,
/// иначе wall-clock делает тайминги (debounce, таймауты) недетерминированными.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(SimulationRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            Duration::from_secs_f64(1.0 / 60.0),
        ));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Собирает компоненты типа T в детерминированном порядке (sort по
/// Entity) и сериализует через Debug — достаточно для побайтового
/// сравнения прогонов.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
